use serde_json::json;

use crate::book::{parse_all_titles, sanitize_features, Book};

fn sample() -> Book {
    Book::from_server_data(json!({
        "objectId": "abc123",
        "title": " The Moon and the Cap ",
        "tags": ["topic:Animals", "level: 2", "system:Incoming", "computedLevel:3"],
        "features": ["talkingBook", "quiz"],
        "inCirculation": false,
        "allTitles": "{\"en\":\"The Moon and the Cap\",\n\"fr\":\"La lune et la casquette\"}",
        "langPointers": [
            { "objectId": "lang1", "isoCode": "en", "name": "English" },
            { "objectId": "lang2", "isoCode": "fr", "name": "français", "englishName": "French" }
        ],
        "uploader": { "username": "fred@example.com" },
        "createdAt": "2020-03-04T05:06:07.000Z",
        "harvestLog": ["Warning: font", "Missing image"],
        "pageCount": 24,
        "phashOfFirstContentImage": "null",
        "show": { "epub": { "harvester": true, "librarian": false } }
    }))
    .unwrap()
}

#[test]
fn test_from_server_data() {
    let book = sample();

    assert_eq!(book.id, "abc123");
    assert!(!book.in_circulation);
    assert_eq!(book.languages.len(), 2);
    assert_eq!(book.languages[1].english_name.as_deref(), Some("French"));
    assert_eq!(book.uploader.as_ref().unwrap().username, "fred@example.com");
    assert_eq!(book.page_count, "24");
    assert_eq!(book.phash_of_first_content_image, "");
    assert_eq!(book.harvest_log_text(), "Warning: font / Missing image");
    assert_eq!(
        book.upload_date.unwrap().to_rfc3339(),
        "2020-03-04T05:06:07+00:00"
    );
    assert_eq!(book.update_date, None);
}

#[test]
fn test_missing_fields_get_defaults() {
    let book = Book::from_server_data(json!({ "objectId": "x" })).unwrap();

    assert!(book.in_circulation);
    assert_eq!(book.download_count, -1);
    assert!(book.tags.is_empty());
    assert!(book.all_titles.is_empty());
    assert!(!book.epub_visible);
}

#[test]
fn test_level_tag_is_lifted() {
    let book = sample();

    assert_eq!(book.level, "2");
    assert!(!book.tags.iter().any(|t| t.starts_with("level")));
    assert_eq!(book.best_level().as_deref(), Some("2"));
}

#[test]
fn test_best_level_falls_back_to_computed() {
    let book = Book::from_server_data(json!({ "tags": ["computedLevel:3"] })).unwrap();
    assert_eq!(book.best_level().as_deref(), Some("3"));
}

#[test]
fn test_quiz_becomes_activity() {
    assert_eq!(sample().features, vec!["talkingBook", "activity"]);
    assert_eq!(
        sanitize_features(vec!["quiz".to_string(), "activity".to_string()]),
        vec!["activity"]
    );
}

#[test]
fn test_all_titles_with_line_breaks() {
    let titles = parse_all_titles("{\"en\":\"One\",\r\n  \"tpi\":\"Wan\"}");
    assert_eq!(titles.get("en").map(String::as_str), Some("One"));
    assert_eq!(titles.get("tpi").map(String::as_str), Some("Wan"));

    assert!(parse_all_titles("not json").is_empty());
    assert!(parse_all_titles("").is_empty());
}

#[test]
fn test_best_title() {
    let book = sample();

    assert_eq!(book.best_title(Some("fr")), "La lune et la casquette");
    assert_eq!(book.best_title(Some("de")), book.title);
    assert_eq!(book.best_title(None), book.title);
}

#[test]
fn test_localize_title() {
    let mut book = sample();
    book.localize_title("de");
    assert_eq!(book.title, " The Moon and the Cap ");

    book.localize_title("fr");
    assert_eq!(book.title, "La lune et la casquette");
}

#[test]
fn test_tag_value() {
    let book = sample();
    assert_eq!(book.tag_value("topic").as_deref(), Some("Animals"));
    assert_eq!(book.tag_value("bookshelf"), None);
}

#[test]
fn test_set_boolean_tag() {
    let mut book = sample();

    book.set_boolean_tag("system:Incoming", true);
    assert_eq!(book.tags.iter().filter(|t| *t == "system:Incoming").count(), 1);

    book.set_boolean_tag("system:Incoming", false);
    assert!(!book.tags.iter().any(|t| t == "system:Incoming"));

    book.set_boolean_tag("system:Incoming", false);
    assert!(!book.tags.iter().any(|t| t == "system:Incoming"));
}

#[test]
fn test_epub_visibility() {
    let mut book = sample();
    // librarian overrides harvester
    assert!(!book.epub_visible);

    book.set_librarian_visibility("epub", None);
    assert!(book.epub_visible);

    book.set_librarian_visibility("pdf", Some(false));
    assert_eq!(book.artifact_visibility["pdf"].librarian, Some(false));
    assert!(book.epub_visible);
}

#[test]
fn test_admin_update() {
    let update = sample().admin_update();

    assert_eq!(update.title, "The Moon and the Cap");
    assert_eq!(update.tags.last().map(String::as_str), Some("level:2"));
    assert!(!update.in_circulation);

    let value = serde_json::to_value(&update).unwrap();
    assert_eq!(
        value["langPointers"][1],
        json!({ "__type": "Pointer", "className": "language", "objectId": "lang2" })
    );
    assert!(value.get("librarianNote").is_some());
    assert!(value.get("originalPublisher").is_some());
}
