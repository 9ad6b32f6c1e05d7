use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

static LINE_BREAKS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\n\r]").expect("line break regex is valid"));
static DOUBLE_SPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s\s").expect("double space regex is valid"));

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Language {
    #[serde(default)]
    pub object_id: String,
    #[serde(default)]
    pub iso_code: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub english_name: Option<String>,
    #[serde(default)]
    pub usage_count: Option<u64>,
    #[serde(default)]
    pub banner_image_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Uploader {
    #[serde(default)]
    pub username: String,
}

/// Who decided whether an artifact (epub, pdf, ...) is offered to readers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VisibilitySettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub librarian: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub harvester: Option<bool>,
}

impl VisibilitySettings {
    /// The uploader overrides the librarian, who overrides the harvester.
    pub fn decision(&self) -> bool {
        self.user
            .or(self.librarian)
            .or(self.harvester)
            .unwrap_or(true)
    }
}

/// Book record as the store sends it.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawBook {
    object_id: String,
    title: Option<String>,
    summary: Option<String>,
    tags: Option<Vec<String>>,
    level: Option<String>,
    librarian_note: Option<String>,
    in_circulation: Option<bool>,
    publisher: Option<String>,
    original_publisher: Option<String>,
    features: Option<Vec<String>>,
    bookshelves: Option<Vec<String>>,
    license: Option<String>,
    base_url: Option<String>,
    copyright: Option<String>,
    country: Option<String>,
    credits: Option<String>,
    page_count: Option<Value>,
    book_order: Option<String>,
    download_count: Option<i64>,
    harvest_log: Option<Vec<String>>,
    harvest_state: Option<String>,
    phash_of_first_content_image: Option<String>,
    uploader: Option<Uploader>,
    created_at: Option<String>,
    updated_at: Option<String>,
    all_titles: Option<String>,
    lang_pointers: Option<Vec<Language>>,
    show: Option<HashMap<String, VisibilitySettings>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: String,
    pub title: String,
    pub summary: String,
    pub tags: Vec<String>,
    pub level: String,
    pub librarian_note: String,
    pub in_circulation: bool,
    pub publisher: String,
    pub original_publisher: String,
    pub features: Vec<String>,
    pub bookshelves: Vec<String>,

    pub license: String,
    pub base_url: String,
    pub copyright: String,
    pub country: String,
    pub credits: String,
    pub page_count: String,
    pub book_order: String,
    pub download_count: i64,
    pub harvest_log: Vec<String>,
    pub harvest_state: String,
    pub phash_of_first_content_image: String,
    pub uploader: Option<Uploader>,
    pub upload_date: Option<DateTime<Utc>>,
    pub update_date: Option<DateTime<Utc>>,

    pub all_titles: BTreeMap<String, String>,
    pub all_titles_raw: String,
    pub languages: Vec<Language>,
    pub artifact_visibility: HashMap<String, VisibilitySettings>,
    pub epub_visible: bool,
}

/// Fields a moderator may change, in the store's naming.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookUpdate {
    pub tags: Vec<String>,
    pub in_circulation: bool,
    pub summary: String,
    pub librarian_note: String,
    pub bookshelves: Vec<String>,
    pub publisher: String,
    pub original_publisher: String,
    pub lang_pointers: Vec<Value>,
    pub features: Vec<String>,
    pub title: String,
}

impl Book {
    /// Build a book from a record returned by the store.
    pub fn from_server_data(data: Value) -> Result<Book, serde_json::Error> {
        let raw: RawBook = serde_json::from_value(data)?;

        let all_titles_raw = raw.all_titles.unwrap_or_default();
        let artifact_visibility = raw.show.unwrap_or_default();
        let epub_visible = artifact_visibility
            .get("epub")
            .map(VisibilitySettings::decision)
            .unwrap_or(false);

        let page_count = match raw.page_count {
            Some(Value::String(s)) => s,
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        };

        let phash = raw
            .phash_of_first_content_image
            .filter(|p| !p.contains("null"))
            .unwrap_or_default();

        let mut book = Book {
            id: raw.object_id,
            title: raw.title.unwrap_or_default(),
            summary: raw.summary.unwrap_or_default(),
            tags: raw.tags.unwrap_or_default(),
            level: raw.level.unwrap_or_default(),
            librarian_note: raw.librarian_note.unwrap_or_default(),
            in_circulation: raw.in_circulation.unwrap_or(true),
            publisher: raw.publisher.unwrap_or_default(),
            original_publisher: raw.original_publisher.unwrap_or_default(),
            features: sanitize_features(raw.features.unwrap_or_default()),
            bookshelves: raw.bookshelves.unwrap_or_default(),
            license: raw.license.unwrap_or_default(),
            base_url: raw.base_url.unwrap_or_default(),
            copyright: raw.copyright.unwrap_or_default(),
            country: raw.country.unwrap_or_default(),
            credits: raw.credits.unwrap_or_default(),
            page_count,
            book_order: raw.book_order.unwrap_or_default(),
            download_count: raw.download_count.unwrap_or(-1),
            harvest_log: raw.harvest_log.unwrap_or_default(),
            harvest_state: raw.harvest_state.unwrap_or_default(),
            phash_of_first_content_image: phash,
            uploader: raw.uploader,
            upload_date: raw.created_at.as_deref().and_then(parse_date),
            update_date: raw.updated_at.as_deref().and_then(parse_date),
            all_titles: parse_all_titles(&all_titles_raw),
            all_titles_raw,
            languages: raw.lang_pointers.unwrap_or_default(),
            artifact_visibility,
            epub_visible,
        };

        book.lift_level_tag();

        Ok(book)
    }

    /// The level lives in the tags on the server (`level:2`) but is edited separately.
    fn lift_level_tag(&mut self) {
        let position = self.tags.iter().position(|tag| {
            let parts: Vec<&str> = tag.split(':').collect();
            parts.len() == 2 && parts[0].trim() == "level"
        });
        if let Some(position) = position {
            let tag = self.tags.remove(position);
            if let Some((_, level)) = tag.split_once(':') {
                self.level = level.trim().to_string();
            }
        }
    }

    pub fn harvest_log_text(&self) -> String {
        self.harvest_log.join(" / ")
    }

    /// Value of the first `axis:value` tag for `axis`.
    pub fn tag_value(&self, axis: &str) -> Option<String> {
        let prefix = format!("{axis}:");
        self.tags
            .iter()
            .find(|t| t.starts_with(&prefix))
            .and_then(|t| t.split(':').nth(1))
            .map(|v| v.trim().to_string())
    }

    pub fn best_level(&self) -> Option<String> {
        if !self.level.is_empty() {
            return Some(self.level.clone());
        }
        self.tag_value("computedLevel")
    }

    /// Title in `lang` when known, otherwise the official title.
    pub fn best_title(&self, lang: Option<&str>) -> &str {
        lang.and_then(|lang| self.all_titles.get(lang))
            .map(String::as_str)
            .filter(|t| !t.is_empty())
            .unwrap_or(self.title.as_str())
    }

    /// Show the book under its title in `lang`.
    pub fn localize_title(&mut self, lang: &str) {
        let title = self.best_title(Some(lang)).to_string();
        self.title = title;
    }

    /// Add or remove a sentinel tag such as `system:Incoming`.
    pub fn set_boolean_tag(&mut self, name: &str, value: bool) {
        let position = self.tags.iter().position(|t| t == name);
        match (position, value) {
            (Some(i), false) => {
                self.tags.remove(i);
            }
            (None, true) => self.tags.push(name.to_string()),
            _ => {}
        }
    }

    /// Record the librarian's decision for `artifact`; `None` clears it.
    pub fn set_librarian_visibility(&mut self, artifact: &str, visible: Option<bool>) {
        let settings = self
            .artifact_visibility
            .entry(artifact.to_string())
            .or_default();
        settings.librarian = visible;
        if artifact == "epub" {
            self.epub_visible = settings.decision();
        }
    }

    /// Moderator-editable fields ready to be sent back to the store.
    pub fn admin_update(&self) -> BookUpdate {
        let mut tags = self.tags.clone();
        if !self.level.is_empty() {
            tags.push(format!("level:{}", self.level));
        }

        let lang_pointers = self
            .languages
            .iter()
            .map(|l| {
                serde_json::json!({
                    "__type": "Pointer",
                    "className": "language",
                    "objectId": l.object_id
                })
            })
            .collect();

        BookUpdate {
            tags,
            in_circulation: self.in_circulation,
            summary: self.summary.trim().to_string(),
            librarian_note: self.librarian_note.clone(),
            bookshelves: self.bookshelves.clone(),
            publisher: self.publisher.clone(),
            original_publisher: self.original_publisher.clone(),
            lang_pointers,
            features: self.features.clone(),
            title: self.title.trim().to_string(),
        }
    }
}

/// `quiz` is reported as `activity`; the library does not distinguish them.
pub fn sanitize_features(mut features: Vec<String>) -> Vec<String> {
    if let Some(i) = features.iter().position(|f| f == "quiz") {
        features.remove(i);
        if !features.iter().any(|f| f == "activity") {
            features.push("activity".to_string());
        }
    }
    features
}

/// `allTitles` is JSON text that may contain raw line breaks.
pub fn parse_all_titles(raw: &str) -> BTreeMap<String, String> {
    if raw.trim().is_empty() {
        return BTreeMap::new();
    }
    let cleaned = LINE_BREAKS.replace_all(raw, " ");
    let cleaned = DOUBLE_SPACE.replace_all(&cleaned, " ");

    match serde_json::from_str::<BTreeMap<String, String>>(&cleaned) {
        Ok(titles) => titles,
        Err(err) => {
            log::error!("{err}. while parsing allTitles {raw:?}");
            BTreeMap::new()
        }
    }
}

fn parse_date(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|d| d.with_timezone(&Utc))
        .ok()
}
