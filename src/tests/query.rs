use serde_json::{json, Value};

use crate::filter::Filter;
use crate::query::{compile, QueryParams};

fn where_of(filter: &Filter) -> Value {
    Value::Object(compile(filter, &QueryParams::default()).where_clause)
}

#[test]
fn test_empty_filter_defaults_to_in_circulation() {
    assert_eq!(
        where_of(&Filter::default()),
        json!({ "inCirculation": { "$in": [true, null] } })
    );
}

#[test]
fn test_out_of_circulation() {
    let filter = Filter {
        in_circulation: Some(false),
        ..Default::default()
    };
    assert_eq!(
        where_of(&filter)["inCirculation"],
        json!({ "$in": [false, null] })
    );
}

#[test]
fn test_search_is_trimmed() {
    let filter = Filter {
        search: Some("  dogs cats ".to_string()),
        ..Default::default()
    };
    assert_eq!(
        where_of(&filter)["search"],
        json!({ "$text": { "$search": { "$term": "dogs cats" } } })
    );
}

#[test]
fn test_blank_search_is_dropped() {
    let filter = Filter {
        search: Some("   ".to_string()),
        ..Default::default()
    };
    assert!(where_of(&filter).get("search").is_none());
}

#[test]
fn test_language() {
    let filter = Filter {
        language: Some("fr".to_string()),
        ..Default::default()
    };
    assert_eq!(
        where_of(&filter)["langPointers"],
        json!({ "$inQuery": { "where": { "isoCode": "fr" }, "className": "language" } })
    );
}

#[test]
fn test_topic_alone_matches_both_tag_styles() {
    let filter = Filter {
        topic: Some("Math".to_string()),
        ..Default::default()
    };
    assert_eq!(
        where_of(&filter)["tags"],
        json!({ "$in": ["topic:Math", "Math"] })
    );
}

#[test]
fn test_bookshelf_and_topic() {
    let filter = Filter {
        bookshelf: Some("Enabling Writers".to_string()),
        topic: Some("Math".to_string()),
        ..Default::default()
    };
    let w = where_of(&filter);
    assert_eq!(
        w["tags"],
        json!({ "$all": ["bookshelf:Enabling Writers", "topic:Math"] })
    );
    assert_eq!(w["inCirculation"], json!({ "$in": [true, null] }));
}

#[test]
fn test_bookshelf_alone() {
    let filter = Filter {
        bookshelf: Some("rubbish".to_string()),
        ..Default::default()
    };
    assert_eq!(where_of(&filter)["tags"], json!({ "$all": ["bookshelf:rubbish"] }));
}

#[test]
fn test_other_tags_wins_over_topic_and_bookshelf() {
    let filter = Filter {
        other_tags: Some("system:Incoming".to_string()),
        topic: Some("Math".to_string()),
        bookshelf: Some("rubbish".to_string()),
        ..Default::default()
    };
    assert_eq!(where_of(&filter)["tags"], json!("system:Incoming"));
}

#[test]
fn test_empty_other_tags_is_unset() {
    let filter = Filter {
        other_tags: Some(String::new()),
        bookshelf: Some("rubbish".to_string()),
        ..Default::default()
    };
    assert_eq!(where_of(&filter)["tags"], json!({ "$all": ["bookshelf:rubbish"] }));
}

#[test]
fn test_feature() {
    let filter = Filter {
        feature: Some("talkingBook".to_string()),
        ..Default::default()
    };
    assert_eq!(where_of(&filter)["features"], json!("talkingBook"));
}

#[test]
fn test_facets() {
    let filter = Filter {
        uploader: Some("fred@example.com".to_string()),
        copyright: Some("2019 SIL (c)".to_string()),
        country: Some("Kenya".to_string()),
        harvest_state: Some("Failed".to_string()),
        ..Default::default()
    };
    let w = where_of(&filter);
    assert_eq!(
        w["uploader"],
        json!({ "$inQuery": { "where": { "username": "fred@example.com" }, "className": "_User" } })
    );
    assert_eq!(w["copyright"], json!({ "$regex": "\\Q2019 SIL (c)\\E" }));
    assert_eq!(w["country"], json!("Kenya"));
    assert_eq!(w["harvestState"], json!("Failed"));
}

#[test]
fn test_filter_is_not_mutated_and_params_pass_through() {
    let filter = Filter {
        search: Some("dogs".to_string()),
        topic: Some("Animals".to_string()),
        ..Default::default()
    };
    let before = filter.clone();
    let params = QueryParams {
        limit: Some(20),
        skip: Some(40),
        order: Some("title".to_string()),
        ..Default::default()
    };

    let doc = compile(&filter, &params);

    assert_eq!(filter, before);
    assert_eq!(doc.params, params);
}

#[test]
fn test_to_query_pairs() {
    let filter = Filter {
        country: Some("Kenya".to_string()),
        ..Default::default()
    };
    let params = QueryParams {
        limit: Some(0),
        count: Some(1),
        keys: Some("title".to_string()),
        ..Default::default()
    };
    let pairs = compile(&filter, &params).to_query_pairs();

    assert_eq!(pairs[0].0, "where");
    let where_json: Value = serde_json::from_str(&pairs[0].1).unwrap();
    assert_eq!(where_json["country"], json!("Kenya"));
    assert_eq!(
        pairs[1..].to_vec(),
        vec![
            ("limit".to_string(), "0".to_string()),
            ("count".to_string(), "1".to_string()),
            ("keys".to_string(), "title".to_string()),
        ]
    );
}

#[test]
fn test_serialized_document_uses_where_key() {
    let doc = compile(&Filter::default(), &QueryParams {
        limit: Some(5),
        ..Default::default()
    });
    let value = serde_json::to_value(&doc).unwrap();
    assert_eq!(value["limit"], json!(5));
    assert!(value["where"].is_object());
}
