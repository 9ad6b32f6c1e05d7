use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::filter::Filter;

/// Parameters passed through to the store untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip: Option<u32>,
    /// Ask the store for the total number of matches.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
    /// Comma separated projection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keys: Option<String>,
    /// Comma separated pointer fields to resolve.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<String>,
}

/// A single request to the store: `where` clause plus paging/projection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryDocument {
    #[serde(rename = "where")]
    pub where_clause: Map<String, Value>,
    #[serde(flatten)]
    pub params: QueryParams,
}

impl QueryDocument {
    /// Render as GET parameters; the store expects `where` as JSON text.
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![(
            "where".to_string(),
            Value::Object(self.where_clause.clone()).to_string(),
        )];

        let p = &self.params;
        let numbers = [("limit", p.limit), ("skip", p.skip), ("count", p.count)];
        for (name, value) in numbers {
            if let Some(value) = value {
                pairs.push((name.to_string(), value.to_string()));
            }
        }
        let strings = [("keys", &p.keys), ("include", &p.include), ("order", &p.order)];
        for (name, value) in strings {
            if let Some(value) = value {
                pairs.push((name.to_string(), value.clone()));
            }
        }
        pairs
    }
}

fn set(filter_value: &Option<String>) -> Option<&str> {
    filter_value.as_deref().filter(|v| !v.is_empty())
}

/// Build the store query for `filter`.
///
/// Rules, in order (later ones may overwrite `tags`):
/// - `search` → full-text `$text` descriptor
/// - `language` → `langPointers` join on the language class
/// - `topic` → `tags` `$in` new style `topic:X` and legacy bare `X`
/// - `otherTags` → raw `tags` value
/// - `bookshelf`/`topic` → `tags` `$all`, unless `otherTags` is set
/// - `feature` → `features` must contain the value
/// - `inCirculation` → `[value, null]`, defaulting to `[true, null]`
/// - uploader/copyright/country/harvestState facets
pub fn compile(filter: &Filter, base: &QueryParams) -> QueryDocument {
    let mut w = Map::new();

    if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        w.insert(
            "search".to_string(),
            json!({ "$text": { "$search": { "$term": search } } }),
        );
    }

    if let Some(language) = set(&filter.language) {
        w.insert(
            "langPointers".to_string(),
            json!({
                "$inQuery": {
                    "where": { "isoCode": language },
                    "className": "language"
                }
            }),
        );
    }

    // topic alone keeps `$in` (new and legacy tag); the bookshelf rule below
    // replaces it with `$all` only when a bookshelf is set
    if let Some(topic) = set(&filter.topic) {
        w.insert(
            "tags".to_string(),
            json!({ "$in": [format!("topic:{topic}"), topic] }),
        );
    }

    if let Some(other_tags) = set(&filter.other_tags) {
        w.insert("tags".to_string(), Value::String(other_tags.to_string()));
    }

    // otherTags takes priority over bookshelf/topic
    if set(&filter.other_tags).is_none() {
        if let Some(bookshelf) = set(&filter.bookshelf) {
            let mut all = vec![format!("bookshelf:{bookshelf}")];
            if let Some(topic) = set(&filter.topic) {
                all.push(format!("topic:{topic}"));
            }
            w.insert("tags".to_string(), json!({ "$all": all }));
        }
    }

    if let Some(feature) = set(&filter.feature) {
        // an array field compared to a scalar matches when it contains it
        w.insert("features".to_string(), Value::String(feature.to_string()));
    }

    let in_circulation = filter.in_circulation.unwrap_or(true);
    w.insert(
        "inCirculation".to_string(),
        json!({ "$in": [in_circulation, null] }),
    );

    if let Some(uploader) = set(&filter.uploader) {
        w.insert(
            "uploader".to_string(),
            json!({
                "$inQuery": {
                    "where": { "username": uploader },
                    "className": "_User"
                }
            }),
        );
    }

    if let Some(copyright) = set(&filter.copyright) {
        w.insert(
            "copyright".to_string(),
            json!({ "$regex": format!("\\Q{copyright}\\E") }),
        );
    }

    if let Some(country) = set(&filter.country) {
        w.insert("country".to_string(), Value::String(country.to_string()));
    }

    if let Some(harvest_state) = set(&filter.harvest_state) {
        w.insert(
            "harvestState".to_string(),
            Value::String(harvest_state.to_string()),
        );
    }

    log::debug!("compiled filter {filter:?} -> {}", Value::Object(w.clone()));

    QueryDocument {
        where_clause: w,
        params: base.clone(),
    }
}
