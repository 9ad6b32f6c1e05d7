use serde::{Deserialize, Serialize};

use crate::search_query;

/// What the user is currently looking for.
///
/// Every field is optional; an empty filter matches every book in circulation.
/// Fields the query compiler does not know about are dropped on deserialization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Filter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    /// ISO code of the book language.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bookshelf: Option<String>,
    /// Raw tag constraint, used as is.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub other_tags: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature: Option<String>,
    /// `None` means "in circulation or never set".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub in_circulation: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uploader: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub copyright: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub harvest_state: Option<String>,
}

impl Filter {
    /// Split `input` and move every recognized phrase into its own field.
    /// Whatever is left becomes the free-text `search`.
    pub fn merge_search_text<S: AsRef<str>>(&mut self, input: &str, known: &[S]) {
        let split = search_query::split(input, known);

        self.search = Some(split.free_text).filter(|s| !s.is_empty());

        for phrase in split.matched {
            self.merge_phrase(&phrase);
        }
    }

    fn merge_phrase(&mut self, phrase: &str) {
        let Some((axis, value)) = phrase.split_once(':') else {
            return;
        };
        let value = value.trim().to_string();

        match axis {
            "topic" => self.topic = Some(value),
            "bookshelf" => self.bookshelf = Some(value),
            "uploader" => self.uploader = Some(value),
            "copyright" => self.copyright = Some(value),
            "country" => self.country = Some(value),
            "harvestState" => self.harvest_state = Some(value),
            _ => {
                // system:, level: and friends are plain tags
                if let Some(existing) = &self.other_tags {
                    log::warn!("ignoring tag {phrase:?}, filter already has tag {existing:?}");
                } else {
                    self.other_tags = Some(phrase.to_string());
                }
            }
        }
    }
}
