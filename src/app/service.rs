use anyhow::Context;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::{
    book::{Book, Language},
    filter::Filter,
    query::{self, QueryParams},
};

use super::{backend::CatalogBackend, errors::AppError};

const BOOKS: &str = "books";
const LANGUAGES: &str = "language";
const BOOKSHELVES: &str = "bookshelf";
const TAGS: &str = "tag";

/// Tag that marks books a moderator has not looked at yet.
pub const INCOMING_TAG: &str = "system:Incoming";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bookshelf {
    #[serde(default)]
    pub english_name: String,
    #[serde(default)]
    pub key: String,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchBooksResult {
    pub total_matching_records: u64,
    pub books: Vec<Book>,
}

/// Catalog operations on top of a [`CatalogBackend`].
pub struct CatalogService {
    backend: Box<dyn CatalogBackend>,
}

impl CatalogService {
    pub fn new(backend: Box<dyn CatalogBackend>) -> Self {
        Self { backend }
    }

    /// Number of books matching `filter`.
    pub fn book_count(&self, filter: &Filter) -> anyhow::Result<u64, AppError> {
        let params = QueryParams {
            limit: Some(0),
            count: Some(1),
            ..Default::default()
        };
        let resp = self.backend.query(BOOKS, &query::compile(filter, &params))?;

        Ok(resp.count.unwrap_or_default())
    }

    /// One page of books plus the total number of matches.
    pub fn search_books(
        &self,
        params: &QueryParams,
        filter: &Filter,
    ) -> anyhow::Result<SearchBooksResult, AppError> {
        let total_matching_records = self.book_count(filter)?;

        let resp = self.backend.query(BOOKS, &query::compile(filter, params))?;
        let books = resp
            .results
            .into_iter()
            .map(Book::from_server_data)
            .collect::<Result<Vec<_>, _>>()?;

        log::info!("found {} of {total_matching_records} books", books.len());

        Ok(SearchBooksResult {
            total_matching_records,
            books,
        })
    }

    pub fn get_book(&self, id: &str) -> anyhow::Result<Book, AppError> {
        let data = self.backend.get(BOOKS, id)?;
        Ok(Book::from_server_data(data)?)
    }

    pub fn language_info(&self, iso_code: &str) -> anyhow::Result<Option<Language>, AppError> {
        let doc = query::QueryDocument {
            where_clause: json_object(json!({ "isoCode": iso_code })),
            params: QueryParams {
                keys: Some("isoCode,name,usageCount,bannerImageUrl".to_string()),
                ..Default::default()
            },
        };
        let resp = self.backend.query(LANGUAGES, &doc)?;

        match resp.results.into_iter().next() {
            Some(language) => Ok(Some(serde_json::from_value(language)?)),
            None => Ok(None),
        }
    }

    pub fn bookshelves(&self, category: Option<&str>) -> anyhow::Result<Vec<Bookshelf>, AppError> {
        let where_clause = match category {
            Some(category) => json_object(json!({ "category": category })),
            None => Default::default(),
        };
        let doc = query::QueryDocument {
            where_clause,
            params: QueryParams {
                keys: Some("englishName,key".to_string()),
                limit: Some(1000),
                ..Default::default()
            },
        };
        let resp = self.backend.query(BOOKSHELVES, &doc)?;

        Ok(resp
            .results
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<_>, _>>()?)
    }

    /// All `topic:` tags known to the store.
    pub fn topic_list(&self) -> anyhow::Result<Vec<String>, AppError> {
        let doc = query::QueryDocument {
            where_clause: Default::default(),
            params: QueryParams {
                limit: Some(1000),
                count: Some(1000),
                keys: Some("name".to_string()),
                ..Default::default()
            },
        };
        let resp = self.backend.query(TAGS, &doc)?;

        Ok(resp
            .results
            .iter()
            .filter_map(|tag| tag.get("name").and_then(Value::as_str))
            .filter(|name| name.starts_with("topic:"))
            .map(str::to_string)
            .collect())
    }

    /// Phrases the search box recognizes: system tags, topics, then bookshelves.
    pub fn known_phrases(&self, system_tags: &[String]) -> anyhow::Result<Vec<String>, AppError> {
        let mut phrases = system_tags.to_vec();
        phrases.extend(self.topic_list()?);
        phrases.extend(
            self.bookshelves(None)?
                .into_iter()
                .filter(|shelf| !shelf.key.is_empty())
                .map(|shelf| format!("bookshelf:{}", shelf.key)),
        );
        Ok(phrases)
    }

    /// Split the search box text and search with the phrases moved into `filter`.
    pub fn search_text(
        &self,
        text: &str,
        mut filter: Filter,
        params: &QueryParams,
        system_tags: &[String],
    ) -> anyhow::Result<(Filter, SearchBooksResult), AppError> {
        let known = self.known_phrases(system_tags)?;
        filter.merge_search_text(text, &known);
        let result = self.search_books(params, &filter)?;
        Ok((filter, result))
    }

    pub fn update_book(&self, book: &Book) -> anyhow::Result<(), AppError> {
        let body = serde_json::to_value(book.admin_update())?;
        self.backend.update(BOOKS, &book.id, &body)
    }

    pub fn set_in_circulation(&self, id: &str, in_circulation: bool) -> anyhow::Result<Book, AppError> {
        let mut book = self.get_book(id)?;
        book.in_circulation = in_circulation;
        self.update_book(&book)?;
        Ok(book)
    }

    pub fn set_incoming(&self, id: &str, incoming: bool) -> anyhow::Result<Book, AppError> {
        let mut book = self.get_book(id)?;
        book.set_boolean_tag(INCOMING_TAG, incoming);
        self.update_book(&book)?;
        Ok(book)
    }

    /// Update artifact visibility (`show`) only.
    pub fn update_visibility(&self, book: &Book) -> anyhow::Result<(), AppError> {
        let show = serde_json::to_value(&book.artifact_visibility)
            .context("serializing artifact visibility")?;
        self.backend.update(BOOKS, &book.id, &json!({ "show": show }))
    }
}

fn json_object(value: Value) -> serde_json::Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Default::default(),
    }
}
