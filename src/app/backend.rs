use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::query::QueryDocument;

use super::errors::AppError;

/// Raw access to the document store, one collection ("class") at a time.
pub trait CatalogBackend: Send + Sync {
    fn query(&self, class: &str, doc: &QueryDocument) -> anyhow::Result<QueryResponse, AppError>;

    fn get(&self, class: &str, id: &str) -> anyhow::Result<Value, AppError>;

    fn update(&self, class: &str, id: &str, body: &Value) -> anyhow::Result<(), AppError>;
}

/// Answer to a query. `count` is only present when it was asked for.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    #[serde(default)]
    pub results: Vec<Value>,
    #[serde(default)]
    pub count: Option<u64>,
}
