#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("book not found")]
    NotFound,

    /// Error body sent by the store: `{"code": 101, "error": "..."}`.
    #[error("server error {code}: {error}")]
    Server { code: i64, error: String },

    #[error("reqwest error: {0:?}")]
    Reqwest(#[from] reqwest::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),

    #[error("unexpected error: {0:?}")]
    Other(#[from] anyhow::Error),
}
