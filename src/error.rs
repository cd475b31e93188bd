// src/error.rs

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication failed (session cookie invalid or expired)")]
    SessionInvalid,
    #[error("No session cookie provided, cannot fetch course pages")]
    SessionMissing,
    #[error("Network request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Network middleware error: {0}")]
    NetworkMiddleware(#[from] reqwest_middleware::Error),
    #[error("Server returned HTTP {status} for '{url}'")]
    Http { url: String, status: u16 },
    #[error("Response body from '{url}' exceeds the {limit} byte limit")]
    BodyTooLarge { url: String, limit: u64 },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to persist temporary file: {0}")]
    TempFilePersist(#[from] tempfile::PersistError),
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),
    #[error("Archive error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("Interrupted by user")]
    UserInterrupt,
    #[error("{0}")] // printed verbatim, no prefix
    UserInputError(String),
    #[error("Unexpected error: {0}")]
    Other(#[from] anyhow::Error),
}

pub type AppResult<T> = Result<T, AppError>;
