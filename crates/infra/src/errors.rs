//! Infrastructure error types and conversions into domain errors.

use openbooks_domain::BooksError;
use thiserror::Error;

/// Errors raised inside the infrastructure layer.
///
/// These wrap the concrete library errors so that callers above the
/// infrastructure boundary only ever see [`BooksError`].
#[derive(Debug, Error)]
pub enum InfraError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("blocking task failed: {0}")]
    TaskJoin(String),
}

impl From<InfraError> for BooksError {
    fn from(err: InfraError) -> Self {
        match err {
            InfraError::Sqlite(e) => BooksError::Database(e.to_string()),
            InfraError::Pool(e) => BooksError::Database(e.to_string()),
            InfraError::Http(e) => BooksError::Network(e.to_string()),
            InfraError::Json(e) => BooksError::Serialization(e.to_string()),
            InfraError::Io(e) => BooksError::Database(e.to_string()),
            InfraError::TaskJoin(message) => BooksError::Internal(message),
        }
    }
}
