//! Sync-specific error types
//!
//! Provides error classification for sync operations with retry metadata.

use openbooks_domain::BooksError;
use thiserror::Error;

/// Categories of sync errors for retry logic
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncErrorCategory {
    /// Authentication errors (401, 403) - retry after token refresh
    Authentication,
    /// Rate limiting errors (429) - retry with backoff
    RateLimit,
    /// Server errors (5xx) - retryable
    Server,
    /// Client errors (4xx except auth) - non-retryable
    Client,
    /// Network/connection errors - retryable
    Network,
    /// Database errors - may be retryable
    Database,
    /// Configuration errors - non-retryable
    Config,
}

/// Sync operation errors
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimit(String),

    #[error("Server error: {0}")]
    Server(String),

    #[error("Client error: {0}")]
    Client(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Timeout after {0:?}")]
    Timeout(std::time::Duration),

    #[error("Operation cancelled")]
    Cancelled,
}

impl SyncError {
    /// Get the error category for this error
    pub fn category(&self) -> SyncErrorCategory {
        match self {
            Self::Auth(_) => SyncErrorCategory::Authentication,
            Self::RateLimit(_) => SyncErrorCategory::RateLimit,
            Self::Server(_) => SyncErrorCategory::Server,
            Self::Client(_) => SyncErrorCategory::Client,
            Self::Network(_) | Self::Timeout(_) => SyncErrorCategory::Network,
            Self::Database(_) => SyncErrorCategory::Database,
            Self::Config(_) | Self::Cancelled => SyncErrorCategory::Config,
        }
    }

    /// Check if this error should be retried
    pub fn should_retry(&self) -> bool {
        matches!(
            self.category(),
            SyncErrorCategory::Authentication
                | SyncErrorCategory::RateLimit
                | SyncErrorCategory::Server
                | SyncErrorCategory::Network
                | SyncErrorCategory::Database
        )
    }
}

impl From<BooksError> for SyncError {
    fn from(err: BooksError) -> Self {
        match err {
            BooksError::Database(message) => Self::Database(message),
            BooksError::Config(message) => Self::Config(message),
            BooksError::Network(message) => Self::Network(message),
            BooksError::NotFound(message) | BooksError::InvalidInput(message) => {
                Self::Client(message)
            }
            BooksError::Serialization(message) => Self::Client(message),
            BooksError::Internal(message) => Self::Server(message),
        }
    }
}

impl From<reqwest::Error> for SyncError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return Self::Network(err.to_string());
        }
        match err.status() {
            Some(status) if status.as_u16() == 401 || status.as_u16() == 403 => {
                Self::Auth(err.to_string())
            }
            Some(status) if status.as_u16() == 429 => Self::RateLimit(err.to_string()),
            Some(status) if status.is_server_error() => Self::Server(err.to_string()),
            Some(_) => Self::Client(err.to_string()),
            None => Self::Network(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_errors_are_retryable() {
        assert!(SyncError::Server("boom".into()).should_retry());
        assert!(SyncError::Network("offline".into()).should_retry());
        assert!(SyncError::RateLimit("slow down".into()).should_retry());
    }

    #[test]
    fn client_errors_are_not_retryable() {
        assert!(!SyncError::Client("bad payload".into()).should_retry());
        assert!(!SyncError::Config("missing base url".into()).should_retry());
    }

    #[test]
    fn domain_errors_map_to_categories() {
        let err = SyncError::from(BooksError::NotFound("draft".into()));
        assert_eq!(err.category(), SyncErrorCategory::Client);

        let err = SyncError::from(BooksError::Database("locked".into()));
        assert_eq!(err.category(), SyncErrorCategory::Database);
    }
}
