use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Main error type for the application.
#[derive(Error, Debug)]
pub enum AppError {
    /// Resource not found error.
    #[error("{0}")]
    NotFound(String),

    /// I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status == StatusCode::NOT_FOUND {
            tracing::debug!(error = %self, "Not found");
        } else {
            tracing::error!(error = %self, "Request error");
        }

        (status, self.to_string()).into_response()
    }
}

/// Errors raised while reading a book snapshot from disk.
///
/// These never reach an HTTP client: the cache logs them and reports the
/// book as absent.
#[derive(Error, Debug)]
pub enum SnapshotError {
    /// The snapshot file could not be read.
    #[error("failed to read snapshot: {0}")]
    Io(#[from] std::io::Error),

    /// The snapshot contents did not match the book schema.
    #[error("failed to decode snapshot: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for the application.
pub type Result<T> = std::result::Result<T, AppError>;
