//! Error types for the Google directory reader.

use thiserror::Error;

/// Result type alias using `DirectoryError`.
pub type DirectoryResult<T> = Result<T, DirectoryError>;

/// Errors that can occur when reading the Admin Directory API.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// Configuration validation error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Directory API returned an error payload.
    #[error("Directory API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// HTTP request error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Resource not found.
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Credentials rejected.
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Still rate limited or unavailable after every retry.
    #[error("Maximum retries ({attempts}) exceeded: {message}")]
    MaxRetriesExceeded { attempts: u32, message: String },
}

impl DirectoryError {
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, DirectoryError::NotFound(_))
    }
}
