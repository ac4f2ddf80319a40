//! SCIM client error types.

use thiserror::Error;

/// Result type alias using [`ScimClientError`].
pub type ScimClientResult<T> = Result<T, ScimClientError>;

/// Errors raised while talking to a SCIM target.
#[derive(Debug, Error)]
pub enum ScimClientError {
    /// 404 from the target.
    #[error("SCIM resource not found: {0}")]
    NotFound(String),

    /// 409 from the target, usually a uniqueness clash.
    #[error("SCIM conflict: {0}")]
    Conflict(String),

    /// 429 from the target.
    #[error("SCIM target rate limited (retry after {retry_after_secs:?}s)")]
    RateLimited { retry_after_secs: Option<u64> },

    /// 401/403 from the target.
    #[error("SCIM authentication failed: {0}")]
    AuthError(String),

    /// Any other non-success status.
    #[error("SCIM error {status}: {detail}")]
    ScimError { status: u16, detail: String },

    /// Connection could not be established.
    #[error("SCIM target unreachable: {0}")]
    Unreachable(String),

    /// Request timed out.
    #[error("SCIM request timed out: {0}")]
    Timeout(String),

    /// Other transport failure.
    #[error("HTTP error: {0}")]
    Http(String),

    /// Response body did not match the expected schema.
    #[error("Failed to parse SCIM response: {0}")]
    ParseError(String),

    /// Client could not be built from its settings.
    #[error("Invalid SCIM client configuration: {0}")]
    InvalidConfig(String),

    /// A listing returned more resources than the client will hold.
    #[error("SCIM target holds more than {limit} {resource}; refusing a partial listing")]
    TooManyResources { resource: String, limit: usize },

    /// Retry budget exhausted.
    #[error("Max retries exceeded after {attempts} attempt(s): {message}")]
    MaxRetriesExceeded { attempts: u32, message: String },
}

impl ScimClientError {
    /// Network-level failures and throttling.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ScimClientError::RateLimited { .. }
                | ScimClientError::Unreachable(_)
                | ScimClientError::Timeout(_)
        )
    }

    /// 5xx responses.
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        matches!(self, ScimClientError::ScimError { status, .. } if *status >= 500)
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, ScimClientError::NotFound(_))
    }
}

impl From<reqwest::Error> for ScimClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ScimClientError::Timeout(err.to_string())
        } else if err.is_connect() {
            ScimClientError::Unreachable(err.to_string())
        } else if err.is_decode() {
            ScimClientError::ParseError(err.to_string())
        } else {
            ScimClientError::Http(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ScimClientError {
    fn from(err: serde_json::Error) -> Self {
        ScimClientError::ParseError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_classification() {
        assert!(ScimClientError::RateLimited {
            retry_after_secs: Some(1)
        }
        .is_retryable());
        assert!(ScimClientError::Unreachable("host".into()).is_retryable());
        assert!(!ScimClientError::Conflict("dup".into()).is_retryable());

        let bad_gateway = ScimClientError::ScimError {
            status: 502,
            detail: "bad gateway".into(),
        };
        assert!(bad_gateway.is_server_error());
        assert!(!ScimClientError::ScimError {
            status: 400,
            detail: "bad request".into(),
        }
        .is_server_error());
    }
}
