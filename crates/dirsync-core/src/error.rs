//! Reconciliation error types
//!
//! Errors are classified the way the apply sequence needs them: lookup misses,
//! I/O failures against one of the collaborators, and invariant violations
//! that make continuing unsafe.

use std::fmt;

use thiserror::Error;

/// Result type alias using [`SyncError`].
pub type SyncResult<T> = Result<T, SyncError>;

/// Kind of directory object an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    User,
    Group,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::User => write!(f, "user"),
            ResourceKind::Group => write!(f, "group"),
        }
    }
}

/// Error that can occur while reading snapshots or applying changes.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Lookup miss on either side.
    #[error("{kind} not found: {key}")]
    NotFound { kind: ResourceKind, key: String },

    /// The upstream directory failed to answer.
    #[error("directory error: {message}")]
    Directory {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The provisioning target failed to answer.
    #[error("provisioning error: {message}")]
    Provisioning {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The membership cache failed to answer.
    #[error("membership cache error: {message}")]
    Cache {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A precondition of the apply sequence does not hold.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    /// The sync configuration is unusable.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}

impl SyncError {
    /// Build a [`SyncError::NotFound`].
    pub fn not_found(kind: ResourceKind, key: impl Into<String>) -> Self {
        SyncError::NotFound {
            kind,
            key: key.into(),
        }
    }

    /// Wrap a directory failure.
    pub fn directory<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        SyncError::Directory {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Wrap a provisioning failure.
    pub fn provisioning<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        SyncError::Provisioning {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Wrap a membership cache failure.
    pub fn cache<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        SyncError::Cache {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Whether this is a lookup miss.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, SyncError::NotFound { .. })
    }

    /// Whether the failure came from I/O against a collaborator.
    ///
    /// The reconciler never retries these itself; a later run picks up
    /// wherever this one stopped.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            SyncError::Directory { .. } | SyncError::Provisioning { .. } | SyncError::Cache { .. }
        )
    }

    /// Stable code for log aggregation.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            SyncError::NotFound { .. } => "NOT_FOUND",
            SyncError::Directory { .. } => "DIRECTORY_ERROR",
            SyncError::Provisioning { .. } => "PROVISIONING_ERROR",
            SyncError::Cache { .. } => "CACHE_ERROR",
            SyncError::InvariantViolation(_) => "INVARIANT_VIOLATION",
            SyncError::InvalidConfiguration(_) => "INVALID_CONFIGURATION",
        }
    }
}
