//! Error types for the membership cache.

use thiserror::Error;

/// Membership cache errors.
#[derive(Debug, Error)]
pub enum CacheError {
    /// Failed to establish or acquire a database connection.
    #[error("Database connection failed: {0}")]
    ConnectionFailed(#[source] sqlx::Error),

    /// A migration failed to apply.
    #[error("Migration failed: {0}")]
    MigrationFailed(#[source] sqlx::migrate::MigrateError),

    /// A query failed to execute.
    #[error("Query failed: {0}")]
    QueryFailed(#[source] sqlx::Error),
}

impl CacheError {
    #[must_use]
    pub fn is_connection_error(&self) -> bool {
        matches!(self, CacheError::ConnectionFailed(_))
    }

    #[must_use]
    pub fn is_query_error(&self) -> bool {
        matches!(self, CacheError::QueryFailed(_))
    }
}
