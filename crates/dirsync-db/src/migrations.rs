//! Schema management for the membership cache.

use sqlx::PgPool;

use crate::error::CacheError;

/// Run all pending migrations embedded from `migrations/`.
///
/// # Errors
///
/// Returns `CacheError::MigrationFailed` if any migration fails to apply.
pub async fn run_migrations(pool: &PgPool) -> Result<(), CacheError> {
    tracing::info!("Running membership cache migrations...");

    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(CacheError::MigrationFailed)?;

    tracing::info!("Migrations completed successfully");
    Ok(())
}
