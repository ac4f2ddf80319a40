//! Postgres-backed [`MembershipCache`].

use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::{debug, info};

use dirsync_core::{MembershipCache, SyncError, SyncResult};

use crate::error::CacheError;

/// Membership rows in `group_memberships`, keyed by group key and user key.
#[derive(Debug, Clone)]
pub struct PgMembershipCache {
    pool: PgPool,
}

impl PgMembershipCache {
    /// Wrap an existing pool. The schema is assumed to exist.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect to `database_url`.
    ///
    /// # Errors
    ///
    /// Returns `CacheError::ConnectionFailed` if the database is unreachable.
    pub async fn connect(database_url: &str) -> Result<Self, CacheError> {
        let pool = PgPoolOptions::new()
            .max_connections(2)
            .acquire_timeout(Duration::from_secs(10))
            .connect(database_url)
            .await
            .map_err(CacheError::ConnectionFailed)?;

        info!("Membership cache connected");
        Ok(Self { pool })
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn members(&self, group_key: &str) -> Result<Vec<String>, CacheError> {
        let rows: Vec<(String,)> = sqlx::query_as(
            r#"
            SELECT username FROM group_memberships
            WHERE group_name = $1
            ORDER BY username
            "#,
        )
        .bind(group_key)
        .fetch_all(&self.pool)
        .await
        .map_err(CacheError::QueryFailed)?;

        Ok(rows.into_iter().map(|(username,)| username).collect())
    }

    pub async fn contains(&self, group_key: &str, user_key: &str) -> Result<bool, CacheError> {
        let row: (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM group_memberships
                WHERE group_name = $1 AND username = $2
            )
            "#,
        )
        .bind(group_key)
        .bind(user_key)
        .fetch_one(&self.pool)
        .await
        .map_err(CacheError::QueryFailed)?;

        Ok(row.0)
    }

    /// Insert a row. Returns `false` when it already existed.
    pub async fn insert(&self, group_key: &str, user_key: &str) -> Result<bool, CacheError> {
        let result = sqlx::query(
            r#"
            INSERT INTO group_memberships (group_name, username)
            VALUES ($1, $2)
            ON CONFLICT (group_name, username) DO NOTHING
            "#,
        )
        .bind(group_key)
        .bind(user_key)
        .execute(&self.pool)
        .await
        .map_err(CacheError::QueryFailed)?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete a row. Returns `false` when there was none.
    pub async fn delete(&self, group_key: &str, user_key: &str) -> Result<bool, CacheError> {
        let result = sqlx::query(
            r#"
            DELETE FROM group_memberships
            WHERE group_name = $1 AND username = $2
            "#,
        )
        .bind(group_key)
        .bind(user_key)
        .execute(&self.pool)
        .await
        .map_err(CacheError::QueryFailed)?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_group(&self, group_key: &str) -> Result<u64, CacheError> {
        let result = sqlx::query("DELETE FROM group_memberships WHERE group_name = $1")
            .bind(group_key)
            .execute(&self.pool)
            .await
            .map_err(CacheError::QueryFailed)?;

        Ok(result.rows_affected())
    }

    pub async fn delete_user(&self, user_key: &str) -> Result<u64, CacheError> {
        let result = sqlx::query("DELETE FROM group_memberships WHERE username = $1")
            .bind(user_key)
            .execute(&self.pool)
            .await
            .map_err(CacheError::QueryFailed)?;

        Ok(result.rows_affected())
    }
}

fn cache_error(operation: &str, err: CacheError) -> SyncError {
    SyncError::cache(format!("membership cache {operation} failed"), err)
}

#[async_trait]
impl MembershipCache for PgMembershipCache {
    async fn list_members(&self, group_key: &str) -> SyncResult<Vec<String>> {
        self.members(group_key)
            .await
            .map_err(|e| cache_error("list members", e))
    }

    async fn is_member(&self, group_key: &str, user_key: &str) -> SyncResult<bool> {
        self.contains(group_key, user_key)
            .await
            .map_err(|e| cache_error("membership check", e))
    }

    async fn add_member(&self, group_key: &str, user_key: &str) -> SyncResult<()> {
        let inserted = self
            .insert(group_key, user_key)
            .await
            .map_err(|e| cache_error("add member", e))?;
        if !inserted {
            debug!(group = %group_key, user = %user_key, "Cache row already present");
        }
        Ok(())
    }

    async fn remove_member(&self, group_key: &str, user_key: &str) -> SyncResult<()> {
        self.delete(group_key, user_key)
            .await
            .map(|_| ())
            .map_err(|e| cache_error("remove member", e))
    }

    async fn purge_group(&self, group_key: &str) -> SyncResult<()> {
        let removed = self
            .delete_group(group_key)
            .await
            .map_err(|e| cache_error("purge group", e))?;
        debug!(group = %group_key, removed, "Purged cached group members");
        Ok(())
    }

    async fn purge_user(&self, user_key: &str) -> SyncResult<()> {
        let removed = self
            .delete_user(user_key)
            .await
            .map_err(|e| cache_error("purge user", e))?;
        debug!(user = %user_key, removed, "Purged cached user memberships");
        Ok(())
    }
}
