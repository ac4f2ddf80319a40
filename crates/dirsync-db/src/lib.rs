//! Membership cache for directory sync
//!
//! Stores which user keys belong to which group keys in PostgreSQL so a run
//! can read downstream membership without probing the provisioning target
//! once per (user, group) pair.
//!
//! ```rust,ignore
//! use dirsync_db::{run_migrations, PgMembershipCache};
//!
//! let cache = PgMembershipCache::connect(&database_url).await?;
//! run_migrations(cache.pool()).await?;
//! ```

pub mod cache;
pub mod error;
pub mod migrations;

pub use cache::PgMembershipCache;
pub use error::CacheError;
pub use migrations::run_migrations;
