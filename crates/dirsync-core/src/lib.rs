//! Directory reconciliation engine
//!
//! Mirrors users, groups and group memberships from an upstream directory
//! into a SCIM provisioning target, optionally recording membership in a
//! secondary cache.
//!
//! A run reads both sides, classifies every user, group and membership, then
//! applies the changes in a fixed order:
//!
//! 1. delete users no longer upstream
//! 2. update changed users
//! 3. create new users
//! 4. create (or adopt) new groups
//! 5. add every upstream member to those groups
//! 6. add missing and remove extra members of groups present on both sides
//! 7. delete groups no longer upstream
//!
//! The first failure aborts the run. Re-running converges.

pub mod apply;
pub mod config;
pub mod diff;
pub mod error;
pub mod index;
pub mod keys;
pub mod model;
pub mod reconciler;
pub mod report;
pub mod snapshot;
pub mod store;
pub mod traits;

pub use apply::{Applier, Plan};
pub use config::SyncConfig;
pub use diff::{GroupMembers, GroupOperations, MembershipOperations, UserOperations};
pub use error::{ResourceKind, SyncError, SyncResult};
pub use index::UserIndex;
pub use keys::{GroupKeyPolicy, GroupKeys, UserKeys};
pub use model::{
    DownstreamGroup, DownstreamUser, MemberKind, UpstreamGroup, UpstreamMember, UpstreamUser,
};
pub use reconciler::Reconciler;
pub use report::{ApplyStats, PlanSummary, SyncReport};
pub use snapshot::{DownstreamSnapshot, UpstreamSnapshot};
pub use store::MembershipStore;
pub use traits::{DirectoryReader, MembershipCache, ProvisioningClient};

// Re-export so implementors don't need a direct dependency.
pub use async_trait::async_trait;
