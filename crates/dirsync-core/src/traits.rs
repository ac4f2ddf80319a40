//! Collaborator traits
//!
//! The reconciler talks to three independent back ends. Each is a separate
//! trait so the dual-store write ordering stays in the reconciler, where it
//! can be seen and tested, instead of hiding behind one merged client.

use async_trait::async_trait;

use crate::error::SyncResult;
use crate::model::{DownstreamGroup, DownstreamUser, UpstreamGroup, UpstreamMember, UpstreamUser};

/// Read access to the upstream directory.
///
/// Query strings are opaque filter expressions of the upstream; they are
/// passed through unmodified. An empty query means "everything".
#[async_trait]
pub trait DirectoryReader: Send + Sync {
    /// List groups matching `query`.
    async fn list_groups(&self, query: &str) -> SyncResult<Vec<UpstreamGroup>>;

    /// List the direct members of `group`.
    async fn list_group_members(&self, group: &UpstreamGroup) -> SyncResult<Vec<UpstreamMember>>;

    /// List users matching `query`.
    async fn list_users(&self, query: &str) -> SyncResult<Vec<UpstreamUser>>;

    /// List users that were deleted upstream and are still retained.
    async fn list_deleted_users(&self) -> SyncResult<Vec<UpstreamUser>>;

    /// Fetch a single user by primary email. `Ok(None)` when unknown.
    async fn get_user(&self, email: &str) -> SyncResult<Option<UpstreamUser>>;
}

/// CRUD access to the provisioning target.
///
/// Implementations report a missing object on `delete_*` as
/// [`SyncError::NotFound`](crate::error::SyncError::NotFound).
#[async_trait]
pub trait ProvisioningClient: Send + Sync {
    async fn find_user_by_key(&self, key: &str) -> SyncResult<Option<DownstreamUser>>;

    /// Create `user`, returning the record with its target id.
    async fn create_user(&self, user: &DownstreamUser) -> SyncResult<DownstreamUser>;

    /// Replace the attributes of the user identified by `user.id`.
    async fn update_user(&self, user: &DownstreamUser) -> SyncResult<DownstreamUser>;

    async fn delete_user(&self, user: &DownstreamUser) -> SyncResult<()>;

    async fn find_group_by_key(&self, key: &str) -> SyncResult<Option<DownstreamGroup>>;

    /// Create an empty group, returning the record with its target id.
    async fn create_group(&self, group: &DownstreamGroup) -> SyncResult<DownstreamGroup>;

    async fn delete_group(&self, group: &DownstreamGroup) -> SyncResult<()>;

    async fn is_member(&self, user: &DownstreamUser, group: &DownstreamGroup) -> SyncResult<bool>;

    async fn add_member(&self, user: &DownstreamUser, group: &DownstreamGroup) -> SyncResult<()>;

    async fn remove_member(&self, user: &DownstreamUser, group: &DownstreamGroup)
        -> SyncResult<()>;

    async fn list_groups(&self) -> SyncResult<Vec<DownstreamGroup>>;

    async fn list_users(&self) -> SyncResult<Vec<DownstreamUser>>;
}

/// Secondary record of group membership, keyed by group and user keys.
///
/// Exists because a provisioning API may only answer "is this user in this
/// group", making a full membership read cost one call per user per group.
#[async_trait]
pub trait MembershipCache: Send + Sync {
    /// User keys recorded as members of `group_key`.
    async fn list_members(&self, group_key: &str) -> SyncResult<Vec<String>>;

    async fn is_member(&self, group_key: &str, user_key: &str) -> SyncResult<bool>;

    async fn add_member(&self, group_key: &str, user_key: &str) -> SyncResult<()>;

    async fn remove_member(&self, group_key: &str, user_key: &str) -> SyncResult<()>;

    /// Drop every row of `group_key`.
    async fn purge_group(&self, group_key: &str) -> SyncResult<()>;

    /// Drop every row of `user_key`, across all groups.
    async fn purge_user(&self, user_key: &str) -> SyncResult<()>;
}
