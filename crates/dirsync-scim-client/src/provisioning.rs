//! [`ProvisioningClient`] backed by a SCIM target.

use async_trait::async_trait;
use tracing::debug;

use dirsync_core::{
    DownstreamGroup, DownstreamUser, ProvisioningClient, ResourceKind, SyncError, SyncResult,
};

use crate::client::ScimClient;
use crate::error::ScimClientError;
use crate::models::{ScimGroup, ScimUser};

fn provisioning_error(operation: &str, err: ScimClientError) -> SyncError {
    SyncError::provisioning(format!("SCIM {operation} failed"), err)
}

fn user_id(user: &DownstreamUser) -> SyncResult<&str> {
    user.id.as_deref().ok_or_else(|| {
        SyncError::InvariantViolation(format!("user {} has no SCIM id", user.user_name))
    })
}

fn group_id(group: &DownstreamGroup) -> SyncResult<&str> {
    group.id.as_deref().ok_or_else(|| {
        SyncError::InvariantViolation(format!("group {} has no SCIM id", group.display_name))
    })
}

#[async_trait]
impl ProvisioningClient for ScimClient {
    async fn find_user_by_key(&self, key: &str) -> SyncResult<Option<DownstreamUser>> {
        self.find_user_by_user_name(key)
            .await
            .map(|found| found.map(DownstreamUser::from))
            .map_err(|e| provisioning_error("find user", e))
    }

    async fn create_user(&self, user: &DownstreamUser) -> SyncResult<DownstreamUser> {
        let mut body = ScimUser::from(user);
        body.id = None;
        ScimClient::create_user(self, &body)
            .await
            .map(DownstreamUser::from)
            .map_err(|e| provisioning_error("create user", e))
    }

    async fn update_user(&self, user: &DownstreamUser) -> SyncResult<DownstreamUser> {
        let id = user_id(user)?;
        self.replace_user(id, &ScimUser::from(user))
            .await
            .map(DownstreamUser::from)
            .map_err(|e| provisioning_error("update user", e))
    }

    async fn delete_user(&self, user: &DownstreamUser) -> SyncResult<()> {
        let id = user_id(user)?;
        match ScimClient::delete_user(self, id).await {
            Ok(()) => Ok(()),
            Err(e) if e.is_not_found() => {
                Err(SyncError::not_found(ResourceKind::User, &user.user_name))
            }
            Err(e) => Err(provisioning_error("delete user", e)),
        }
    }

    async fn find_group_by_key(&self, key: &str) -> SyncResult<Option<DownstreamGroup>> {
        self.find_group_by_display_name(key)
            .await
            .map(|found| found.map(DownstreamGroup::from))
            .map_err(|e| provisioning_error("find group", e))
    }

    async fn create_group(&self, group: &DownstreamGroup) -> SyncResult<DownstreamGroup> {
        let mut body = ScimGroup::from(group);
        body.id = None;
        ScimClient::create_group(self, &body)
            .await
            .map(DownstreamGroup::from)
            .map_err(|e| provisioning_error("create group", e))
    }

    async fn delete_group(&self, group: &DownstreamGroup) -> SyncResult<()> {
        let id = group_id(group)?;
        match ScimClient::delete_group(self, id).await {
            Ok(()) => Ok(()),
            Err(e) if e.is_not_found() => Err(SyncError::not_found(
                ResourceKind::Group,
                &group.display_name,
            )),
            Err(e) => Err(provisioning_error("delete group", e)),
        }
    }

    async fn is_member(&self, user: &DownstreamUser, group: &DownstreamGroup) -> SyncResult<bool> {
        ScimClient::is_member(self, group_id(group)?, user_id(user)?)
            .await
            .map_err(|e| provisioning_error("check membership", e))
    }

    async fn add_member(&self, user: &DownstreamUser, group: &DownstreamGroup) -> SyncResult<()> {
        let add = [user_id(user)?.to_string()];
        debug!(group = %group.display_name, user = %user.user_name, "SCIM add member");
        self.patch_group_members(group_id(group)?, &add, &[])
            .await
            .map_err(|e| provisioning_error("add member", e))
    }

    async fn remove_member(
        &self,
        user: &DownstreamUser,
        group: &DownstreamGroup,
    ) -> SyncResult<()> {
        let remove = [user_id(user)?.to_string()];
        debug!(group = %group.display_name, user = %user.user_name, "SCIM remove member");
        self.patch_group_members(group_id(group)?, &[], &remove)
            .await
            .map_err(|e| provisioning_error("remove member", e))
    }

    async fn list_groups(&self) -> SyncResult<Vec<DownstreamGroup>> {
        self.list_all_groups()
            .await
            .map(|groups| groups.into_iter().map(DownstreamGroup::from).collect())
            .map_err(|e| provisioning_error("list groups", e))
    }

    async fn list_users(&self) -> SyncResult<Vec<DownstreamUser>> {
        self.list_all_users()
            .await
            .map(|users| users.into_iter().map(DownstreamUser::from).collect())
            .map_err(|e| provisioning_error("list users", e))
    }
}
