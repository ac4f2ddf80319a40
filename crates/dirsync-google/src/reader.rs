//! [`DirectoryReader`] backed by the Admin Directory API.

use async_trait::async_trait;

use dirsync_core::{
    DirectoryReader, SyncError, SyncResult, UpstreamGroup, UpstreamMember, UpstreamUser,
};

use crate::client::DirectoryClient;
use crate::error::DirectoryError;

fn directory_error(operation: &str, err: DirectoryError) -> SyncError {
    SyncError::directory(format!("Google directory {operation} failed"), err)
}

#[async_trait]
impl DirectoryReader for DirectoryClient {
    async fn list_groups(&self, query: &str) -> SyncResult<Vec<UpstreamGroup>> {
        self.groups(query)
            .await
            .map(|groups| groups.into_iter().map(UpstreamGroup::from).collect())
            .map_err(|e| directory_error("list groups", e))
    }

    async fn list_group_members(&self, group: &UpstreamGroup) -> SyncResult<Vec<UpstreamMember>> {
        let key = group.id.as_deref().unwrap_or(&group.email);
        self.members(key)
            .await
            .map(|members| members.into_iter().map(UpstreamMember::from).collect())
            .map_err(|e| directory_error("list group members", e))
    }

    async fn list_users(&self, query: &str) -> SyncResult<Vec<UpstreamUser>> {
        self.users(query)
            .await
            .map(|users| users.into_iter().map(UpstreamUser::from).collect())
            .map_err(|e| directory_error("list users", e))
    }

    async fn list_deleted_users(&self) -> SyncResult<Vec<UpstreamUser>> {
        self.deleted_users()
            .await
            .map(|users| users.into_iter().map(UpstreamUser::from).collect())
            .map_err(|e| directory_error("list deleted users", e))
    }

    async fn get_user(&self, email: &str) -> SyncResult<Option<UpstreamUser>> {
        self.user(email)
            .await
            .map(|user| user.map(UpstreamUser::from))
            .map_err(|e| directory_error("get user", e))
    }
}
