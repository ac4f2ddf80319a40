//! Membership writes against the provisioning target and the optional cache.
//!
//! Additions touch the cache first (only when the row is missing), removals
//! touch it last. A crash between the two writes therefore leaves the cache
//! under-reporting additions or over-reporting removals, both of which the
//! next run repairs from upstream.

use tracing::debug;

use crate::error::SyncResult;
use crate::keys::{GroupKeys, UserKeys};
use crate::model::{DownstreamGroup, DownstreamUser};
use crate::traits::{MembershipCache, ProvisioningClient};

/// Pair of membership back ends written in a fixed order.
#[derive(Clone, Copy)]
pub struct MembershipStore<'a> {
    provisioning: &'a dyn ProvisioningClient,
    cache: Option<&'a dyn MembershipCache>,
    user_keys: UserKeys,
    group_keys: GroupKeys,
}

impl<'a> MembershipStore<'a> {
    #[must_use]
    pub fn new(
        provisioning: &'a dyn ProvisioningClient,
        cache: Option<&'a dyn MembershipCache>,
        user_keys: UserKeys,
        group_keys: GroupKeys,
    ) -> Self {
        Self {
            provisioning,
            cache,
            user_keys,
            group_keys,
        }
    }

    #[must_use]
    pub fn has_cache(&self) -> bool {
        self.cache.is_some()
    }

    /// Member keys of `group` as recorded downstream.
    ///
    /// Reads the cache when there is one; otherwise asks the provisioning
    /// target once per candidate user.
    pub async fn members_of(
        &self,
        group: &DownstreamGroup,
        candidates: &[DownstreamUser],
    ) -> SyncResult<Vec<String>> {
        let group_key = (self.group_keys.downstream)(group);
        if let Some(cache) = self.cache {
            return cache.list_members(group_key).await;
        }

        let mut members = Vec::new();
        for user in candidates {
            if self.provisioning.is_member(user, group).await? {
                members.push((self.user_keys.downstream)(user).to_string());
            }
        }
        debug!(group = %group_key, count = members.len(), "Checked group membership downstream");
        Ok(members)
    }

    /// Whether `user` is in `group` according to the provisioning target.
    pub async fn is_member_live(
        &self,
        user: &DownstreamUser,
        group: &DownstreamGroup,
    ) -> SyncResult<bool> {
        self.provisioning.is_member(user, group).await
    }

    /// Add `user` to `group`: cache (if absent), then provisioning target.
    pub async fn add_member(
        &self,
        user: &DownstreamUser,
        group: &DownstreamGroup,
    ) -> SyncResult<()> {
        if let Some(cache) = self.cache {
            let group_key = (self.group_keys.downstream)(group);
            let user_key = (self.user_keys.downstream)(user);
            if !cache.is_member(group_key, user_key).await? {
                cache.add_member(group_key, user_key).await?;
            }
        }
        self.provisioning.add_member(user, group).await
    }

    /// Remove `user` from `group`: provisioning target, then cache.
    pub async fn remove_member(
        &self,
        user: &DownstreamUser,
        group: &DownstreamGroup,
    ) -> SyncResult<()> {
        self.provisioning.remove_member(user, group).await?;
        if let Some(cache) = self.cache {
            cache
                .remove_member(
                    (self.group_keys.downstream)(group),
                    (self.user_keys.downstream)(user),
                )
                .await?;
        }
        Ok(())
    }

    /// Delete `group` downstream and drop its cached rows.
    pub async fn delete_group(&self, group: &DownstreamGroup) -> SyncResult<()> {
        self.provisioning.delete_group(group).await?;
        if let Some(cache) = self.cache {
            cache
                .purge_group((self.group_keys.downstream)(group))
                .await?;
        }
        Ok(())
    }

    /// Drop one cached row whose user no longer exists downstream.
    pub async fn forget_member(&self, group_key: &str, user_key: &str) -> SyncResult<()> {
        if let Some(cache) = self.cache {
            cache.remove_member(group_key, user_key).await?;
        }
        Ok(())
    }

    /// Drop every cached membership row of a deleted user.
    pub async fn forget_user(&self, user_key: &str) -> SyncResult<()> {
        if let Some(cache) = self.cache {
            cache.purge_user(user_key).await?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for MembershipStore<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MembershipStore")
            .field("has_cache", &self.cache.is_some())
            .finish_non_exhaustive()
    }
}
