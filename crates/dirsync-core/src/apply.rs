//! The ordered apply sequence.
//!
//! Steps run strictly in order and the first failure aborts the rest. Nothing
//! is rolled back: the next run recomputes the diff from live state and
//! picks up where this one stopped.

use std::collections::HashSet;

use tracing::{debug, info, warn};

use crate::diff::{GroupMembers, GroupOperations, MembershipOperations, UserOperations};
use crate::error::SyncResult;
use crate::index::UserIndex;
use crate::keys::{GroupKeys, UserKeys};
use crate::model::DownstreamGroup;
use crate::report::{ApplyStats, PlanSummary};
use crate::store::MembershipStore;
use crate::traits::ProvisioningClient;

/// Everything the apply sequence needs, computed before any write.
#[derive(Debug, Clone, Default)]
pub struct Plan {
    pub users: UserOperations,
    pub groups: GroupOperations,
    pub memberships: MembershipOperations,
    /// Upstream member keys per group key, the add side of membership.
    pub upstream_members: GroupMembers,
}

impl Plan {
    #[must_use]
    pub fn summary(&self) -> PlanSummary {
        PlanSummary {
            users_to_add: self.users.to_add.len(),
            users_to_delete: self.users.to_delete.len(),
            users_to_update: self.users.to_update.len(),
            users_unchanged: self.users.unchanged.len(),
            groups_to_add: self.groups.to_add.len(),
            groups_to_delete: self.groups.to_delete.len(),
            groups_equal: self.groups.equal.len(),
            memberships_to_delete: self.memberships.delete.values().map(Vec::len).sum(),
        }
    }

    fn upstream_members_of(&self, group_key: &str) -> &[String] {
        self.upstream_members
            .get(group_key)
            .map_or(&[], Vec::as_slice)
    }
}

/// Executes a [`Plan`] against the provisioning target and cache.
pub struct Applier<'a> {
    provisioning: &'a dyn ProvisioningClient,
    store: MembershipStore<'a>,
    user_keys: UserKeys,
    group_keys: GroupKeys,
}

impl<'a> Applier<'a> {
    #[must_use]
    pub fn new(
        provisioning: &'a dyn ProvisioningClient,
        store: MembershipStore<'a>,
        user_keys: UserKeys,
        group_keys: GroupKeys,
    ) -> Self {
        Self {
            provisioning,
            store,
            user_keys,
            group_keys,
        }
    }

    /// Run all seven steps in order.
    pub async fn apply(&self, plan: &Plan, index: &mut UserIndex) -> SyncResult<ApplyStats> {
        let mut stats = ApplyStats::default();

        let deleted = self.delete_users(plan, index, &mut stats).await?;
        self.update_users(plan, index, &mut stats).await?;
        self.create_users(plan, index, &mut stats).await?;
        let populated = self.create_groups(plan, &mut stats).await?;
        self.populate_groups(plan, &populated, index, &mut stats)
            .await?;
        self.reconcile_groups(plan, &deleted, index, &mut stats)
            .await?;
        self.delete_groups(plan, &mut stats).await?;

        Ok(stats)
    }

    /// Step 1. Returns the keys of every user that is now gone downstream.
    async fn delete_users(
        &self,
        plan: &Plan,
        index: &mut UserIndex,
        stats: &mut ApplyStats,
    ) -> SyncResult<HashSet<String>> {
        debug!("Deleting users no longer upstream");
        let mut deleted = HashSet::new();

        for user in &plan.users.to_delete {
            let key = (self.user_keys.downstream)(user);

            match self.provisioning.find_user_by_key(key).await? {
                None => {
                    debug!(user = %key, "user already deleted");
                    stats.users_already_deleted += 1;
                }
                Some(current) => {
                    warn!(user = %key, "Deleting user");
                    match self.provisioning.delete_user(&current).await {
                        Ok(()) => stats.users_deleted += 1,
                        Err(e) if e.is_not_found() => {
                            debug!(user = %key, "user already deleted");
                            stats.users_already_deleted += 1;
                        }
                        Err(e) => return Err(e),
                    }
                }
            }

            index.remove(key);
            self.store.forget_user(key).await?;
            deleted.insert(key.to_string());
        }

        Ok(deleted)
    }

    /// Step 2.
    async fn update_users(
        &self,
        plan: &Plan,
        index: &mut UserIndex,
        stats: &mut ApplyStats,
    ) -> SyncResult<()> {
        debug!("Updating users changed upstream");

        for user in &plan.users.to_update {
            let key = (self.user_keys.downstream)(user);

            let mut record = user.clone();
            if record.id.is_none() {
                record.id = index.resolve(self.provisioning, key).await?.id;
            }

            warn!(user = %key, active = record.active, "Updating user");
            let updated = self.provisioning.update_user(&record).await?;
            index.insert(key, updated);
            stats.users_updated += 1;
        }

        Ok(())
    }

    /// Step 3.
    async fn create_users(
        &self,
        plan: &Plan,
        index: &mut UserIndex,
        stats: &mut ApplyStats,
    ) -> SyncResult<()> {
        debug!("Creating users added upstream");

        for user in &plan.users.to_add {
            let key = (self.user_keys.downstream)(user);
            info!(user = %key, "Creating user");
            let created = self.provisioning.create_user(user).await?;
            index.insert(key, created);
            stats.users_created += 1;
        }

        Ok(())
    }

    /// Step 4. Returns the groups step 5 must populate, created or adopted.
    async fn create_groups(
        &self,
        plan: &Plan,
        stats: &mut ApplyStats,
    ) -> SyncResult<Vec<DownstreamGroup>> {
        debug!("Creating groups added upstream");
        let mut populated = Vec::with_capacity(plan.groups.to_add.len());

        for group in &plan.groups.to_add {
            let key = (self.group_keys.downstream)(group);

            if let Some(existing) = self.provisioning.find_group_by_key(key).await? {
                info!(group = %key, "Adopting existing group");
                stats.groups_adopted += 1;
                populated.push(existing);
                continue;
            }

            info!(group = %key, "Creating group");
            let created = self.provisioning.create_group(group).await?;
            stats.groups_created += 1;
            populated.push(created);
        }

        Ok(populated)
    }

    /// Step 5. Every upstream member is added without checking first.
    async fn populate_groups(
        &self,
        plan: &Plan,
        groups: &[DownstreamGroup],
        index: &mut UserIndex,
        stats: &mut ApplyStats,
    ) -> SyncResult<()> {
        for group in groups {
            let group_key = (self.group_keys.downstream)(group);

            for member_key in plan.upstream_members_of(group_key) {
                let user = index.resolve(self.provisioning, member_key).await?;
                info!(group = %group_key, user = %member_key, "Adding user to group");
                self.store.add_member(&user, group).await?;
                stats.members_added += 1;
            }
        }

        Ok(())
    }

    /// Step 6. Add what the live target is missing, then remove extras.
    async fn reconcile_groups(
        &self,
        plan: &Plan,
        deleted: &HashSet<String>,
        index: &mut UserIndex,
        stats: &mut ApplyStats,
    ) -> SyncResult<()> {
        debug!("Validating members of groups present on both sides");

        for group in &plan.groups.equal {
            let group_key = (self.group_keys.downstream)(group);

            for member_key in plan.upstream_members_of(group_key) {
                let user = index.resolve(self.provisioning, member_key).await?;
                if self.store.is_member_live(&user, group).await? {
                    continue;
                }
                info!(group = %group_key, user = %member_key, "Adding user to group");
                self.store.add_member(&user, group).await?;
                stats.members_added += 1;
            }

            for member_key in plan.memberships.deletions_for(group_key) {
                if deleted.contains(member_key) {
                    debug!(group = %group_key, user = %member_key, "member was deleted, skipping removal");
                    continue;
                }
                let Some(user) = index.lookup(self.provisioning, member_key).await? else {
                    // Only the cache still knows this member.
                    warn!(
                        group = %group_key,
                        user = %member_key,
                        "Dropping stale cached member"
                    );
                    self.store.forget_member(group_key, member_key).await?;
                    stats.stale_members_dropped += 1;
                    continue;
                };
                warn!(group = %group_key, user = %member_key, "Removing user from group");
                self.store.remove_member(&user, group).await?;
                stats.members_removed += 1;
            }
        }

        Ok(())
    }

    /// Step 7.
    async fn delete_groups(&self, plan: &Plan, stats: &mut ApplyStats) -> SyncResult<()> {
        debug!("Deleting groups no longer upstream");

        for group in &plan.groups.to_delete {
            let key = (self.group_keys.downstream)(group);
            warn!(group = %key, "Deleting group");
            self.store.delete_group(group).await?;
            stats.groups_deleted += 1;
        }

        Ok(())
    }
}
