//! Top-level reconciliation run: read, diff, apply.

use chrono::Utc;
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use crate::apply::{Applier, Plan};
use crate::config::SyncConfig;
use crate::diff::{group_operations, membership_operations, user_operations};
use crate::error::SyncResult;
use crate::index::UserIndex;
use crate::keys::{GroupKeys, UserKeys};
use crate::report::SyncReport;
use crate::snapshot::{read_downstream, read_upstream, DownstreamSnapshot};
use crate::store::MembershipStore;
use crate::traits::{DirectoryReader, MembershipCache, ProvisioningClient};

/// Mirrors the upstream directory into the provisioning target.
///
/// Holds no state between runs; every [`run`](Self::run) reads both sides
/// afresh.
pub struct Reconciler<'a> {
    directory: &'a dyn DirectoryReader,
    provisioning: &'a dyn ProvisioningClient,
    cache: Option<&'a dyn MembershipCache>,
    config: SyncConfig,
    user_keys: UserKeys,
    group_keys: GroupKeys,
}

impl<'a> Reconciler<'a> {
    /// Create a reconciler without a membership cache. Group keys follow
    /// `config.group_key_policy`.
    #[must_use]
    pub fn new(
        directory: &'a dyn DirectoryReader,
        provisioning: &'a dyn ProvisioningClient,
        config: SyncConfig,
    ) -> Self {
        let group_keys = GroupKeys::for_policy(config.group_key_policy);
        Self {
            directory,
            provisioning,
            cache: None,
            config,
            user_keys: UserKeys::default(),
            group_keys,
        }
    }

    /// Read and record membership through `cache`.
    #[must_use]
    pub fn with_cache(mut self, cache: &'a dyn MembershipCache) -> Self {
        self.cache = Some(cache);
        self
    }

    #[must_use]
    pub fn with_user_keys(mut self, keys: UserKeys) -> Self {
        self.user_keys = keys;
        self
    }

    #[must_use]
    pub fn with_group_keys(mut self, keys: GroupKeys) -> Self {
        self.group_keys = keys;
        self
    }

    #[must_use]
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    fn store(&self) -> MembershipStore<'a> {
        MembershipStore::new(self.provisioning, self.cache, self.user_keys, self.group_keys)
    }

    /// Read both sides and compute what a run would change.
    pub async fn plan(&self) -> SyncResult<(Plan, DownstreamSnapshot)> {
        let upstream =
            read_upstream(self.directory, &self.config, &self.user_keys, &self.group_keys)
                .await?;
        let downstream = read_downstream(self.provisioning, &self.store(), &self.group_keys).await?;

        let plan = Plan {
            users: user_operations(&downstream.users, &upstream.users, &self.user_keys),
            groups: group_operations(&downstream.groups, &upstream.groups, &self.group_keys),
            memberships: membership_operations(&upstream.members, &downstream.members),
            upstream_members: upstream.members,
        };

        Ok((plan, downstream))
    }

    /// Execute one full reconciliation.
    ///
    /// In dry-run mode the plan is computed and logged and nothing is
    /// written.
    pub async fn run(&self) -> SyncResult<SyncReport> {
        self.config.validate()?;

        let run_id = Uuid::new_v4();
        let span = info_span!("sync_run", run_id = %run_id, dry_run = self.config.dry_run);

        self.execute(run_id).instrument(span).await
    }

    async fn execute(&self, run_id: Uuid) -> SyncResult<SyncReport> {
        let started_at = Utc::now();
        info!("Starting directory sync");

        let (plan, downstream) = self.plan().await?;
        let summary = plan.summary();
        info!(
            users_to_add = summary.users_to_add,
            users_to_delete = summary.users_to_delete,
            users_to_update = summary.users_to_update,
            groups_to_add = summary.groups_to_add,
            groups_to_delete = summary.groups_to_delete,
            memberships_to_delete = summary.memberships_to_delete,
            "Sync plan computed"
        );

        if self.config.dry_run {
            info!("Running in dry run mode, skipping apply");
            return Ok(SyncReport {
                run_id,
                started_at,
                finished_at: Utc::now(),
                dry_run: true,
                plan: summary,
                applied: None,
            });
        }

        let mut index = UserIndex::new(&downstream.users, &self.user_keys);
        let applier = Applier::new(
            self.provisioning,
            self.store(),
            self.user_keys,
            self.group_keys,
        );
        let stats = applier.apply(&plan, &mut index).await?;

        info!(mutations = stats.mutations(), "Directory sync completed");

        Ok(SyncReport {
            run_id,
            started_at,
            finished_at: Utc::now(),
            dry_run: false,
            plan: summary,
            applied: Some(stats),
        })
    }
}
