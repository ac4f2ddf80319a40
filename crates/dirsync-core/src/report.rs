//! Run summaries.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// How many changes a plan contains, per kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PlanSummary {
    pub users_to_add: usize,
    pub users_to_delete: usize,
    pub users_to_update: usize,
    pub users_unchanged: usize,
    pub groups_to_add: usize,
    pub groups_to_delete: usize,
    pub groups_equal: usize,
    pub memberships_to_delete: usize,
}

impl PlanSummary {
    /// Whether the plan would leave users and groups untouched.
    ///
    /// Membership additions are only discovered while applying, so an empty
    /// summary does not rule them out.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.users_to_add == 0
            && self.users_to_delete == 0
            && self.users_to_update == 0
            && self.groups_to_add == 0
            && self.groups_to_delete == 0
            && self.memberships_to_delete == 0
    }
}

/// Mutations actually performed against the provisioning target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ApplyStats {
    pub users_deleted: usize,
    /// Users the plan deleted that were already gone downstream.
    pub users_already_deleted: usize,
    pub users_updated: usize,
    pub users_created: usize,
    pub groups_created: usize,
    /// Groups new upstream that already existed downstream.
    pub groups_adopted: usize,
    pub groups_deleted: usize,
    pub members_added: usize,
    pub members_removed: usize,
    /// Cached memberships of users missing downstream, dropped from the cache.
    pub stale_members_dropped: usize,
}

impl ApplyStats {
    /// Total number of mutating calls.
    #[must_use]
    pub fn mutations(&self) -> usize {
        self.users_deleted
            + self.users_updated
            + self.users_created
            + self.groups_created
            + self.groups_deleted
            + self.members_added
            + self.members_removed
    }
}

/// Outcome of one reconciliation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub dry_run: bool,
    pub plan: PlanSummary,
    /// `None` for dry runs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applied: Option<ApplyStats>,
}

impl SyncReport {
    /// Wall-clock duration of the run in milliseconds.
    #[must_use]
    pub fn duration_ms(&self) -> i64 {
        (self.finished_at - self.started_at).num_milliseconds()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mutations_excludes_already_deleted() {
        let stats = ApplyStats {
            users_deleted: 1,
            users_already_deleted: 3,
            members_added: 2,
            ..Default::default()
        };
        assert_eq!(stats.mutations(), 3);
    }

    #[test]
    fn test_dry_run_report_omits_applied() {
        let now = Utc::now();
        let report = SyncReport {
            run_id: Uuid::new_v4(),
            started_at: now,
            finished_at: now,
            dry_run: true,
            plan: PlanSummary {
                users_to_add: 2,
                ..Default::default()
            },
            applied: None,
        };
        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("applied").is_none());
        assert_eq!(json["plan"]["users_to_add"], 2);
        assert!(!report.plan.is_empty());
        assert_eq!(report.duration_ms(), 0);
    }
}
