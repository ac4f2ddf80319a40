//! Values the reconciler consumes. Loading them is the caller's business.

use serde::{Deserialize, Serialize};

use crate::error::{SyncError, SyncResult};
use crate::keys::GroupKeyPolicy;

/// Reconciliation settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Upstream filter for users synced regardless of group membership.
    /// Empty means only group members are synced.
    pub user_query: String,

    /// Upstream filter for groups. Empty means every group.
    pub group_query: String,

    /// User emails never synced (exact match).
    pub ignore_users: Vec<String>,

    /// Group emails never synced (exact match).
    pub ignore_groups: Vec<String>,

    /// When non-empty, only these group emails are synced.
    pub include_groups: Vec<String>,

    /// Which upstream attribute names a group downstream.
    pub group_key_policy: GroupKeyPolicy,

    /// Compute and log the plan without applying it.
    pub dry_run: bool,
}

impl SyncConfig {
    /// Reject settings that can never select anything.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::InvalidConfiguration`] when a group is both
    /// included and ignored.
    pub fn validate(&self) -> SyncResult<()> {
        if let Some(group) = self
            .include_groups
            .iter()
            .find(|g| self.ignore_groups.contains(g))
        {
            return Err(SyncError::InvalidConfiguration(format!(
                "group {group} is both included and ignored"
            )));
        }
        Ok(())
    }

    #[must_use]
    pub fn ignore_user(&self, email: &str) -> bool {
        self.ignore_users.iter().any(|u| u == email)
    }

    #[must_use]
    pub fn ignore_group(&self, email: &str) -> bool {
        self.ignore_groups.iter().any(|g| g == email)
    }

    /// Whether a group passes both the ignore-list and the include-list.
    #[must_use]
    pub fn select_group(&self, email: &str) -> bool {
        if self.ignore_group(email) {
            return false;
        }
        self.include_groups.is_empty() || self.include_groups.iter().any(|g| g == email)
    }
}
