//! Run-scoped lookup of downstream users by key.
//!
//! Built once per run from the downstream snapshot and passed explicitly to
//! every apply step; dropped when the run ends.

use std::collections::HashMap;

use tracing::debug;

use crate::error::{SyncError, SyncResult};
use crate::keys::UserKeys;
use crate::model::DownstreamUser;
use crate::traits::ProvisioningClient;

/// Downstream users resolved so far in the current run.
#[derive(Debug, Default)]
pub struct UserIndex {
    users: HashMap<String, DownstreamUser>,
}

impl UserIndex {
    /// Index `users` by their downstream key.
    #[must_use]
    pub fn new(users: &[DownstreamUser], keys: &UserKeys) -> Self {
        let users = users
            .iter()
            .map(|u| ((keys.downstream)(u).to_string(), u.clone()))
            .collect();
        Self { users }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&DownstreamUser> {
        self.users.get(key)
    }

    /// Record a user created or updated during this run.
    pub fn insert(&mut self, key: impl Into<String>, user: DownstreamUser) {
        self.users.insert(key.into(), user);
    }

    /// Forget a user deleted during this run.
    pub fn remove(&mut self, key: &str) -> Option<DownstreamUser> {
        self.users.remove(key)
    }

    /// Look `key` up, asking the provisioning target on a miss. A hit is
    /// remembered for the rest of the run.
    pub async fn lookup(
        &mut self,
        provisioning: &dyn ProvisioningClient,
        key: &str,
    ) -> SyncResult<Option<DownstreamUser>> {
        if let Some(user) = self.users.get(key) {
            return Ok(Some(user.clone()));
        }

        debug!(user = %key, "user not indexed, looking up downstream");
        let found = provisioning.find_user_by_key(key).await?;
        if let Some(user) = &found {
            self.users.insert(key.to_string(), user.clone());
        }
        Ok(found)
    }

    /// Like [`lookup`](Self::lookup), for users that must exist.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::InvariantViolation`] when the user does not exist
    /// downstream, and propagates lookup failures.
    pub async fn resolve(
        &mut self,
        provisioning: &dyn ProvisioningClient,
        key: &str,
    ) -> SyncResult<DownstreamUser> {
        self.lookup(provisioning, key).await?.ok_or_else(|| {
            SyncError::InvariantViolation(format!(
                "membership references user {key} which does not exist downstream"
            ))
        })
    }
}
