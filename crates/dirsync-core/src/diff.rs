//! Set differences between the upstream and downstream snapshots.
//!
//! All functions here are pure: they borrow the snapshots and return fresh
//! collections, preserving input order so plans are deterministic.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::Serialize;
use tracing::debug;

use crate::keys::{GroupKeys, UserKeys};
use crate::model::{DownstreamGroup, DownstreamUser, UpstreamGroup, UpstreamUser};

/// Member keys per group key.
pub type GroupMembers = BTreeMap<String, Vec<String>>;

/// Classification of every user key seen on either side.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UserOperations {
    /// Upstream users missing downstream, as records to create.
    pub to_add: Vec<DownstreamUser>,
    /// Downstream users no longer upstream.
    pub to_delete: Vec<DownstreamUser>,
    /// Fresh records built from upstream values, carrying the downstream id.
    pub to_update: Vec<DownstreamUser>,
    pub unchanged: Vec<DownstreamUser>,
}

impl UserOperations {
    /// Whether applying this would change nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_delete.is_empty() && self.to_update.is_empty()
    }
}

/// Classification of every group key seen on either side.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GroupOperations {
    pub to_add: Vec<DownstreamGroup>,
    pub to_delete: Vec<DownstreamGroup>,
    /// Key matched on both sides; membership is compared separately.
    pub equal: Vec<DownstreamGroup>,
}

impl GroupOperations {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_delete.is_empty()
    }
}

/// Downstream memberships split by whether upstream still has them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MembershipOperations {
    pub delete: GroupMembers,
    pub equal: GroupMembers,
}

impl MembershipOperations {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.delete.values().all(Vec::is_empty)
    }

    /// Member keys to remove from `group_key`.
    #[must_use]
    pub fn deletions_for(&self, group_key: &str) -> &[String] {
        self.delete.get(group_key).map_or(&[], Vec::as_slice)
    }
}

/// Whether a downstream user already reflects its upstream counterpart.
fn user_matches(downstream: &DownstreamUser, upstream: &UpstreamUser) -> bool {
    downstream.active != upstream.suspended
        && downstream.given_name == upstream.given_name
        && downstream.family_name == upstream.family_name
}

/// Classify users into add / delete / update / unchanged.
#[must_use]
pub fn user_operations(
    downstream: &[DownstreamUser],
    upstream: &[UpstreamUser],
    keys: &UserKeys,
) -> UserOperations {
    let downstream_by_key: HashMap<&str, &DownstreamUser> = downstream
        .iter()
        .map(|u| ((keys.downstream)(u), u))
        .collect();

    let upstream_keys: HashSet<&str> = upstream.iter().map(|u| (keys.upstream)(u)).collect();

    let mut ops = UserOperations::default();

    for user in upstream {
        let key = (keys.upstream)(user);
        match downstream_by_key.get(key) {
            Some(existing) if user_matches(existing, user) => {
                debug!(user = %key, "no changes to user");
                ops.unchanged.push((*existing).clone());
            }
            Some(existing) => {
                debug!(user = %key, "updating user");
                let mut fresh = DownstreamUser::from_upstream(user);
                fresh.id = existing.id.clone();
                ops.to_update.push(fresh);
            }
            None => {
                debug!(user = %key, "adding user");
                ops.to_add.push(DownstreamUser::from_upstream(user));
            }
        }
    }

    for user in downstream {
        let key = (keys.downstream)(user);
        if !upstream_keys.contains(key) {
            debug!(user = %key, "deleting user");
            ops.to_delete.push(user.clone());
        }
    }

    ops
}

/// Classify groups into add / delete / equal.
#[must_use]
pub fn group_operations(
    downstream: &[DownstreamGroup],
    upstream: &[UpstreamGroup],
    keys: &GroupKeys,
) -> GroupOperations {
    let downstream_by_key: HashMap<&str, &DownstreamGroup> = downstream
        .iter()
        .map(|g| ((keys.downstream)(g), g))
        .collect();

    let upstream_keys: HashSet<&str> = upstream.iter().map(|g| (keys.upstream)(g)).collect();

    let mut ops = GroupOperations::default();

    for group in upstream {
        let key = (keys.upstream)(group);
        if let Some(existing) = downstream_by_key.get(key) {
            debug!(group = %key, "no changes to group");
            ops.equal.push((*existing).clone());
        } else {
            debug!(group = %key, "adding group");
            ops.to_add.push(keys.to_downstream(group));
        }
    }

    for group in downstream {
        let key = (keys.downstream)(group);
        if !upstream_keys.contains(key) {
            debug!(group = %key, "deleting group");
            ops.to_delete.push(group.clone());
        }
    }

    ops
}

/// Split each downstream group's members into keep / delete.
///
/// Groups missing from `upstream` have every downstream member deleted.
#[must_use]
pub fn membership_operations(
    upstream: &GroupMembers,
    downstream: &GroupMembers,
) -> MembershipOperations {
    let upstream_sets: HashMap<&str, HashSet<&str>> = upstream
        .iter()
        .map(|(group, members)| {
            (
                group.as_str(),
                members.iter().map(String::as_str).collect(),
            )
        })
        .collect();

    let mut ops = MembershipOperations::default();

    for (group, members) in downstream {
        let wanted = upstream_sets.get(group.as_str());
        for member in members {
            let keep = wanted.is_some_and(|set| set.contains(member.as_str()));
            let bucket = if keep {
                &mut ops.equal
            } else {
                debug!(group = %group, user = %member, "member no longer upstream");
                &mut ops.delete
            };
            bucket.entry(group.clone()).or_default().push(member.clone());
        }
    }

    ops
}
