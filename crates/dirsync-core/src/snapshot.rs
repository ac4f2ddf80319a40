//! Fresh reads of both sides at the start of a run.

use std::collections::{HashMap, HashSet};

use tracing::{debug, info};

use crate::config::SyncConfig;
use crate::diff::GroupMembers;
use crate::error::SyncResult;
use crate::keys::{GroupKeys, UserKeys};
use crate::model::{DownstreamGroup, DownstreamUser, MemberKind, UpstreamGroup, UpstreamUser};
use crate::store::MembershipStore;
use crate::traits::{DirectoryReader, ProvisioningClient};

/// Filtered view of the upstream directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpstreamSnapshot {
    /// Every user to mirror, unique by key.
    pub users: Vec<UpstreamUser>,
    pub groups: Vec<UpstreamGroup>,
    /// Upstream group key to member user keys.
    pub members: GroupMembers,
}

/// Current state of the provisioning target.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DownstreamSnapshot {
    pub users: Vec<DownstreamUser>,
    pub groups: Vec<DownstreamGroup>,
    /// Downstream group key to member user keys.
    pub members: GroupMembers,
}

/// Read groups, their user members and the standalone user query.
///
/// Members pointing at nested groups or the whole customer are skipped, as
/// are ignore-listed users, users the directory reports as deleted and
/// members the directory cannot resolve to a user.
pub async fn read_upstream(
    directory: &dyn DirectoryReader,
    config: &SyncConfig,
    user_keys: &UserKeys,
    group_keys: &GroupKeys,
) -> SyncResult<UpstreamSnapshot> {
    info!(query = %config.group_query, "Reading upstream groups");
    let groups: Vec<UpstreamGroup> = directory
        .list_groups(&config.group_query)
        .await?
        .into_iter()
        .filter(|g| {
            let keep = config.select_group(&g.email);
            if !keep {
                debug!(group = %g.email, "ignoring group");
            }
            keep
        })
        .collect();

    let deleted: HashSet<String> = directory
        .list_deleted_users()
        .await?
        .into_iter()
        .map(|u| (user_keys.upstream)(&u).to_string())
        .collect();

    let mut resolved: HashMap<String, UpstreamUser> = HashMap::new();
    let mut users: Vec<UpstreamUser> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    let mut members = GroupMembers::new();

    for group in &groups {
        let group_key = (group_keys.upstream)(group);
        let mut keys = Vec::new();

        for member in directory.list_group_members(group).await? {
            if member.kind != MemberKind::User {
                debug!(group = %group_key, member = %member.email, "ignoring non-user member");
                continue;
            }
            if config.ignore_user(&member.email) || deleted.contains(&member.email) {
                debug!(group = %group_key, user = %member.email, "ignoring user");
                continue;
            }

            let user = match resolved.get(&member.email) {
                Some(user) => user.clone(),
                None => match directory.get_user(&member.email).await? {
                    Some(user) => {
                        resolved.insert(member.email.clone(), user.clone());
                        user
                    }
                    None => {
                        debug!(user = %member.email, "ignoring unknown user");
                        continue;
                    }
                },
            };

            let key = (user_keys.upstream)(&user).to_string();
            if deleted.contains(&key) {
                continue;
            }
            if seen.insert(key.clone()) {
                users.push(user);
            }
            if !keys.contains(&key) {
                keys.push(key);
            }
        }

        members.insert(group_key.to_string(), keys);
    }

    if !config.user_query.is_empty() {
        info!(query = %config.user_query, "Reading upstream users");
        for user in directory.list_users(&config.user_query).await? {
            let key = (user_keys.upstream)(&user).to_string();
            if config.ignore_user(&key) || deleted.contains(&key) {
                debug!(user = %key, "ignoring user");
                continue;
            }
            if seen.insert(key) {
                users.push(user);
            }
        }
    }

    info!(
        users = users.len(),
        groups = groups.len(),
        "Upstream snapshot ready"
    );

    Ok(UpstreamSnapshot {
        users,
        groups,
        members,
    })
}

/// Read users, groups and membership from the provisioning target.
pub async fn read_downstream(
    provisioning: &dyn ProvisioningClient,
    store: &MembershipStore<'_>,
    group_keys: &GroupKeys,
) -> SyncResult<DownstreamSnapshot> {
    let users = provisioning.list_users().await?;
    let groups = provisioning.list_groups().await?;

    let mut members = GroupMembers::new();
    for group in &groups {
        let keys = store.members_of(group, &users).await?;
        members.insert((group_keys.downstream)(group).to_string(), keys);
    }

    info!(
        users = users.len(),
        groups = groups.len(),
        cached = store.has_cache(),
        "Downstream snapshot ready"
    );

    Ok(DownstreamSnapshot {
        users,
        groups,
        members,
    })
}
