//! In-memory collaborators that record every call in a shared log.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::{Arc, Mutex};

use dirsync_core::{
    async_trait, DirectoryReader, DownstreamGroup, DownstreamUser, MembershipCache,
    ProvisioningClient, ResourceKind, SyncError, SyncResult, UpstreamGroup, UpstreamMember,
    UpstreamUser,
};

/// Ordered record of calls across all fakes sharing it.
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    pub fn push(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    /// Entries whose operation name is one of `ops`.
    pub fn only(&self, ops: &[&str]) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|e| ops.iter().any(|op| e.split(' ').next() == Some(*op)))
            .collect()
    }

    pub fn clear(&self) {
        self.0.lock().unwrap().clear();
    }
}

/// Provisioning operations that change downstream state.
pub const MUTATIONS: &[&str] = &[
    "create_user",
    "update_user",
    "delete_user",
    "create_group",
    "delete_group",
    "add_member",
    "remove_member",
];

// =============================================================================
// Directory
// =============================================================================

#[derive(Debug, Default)]
pub struct FakeDirectory {
    pub groups: Vec<UpstreamGroup>,
    pub members: HashMap<String, Vec<UpstreamMember>>,
    pub users: Vec<UpstreamUser>,
    pub deleted: Vec<UpstreamUser>,
}

impl FakeDirectory {
    pub fn user(mut self, user: UpstreamUser) -> Self {
        self.users.push(user);
        self
    }

    /// Add a group whose key under both policies is `email`.
    pub fn group(mut self, email: &str, members: &[&str]) -> Self {
        self.groups.push(UpstreamGroup::new(email, email));
        self.members.insert(
            email.to_string(),
            members.iter().map(|m| UpstreamMember::user(*m)).collect(),
        );
        self
    }

    pub fn member(mut self, group: &str, member: UpstreamMember) -> Self {
        self.members.entry(group.to_string()).or_default().push(member);
        self
    }

    pub fn deleted(mut self, user: UpstreamUser) -> Self {
        self.deleted.push(user);
        self
    }
}

#[async_trait]
impl DirectoryReader for FakeDirectory {
    async fn list_groups(&self, _query: &str) -> SyncResult<Vec<UpstreamGroup>> {
        Ok(self.groups.clone())
    }

    async fn list_group_members(&self, group: &UpstreamGroup) -> SyncResult<Vec<UpstreamMember>> {
        Ok(self.members.get(&group.email).cloned().unwrap_or_default())
    }

    async fn list_users(&self, query: &str) -> SyncResult<Vec<UpstreamUser>> {
        if query.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self.users.clone())
    }

    async fn list_deleted_users(&self) -> SyncResult<Vec<UpstreamUser>> {
        Ok(self.deleted.clone())
    }

    async fn get_user(&self, email: &str) -> SyncResult<Option<UpstreamUser>> {
        Ok(self.users.iter().find(|u| u.primary_email == email).cloned())
    }
}

// =============================================================================
// Provisioning
// =============================================================================

#[derive(Debug, Default)]
struct State {
    users: BTreeMap<String, DownstreamUser>,
    groups: BTreeMap<String, DownstreamGroup>,
    members: BTreeSet<(String, String)>,
    next_id: u32,
}

impl State {
    fn next_id(&mut self) -> String {
        self.next_id += 1;
        format!("id-{}", self.next_id)
    }
}

/// Provisioning target keyed by `userName` and `displayName`.
#[derive(Debug, Default)]
pub struct FakeProvisioning {
    state: Mutex<State>,
    log: CallLog,
    /// Operation name that fails with a provisioning error.
    fail_on: Mutex<Option<String>>,
    /// Operation name that fails with `NotFound`.
    not_found_on: Mutex<Option<String>>,
    /// Groups left out of `list_groups` but still findable by key.
    unlisted: Mutex<HashSet<String>>,
}

impl FakeProvisioning {
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            ..Default::default()
        }
    }

    pub fn seed_user(&self, user_name: &str, active: bool) {
        let mut state = self.state.lock().unwrap();
        let id = state.next_id();
        state.users.insert(
            user_name.to_string(),
            DownstreamUser::new(user_name, "Given", "Family", active).with_id(id),
        );
    }

    pub fn seed_group(&self, display_name: &str, members: &[&str]) {
        let mut state = self.state.lock().unwrap();
        let id = state.next_id();
        state.groups.insert(
            display_name.to_string(),
            DownstreamGroup::new(display_name).with_id(id),
        );
        for m in members {
            state
                .members
                .insert((display_name.to_string(), (*m).to_string()));
        }
    }

    pub fn fail_on(&self, op: &str) {
        *self.fail_on.lock().unwrap() = Some(op.to_string());
    }

    pub fn not_found_on(&self, op: &str) {
        *self.not_found_on.lock().unwrap() = Some(op.to_string());
    }

    pub fn unlist_group(&self, display_name: &str) {
        self.unlisted.lock().unwrap().insert(display_name.to_string());
    }

    pub fn user(&self, user_name: &str) -> Option<DownstreamUser> {
        self.state.lock().unwrap().users.get(user_name).cloned()
    }

    pub fn user_names(&self) -> BTreeSet<String> {
        self.state.lock().unwrap().users.keys().cloned().collect()
    }

    pub fn group_names(&self) -> BTreeSet<String> {
        self.state.lock().unwrap().groups.keys().cloned().collect()
    }

    pub fn memberships(&self) -> BTreeSet<(String, String)> {
        self.state.lock().unwrap().members.clone()
    }

    fn call(&self, op: &str, args: &str) -> SyncResult<()> {
        self.log.push(format!("{op} {args}").trim_end().to_string());
        if self.fail_on.lock().unwrap().as_deref() == Some(op) {
            return Err(SyncError::Provisioning {
                message: format!("{op} failed"),
                source: None,
            });
        }
        if self.not_found_on.lock().unwrap().as_deref() == Some(op) {
            return Err(SyncError::not_found(ResourceKind::User, args));
        }
        Ok(())
    }
}

#[async_trait]
impl ProvisioningClient for FakeProvisioning {
    async fn find_user_by_key(&self, key: &str) -> SyncResult<Option<DownstreamUser>> {
        self.call("find_user_by_key", key)?;
        Ok(self.user(key))
    }

    async fn create_user(&self, user: &DownstreamUser) -> SyncResult<DownstreamUser> {
        self.call("create_user", &user.user_name)?;
        let mut state = self.state.lock().unwrap();
        let created = user.clone().with_id(state.next_id());
        state.users.insert(user.user_name.clone(), created.clone());
        Ok(created)
    }

    async fn update_user(&self, user: &DownstreamUser) -> SyncResult<DownstreamUser> {
        self.call("update_user", &user.user_name)?;
        let mut state = self.state.lock().unwrap();
        match state.users.get_mut(&user.user_name) {
            Some(existing) if existing.id == user.id => {
                *existing = user.clone();
                Ok(user.clone())
            }
            _ => Err(SyncError::not_found(ResourceKind::User, &user.user_name)),
        }
    }

    async fn delete_user(&self, user: &DownstreamUser) -> SyncResult<()> {
        self.call("delete_user", &user.user_name)?;
        let mut state = self.state.lock().unwrap();
        state.users.remove(&user.user_name);
        state.members.retain(|(_, u)| u != &user.user_name);
        Ok(())
    }

    async fn find_group_by_key(&self, key: &str) -> SyncResult<Option<DownstreamGroup>> {
        self.call("find_group_by_key", key)?;
        Ok(self.state.lock().unwrap().groups.get(key).cloned())
    }

    async fn create_group(&self, group: &DownstreamGroup) -> SyncResult<DownstreamGroup> {
        self.call("create_group", &group.display_name)?;
        let mut state = self.state.lock().unwrap();
        let created = group.clone().with_id(state.next_id());
        state
            .groups
            .insert(group.display_name.clone(), created.clone());
        Ok(created)
    }

    async fn delete_group(&self, group: &DownstreamGroup) -> SyncResult<()> {
        self.call("delete_group", &group.display_name)?;
        let mut state = self.state.lock().unwrap();
        state.groups.remove(&group.display_name);
        state.members.retain(|(g, _)| g != &group.display_name);
        Ok(())
    }

    async fn is_member(&self, user: &DownstreamUser, group: &DownstreamGroup) -> SyncResult<bool> {
        self.call(
            "is_member",
            &format!("{} {}", group.display_name, user.user_name),
        )?;
        Ok(self
            .state
            .lock()
            .unwrap()
            .members
            .contains(&(group.display_name.clone(), user.user_name.clone())))
    }

    async fn add_member(&self, user: &DownstreamUser, group: &DownstreamGroup) -> SyncResult<()> {
        self.call(
            "add_member",
            &format!("{} {}", group.display_name, user.user_name),
        )?;
        self.state
            .lock()
            .unwrap()
            .members
            .insert((group.display_name.clone(), user.user_name.clone()));
        Ok(())
    }

    async fn remove_member(
        &self,
        user: &DownstreamUser,
        group: &DownstreamGroup,
    ) -> SyncResult<()> {
        self.call(
            "remove_member",
            &format!("{} {}", group.display_name, user.user_name),
        )?;
        self.state
            .lock()
            .unwrap()
            .members
            .remove(&(group.display_name.clone(), user.user_name.clone()));
        Ok(())
    }

    async fn list_groups(&self) -> SyncResult<Vec<DownstreamGroup>> {
        self.call("list_groups", "")?;
        let unlisted = self.unlisted.lock().unwrap().clone();
        Ok(self
            .state
            .lock()
            .unwrap()
            .groups
            .values()
            .filter(|g| !unlisted.contains(&g.display_name))
            .cloned()
            .collect())
    }

    async fn list_users(&self) -> SyncResult<Vec<DownstreamUser>> {
        self.call("list_users", "")?;
        Ok(self.state.lock().unwrap().users.values().cloned().collect())
    }
}

// =============================================================================
// Membership cache
// =============================================================================

#[derive(Debug, Default)]
pub struct FakeCache {
    rows: Mutex<BTreeSet<(String, String)>>,
    log: CallLog,
}

impl FakeCache {
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            ..Default::default()
        }
    }

    pub fn seed(&self, group_key: &str, user_key: &str) {
        self.rows
            .lock()
            .unwrap()
            .insert((group_key.to_string(), user_key.to_string()));
    }

    pub fn rows(&self) -> BTreeSet<(String, String)> {
        self.rows.lock().unwrap().clone()
    }
}

#[async_trait]
impl MembershipCache for FakeCache {
    async fn list_members(&self, group_key: &str) -> SyncResult<Vec<String>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|(g, _)| g == group_key)
            .map(|(_, u)| u.clone())
            .collect())
    }

    async fn is_member(&self, group_key: &str, user_key: &str) -> SyncResult<bool> {
        self.log
            .push(format!("cache.is_member {group_key} {user_key}"));
        Ok(self
            .rows
            .lock()
            .unwrap()
            .contains(&(group_key.to_string(), user_key.to_string())))
    }

    async fn add_member(&self, group_key: &str, user_key: &str) -> SyncResult<()> {
        self.log.push(format!("cache.add_member {group_key} {user_key}"));
        self.seed(group_key, user_key);
        Ok(())
    }

    async fn remove_member(&self, group_key: &str, user_key: &str) -> SyncResult<()> {
        self.log
            .push(format!("cache.remove_member {group_key} {user_key}"));
        self.rows
            .lock()
            .unwrap()
            .remove(&(group_key.to_string(), user_key.to_string()));
        Ok(())
    }

    async fn purge_group(&self, group_key: &str) -> SyncResult<()> {
        self.log.push(format!("cache.purge_group {group_key}"));
        self.rows.lock().unwrap().retain(|(g, _)| g != group_key);
        Ok(())
    }

    async fn purge_user(&self, user_key: &str) -> SyncResult<()> {
        self.log.push(format!("cache.purge_user {user_key}"));
        self.rows.lock().unwrap().retain(|(_, u)| u != user_key);
        Ok(())
    }
}
