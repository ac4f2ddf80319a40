//! Cross-system identity keys.
//!
//! Every diff and apply routine matches entities through one of these pairs of
//! pure functions. Both functions of a pair must yield the same string for
//! the same logical entity; keys are compared verbatim.

use serde::{Deserialize, Serialize};

use crate::model::{DownstreamGroup, DownstreamUser, UpstreamGroup, UpstreamUser};

fn upstream_user_email(user: &UpstreamUser) -> &str {
    &user.primary_email
}

fn downstream_user_name(user: &DownstreamUser) -> &str {
    &user.user_name
}

fn upstream_group_name(group: &UpstreamGroup) -> &str {
    &group.name
}

fn upstream_group_email(group: &UpstreamGroup) -> &str {
    &group.email
}

fn downstream_group_display_name(group: &DownstreamGroup) -> &str {
    &group.display_name
}

/// Key functions for users.
#[derive(Clone, Copy)]
pub struct UserKeys {
    pub upstream: fn(&UpstreamUser) -> &str,
    pub downstream: fn(&DownstreamUser) -> &str,
}

impl UserKeys {
    /// Match users on primary email / SCIM `userName`.
    #[must_use]
    pub fn by_email() -> Self {
        Self {
            upstream: upstream_user_email,
            downstream: downstream_user_name,
        }
    }
}

impl Default for UserKeys {
    fn default() -> Self {
        Self::by_email()
    }
}

impl std::fmt::Debug for UserKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserKeys").finish_non_exhaustive()
    }
}

/// Which upstream attribute identifies a group downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupKeyPolicy {
    /// Upstream group name ↔ downstream display name.
    #[default]
    Name,
    /// Upstream group email ↔ downstream display name.
    Email,
}

impl std::str::FromStr for GroupKeyPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "name" => Ok(GroupKeyPolicy::Name),
            "email" => Ok(GroupKeyPolicy::Email),
            _ => Err(format!("Unknown group key policy: {s}")),
        }
    }
}

/// Key functions for groups.
#[derive(Clone, Copy)]
pub struct GroupKeys {
    pub upstream: fn(&UpstreamGroup) -> &str,
    pub downstream: fn(&DownstreamGroup) -> &str,
}

impl GroupKeys {
    #[must_use]
    pub fn by_name() -> Self {
        Self {
            upstream: upstream_group_name,
            downstream: downstream_group_display_name,
        }
    }

    #[must_use]
    pub fn by_email() -> Self {
        Self {
            upstream: upstream_group_email,
            downstream: downstream_group_display_name,
        }
    }

    #[must_use]
    pub fn for_policy(policy: GroupKeyPolicy) -> Self {
        match policy {
            GroupKeyPolicy::Name => Self::by_name(),
            GroupKeyPolicy::Email => Self::by_email(),
        }
    }

    /// The downstream record a new upstream group is created as.
    #[must_use]
    pub fn to_downstream(&self, group: &UpstreamGroup) -> DownstreamGroup {
        DownstreamGroup::new((self.upstream)(group))
    }
}

impl Default for GroupKeys {
    fn default() -> Self {
        Self::by_name()
    }
}

impl std::fmt::Debug for GroupKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GroupKeys").finish_non_exhaustive()
    }
}
