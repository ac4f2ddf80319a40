//! Directory entities as seen on each side of the sync.
//!
//! Upstream and downstream records are kept as separate types: they carry
//! different fields (`suspended` vs `active`, directory ids vs SCIM ids) and
//! the conversion between them is where polarity translation happens.

use serde::{Deserialize, Serialize};

/// A user in the upstream directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpstreamUser {
    /// Primary email; the cross-system identity key.
    pub primary_email: String,
    pub given_name: String,
    pub family_name: String,
    /// Whether the account is suspended upstream.
    #[serde(default)]
    pub suspended: bool,
}

impl UpstreamUser {
    /// Create an active upstream user.
    pub fn new(
        primary_email: impl Into<String>,
        given_name: impl Into<String>,
        family_name: impl Into<String>,
    ) -> Self {
        Self {
            primary_email: primary_email.into(),
            given_name: given_name.into(),
            family_name: family_name.into(),
            suspended: false,
        }
    }

    #[must_use]
    pub fn suspended(mut self, suspended: bool) -> Self {
        self.suspended = suspended;
        self
    }
}

/// A group in the upstream directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpstreamGroup {
    /// Directory object id, if the reader has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub email: String,
}

impl UpstreamGroup {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            email: email.into(),
        }
    }
}

/// What a group member entry points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MemberKind {
    User,
    /// Nested group; not mirrored.
    Group,
    /// Whole-domain membership; not mirrored.
    Customer,
}

/// A member entry of an upstream group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpstreamMember {
    pub email: String,
    pub kind: MemberKind,
}

impl UpstreamMember {
    pub fn user(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            kind: MemberKind::User,
        }
    }

    pub fn group(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            kind: MemberKind::Group,
        }
    }
}

/// A user in the provisioning target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownstreamUser {
    /// Target-assigned id; `None` until created.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// The identity key (the upstream primary email).
    pub user_name: String,
    pub given_name: String,
    pub family_name: String,
    pub display_name: String,
    pub active: bool,
}

impl DownstreamUser {
    /// Build a not-yet-provisioned user.
    pub fn new(
        user_name: impl Into<String>,
        given_name: impl Into<String>,
        family_name: impl Into<String>,
        active: bool,
    ) -> Self {
        let given_name = given_name.into();
        let family_name = family_name.into();
        Self {
            id: None,
            user_name: user_name.into(),
            display_name: format!("{given_name} {family_name}"),
            given_name,
            family_name,
            active,
        }
    }

    /// Translate an upstream user. `active` is the negation of `suspended`.
    #[must_use]
    pub fn from_upstream(user: &UpstreamUser) -> Self {
        Self::new(
            user.primary_email.clone(),
            user.given_name.clone(),
            user.family_name.clone(),
            !user.suspended,
        )
    }

    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

/// A group in the provisioning target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownstreamGroup {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub display_name: String,
}

impl DownstreamGroup {
    pub fn new(display_name: impl Into<String>) -> Self {
        Self {
            id: None,
            display_name: display_name.into(),
        }
    }

    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}
