//! SCIM 2.0 wire resources (RFC 7643), limited to the attributes directory
//! sync reads and writes.

use serde::{Deserialize, Serialize};

use dirsync_core::{DownstreamGroup, DownstreamUser};

pub const USER_SCHEMA: &str = "urn:ietf:params:scim:schemas:core:2.0:User";
pub const GROUP_SCHEMA: &str = "urn:ietf:params:scim:schemas:core:2.0:Group";
pub const LIST_RESPONSE_SCHEMA: &str = "urn:ietf:params:scim:api:messages:2.0:ListResponse";

fn default_active() -> bool {
    true
}

/// SCIM User name component.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScimName {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formatted: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub family_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub given_name: Option<String>,
}

/// SCIM Email value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScimEmail {
    pub value: String,

    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub email_type: Option<String>,

    #[serde(default)]
    pub primary: bool,
}

/// SCIM User resource (RFC 7643 Section 4.1).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScimUser {
    #[serde(default)]
    pub schemas: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,

    /// Unique username; the sync identity key.
    pub user_name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<ScimName>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    #[serde(default = "default_active")]
    pub active: bool,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub emails: Vec<ScimEmail>,
}

impl From<&DownstreamUser> for ScimUser {
    fn from(user: &DownstreamUser) -> Self {
        Self {
            schemas: vec![USER_SCHEMA.to_string()],
            id: user.id.clone(),
            external_id: None,
            user_name: user.user_name.clone(),
            name: Some(ScimName {
                formatted: None,
                family_name: Some(user.family_name.clone()),
                given_name: Some(user.given_name.clone()),
            }),
            display_name: Some(user.display_name.clone()),
            active: user.active,
            emails: vec![ScimEmail {
                value: user.user_name.clone(),
                email_type: Some("work".to_string()),
                primary: true,
            }],
        }
    }
}

impl From<ScimUser> for DownstreamUser {
    fn from(user: ScimUser) -> Self {
        let name = user.name.unwrap_or_default();
        let given_name = name.given_name.unwrap_or_default();
        let family_name = name.family_name.unwrap_or_default();
        let display_name = user
            .display_name
            .unwrap_or_else(|| format!("{given_name} {family_name}"));
        DownstreamUser {
            id: user.id,
            user_name: user.user_name,
            given_name,
            family_name,
            display_name,
            active: user.active,
        }
    }
}

/// Member reference inside a SCIM Group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScimGroupMember {
    /// Member resource id.
    pub value: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
}

/// SCIM Group resource (RFC 7643 Section 4.2).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScimGroup {
    #[serde(default)]
    pub schemas: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    pub display_name: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<ScimGroupMember>,
}

impl From<&DownstreamGroup> for ScimGroup {
    fn from(group: &DownstreamGroup) -> Self {
        Self {
            schemas: vec![GROUP_SCHEMA.to_string()],
            id: group.id.clone(),
            display_name: group.display_name.clone(),
            members: Vec::new(),
        }
    }
}

impl From<ScimGroup> for DownstreamGroup {
    fn from(group: ScimGroup) -> Self {
        DownstreamGroup {
            id: group.id,
            display_name: group.display_name,
        }
    }
}

/// SCIM list response (RFC 7644 Section 3.4.2).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScimListResponse<T> {
    #[serde(default)]
    pub schemas: Vec<String>,

    #[serde(default)]
    pub total_results: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items_per_page: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_index: Option<i64>,

    #[serde(rename = "Resources", default = "Vec::new")]
    pub resources: Vec<T>,
}

/// One PATCH operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScimPatchOp {
    pub op: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,
}

/// SCIM PATCH request body (RFC 7644 Section 3.5.2).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScimPatchRequest {
    pub schemas: Vec<String>,

    #[serde(rename = "Operations")]
    pub operations: Vec<ScimPatchOp>,
}

impl ScimPatchRequest {
    /// SCIM Patch Operation schema URI.
    pub const SCHEMA: &'static str = "urn:ietf:params:scim:api:messages:2.0:PatchOp";

    #[must_use]
    pub fn new(operations: Vec<ScimPatchOp>) -> Self {
        Self {
            schemas: vec![Self::SCHEMA.to_string()],
            operations,
        }
    }
}
