//! Admin Directory API v1 resources.

use serde::Deserialize;

use dirsync_core::{MemberKind, UpstreamGroup, UpstreamMember, UpstreamUser};

/// Error payload of the Google APIs.
#[derive(Debug, Deserialize)]
pub struct ApiError {
    pub error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    pub code: u16,
    pub message: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserName {
    #[serde(default)]
    pub given_name: String,
    #[serde(default)]
    pub family_name: String,
}

/// `users` resource.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleUser {
    #[serde(default)]
    pub id: Option<String>,
    pub primary_email: String,
    #[serde(default)]
    pub name: UserName,
    #[serde(default)]
    pub suspended: bool,
}

impl From<GoogleUser> for UpstreamUser {
    fn from(user: GoogleUser) -> Self {
        UpstreamUser::new(user.primary_email, user.name.given_name, user.name.family_name)
            .suspended(user.suspended)
    }
}

/// `groups` resource.
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleGroup {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub name: String,
}

impl From<GoogleGroup> for UpstreamGroup {
    fn from(group: GoogleGroup) -> Self {
        UpstreamGroup {
            id: Some(group.id),
            name: group.name,
            email: group.email,
        }
    }
}

/// `members` resource.
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleMember {
    /// Absent for `CUSTOMER` members.
    #[serde(default)]
    pub email: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl From<GoogleMember> for UpstreamMember {
    fn from(member: GoogleMember) -> Self {
        let kind = match member.kind.as_str() {
            "USER" => MemberKind::User,
            "CUSTOMER" => MemberKind::Customer,
            _ => MemberKind::Group,
        };
        UpstreamMember {
            email: member.email,
            kind,
        }
    }
}

/// One page of a list call. The item key differs per collection.
pub trait Page<T> {
    fn into_parts(self) -> (Vec<T>, Option<String>);
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsersPage {
    #[serde(default)]
    pub users: Vec<GoogleUser>,
    pub next_page_token: Option<String>,
}

impl Page<GoogleUser> for UsersPage {
    fn into_parts(self) -> (Vec<GoogleUser>, Option<String>) {
        (self.users, self.next_page_token)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupsPage {
    #[serde(default)]
    pub groups: Vec<GoogleGroup>,
    pub next_page_token: Option<String>,
}

impl Page<GoogleGroup> for GroupsPage {
    fn into_parts(self) -> (Vec<GoogleGroup>, Option<String>) {
        (self.groups, self.next_page_token)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MembersPage {
    #[serde(default)]
    pub members: Vec<GoogleMember>,
    pub next_page_token: Option<String>,
}

impl Page<GoogleMember> for MembersPage {
    fn into_parts(self) -> (Vec<GoogleMember>, Option<String>) {
        (self.members, self.next_page_token)
    }
}
