//! SCIM 2.0 HTTP client (reqwest-based).
//!
//! Speaks the RFC 7644 operations directory sync needs: user and group CRUD,
//! filtered lookups, paginated listing and PATCH-based membership changes.
//! Every call goes through the client's [`RetryPolicy`].

use std::time::Duration;

use reqwest::{Client, Method, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use crate::auth::ScimAuth;
use crate::error::{ScimClientError, ScimClientResult};
use crate::models::{ScimGroup, ScimListResponse, ScimPatchOp, ScimPatchRequest, ScimUser};
use crate::retry::RetryPolicy;

/// Page size used when listing a whole resource type.
const FETCH_PAGE_SIZE: i64 = 100;

/// Default cap on resources listed per type.
pub const DEFAULT_MAX_RESOURCES: usize = 50_000;

const SCIM_CONTENT_TYPE: &str = "application/scim+json";

/// SCIM 2.0 HTTP client.
#[derive(Debug, Clone)]
pub struct ScimClient {
    /// Base URL of the SCIM target, without trailing slash.
    base_url: String,
    auth: ScimAuth,
    http_client: Client,
    retry: RetryPolicy,
    max_resources: usize,
}

impl ScimClient {
    /// Create a client with its own HTTP connection pool.
    pub fn new(base_url: &str, auth: ScimAuth, timeout: Duration) -> ScimClientResult<Self> {
        let http_client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("dirsync/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                ScimClientError::InvalidConfig(format!("Failed to build HTTP client: {e}"))
            })?;

        Ok(Self::with_http_client(base_url, auth, http_client))
    }

    /// Create a client with a pre-built `reqwest::Client`.
    #[must_use]
    pub fn with_http_client(base_url: &str, auth: ScimAuth, http_client: Client) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            auth,
            http_client,
            retry: RetryPolicy::default(),
            max_resources: DEFAULT_MAX_RESOURCES,
        }
    }

    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Fail listings of more than `max_resources` of one type.
    #[must_use]
    pub fn with_max_resources(mut self, max_resources: usize) -> Self {
        self.max_resources = max_resources;
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    // Users

    /// POST /Users
    pub async fn create_user(&self, user: &ScimUser) -> ScimClientResult<ScimUser> {
        let url = self.url("Users");
        self.retry
            .execute("create_user", || self.send(Method::POST, &url, Some(user)))
            .await
    }

    /// PUT /Users/:id
    pub async fn replace_user(&self, id: &str, user: &ScimUser) -> ScimClientResult<ScimUser> {
        let url = self.url(&format!("Users/{id}"));
        self.retry
            .execute("replace_user", || self.send(Method::PUT, &url, Some(user)))
            .await
    }

    /// DELETE /Users/:id
    pub async fn delete_user(&self, id: &str) -> ScimClientResult<()> {
        let url = self.url(&format!("Users/{id}"));
        self.retry
            .execute("delete_user", || self.send_no_content(Method::DELETE, &url, None::<&()>))
            .await
    }

    /// Find a user by `userName`.
    pub async fn find_user_by_user_name(
        &self,
        user_name: &str,
    ) -> ScimClientResult<Option<ScimUser>> {
        let filter = eq_filter("userName", user_name);
        let page = self.page::<ScimUser>("Users", Some(&filter), None, Some(1)).await?;
        Ok(page.resources.into_iter().next())
    }

    /// Every user on the target.
    pub async fn list_all_users(&self) -> ScimClientResult<Vec<ScimUser>> {
        self.list_all("Users").await
    }

    // Groups

    /// POST /Groups
    pub async fn create_group(&self, group: &ScimGroup) -> ScimClientResult<ScimGroup> {
        let url = self.url("Groups");
        self.retry
            .execute("create_group", || self.send(Method::POST, &url, Some(group)))
            .await
    }

    /// DELETE /Groups/:id
    pub async fn delete_group(&self, id: &str) -> ScimClientResult<()> {
        let url = self.url(&format!("Groups/{id}"));
        self.retry
            .execute("delete_group", || self.send_no_content(Method::DELETE, &url, None::<&()>))
            .await
    }

    /// Find a group by `displayName`.
    pub async fn find_group_by_display_name(
        &self,
        display_name: &str,
    ) -> ScimClientResult<Option<ScimGroup>> {
        let filter = eq_filter("displayName", display_name);
        let page = self.page::<ScimGroup>("Groups", Some(&filter), None, Some(1)).await?;
        Ok(page.resources.into_iter().next())
    }

    /// Every group on the target.
    pub async fn list_all_groups(&self) -> ScimClientResult<Vec<ScimGroup>> {
        self.list_all("Groups").await
    }

    /// Whether user `user_id` is a member of group `group_id`.
    pub async fn is_member(&self, group_id: &str, user_id: &str) -> ScimClientResult<bool> {
        let filter = format!(
            "{} and {}",
            eq_filter("id", group_id),
            eq_filter("members", user_id)
        );
        let page = self.page::<ScimGroup>("Groups", Some(&filter), None, None).await?;
        Ok(page.total_results > 0 || !page.resources.is_empty())
    }

    /// Patch group members, adding and/or removing user ids.
    pub async fn patch_group_members(
        &self,
        group_id: &str,
        add_member_ids: &[String],
        remove_member_ids: &[String],
    ) -> ScimClientResult<()> {
        let mut operations = Vec::new();

        if !add_member_ids.is_empty() {
            let members: Vec<serde_json::Value> = add_member_ids
                .iter()
                .map(|id| serde_json::json!({ "value": id }))
                .collect();
            operations.push(ScimPatchOp {
                op: "add".to_string(),
                path: Some("members".to_string()),
                value: Some(serde_json::Value::Array(members)),
            });
        }

        for id in remove_member_ids {
            operations.push(ScimPatchOp {
                op: "remove".to_string(),
                path: Some(format!(
                    "members[value eq \"{}\"]",
                    escape_scim_filter_value(id)
                )),
                value: None,
            });
        }

        if operations.is_empty() {
            return Ok(());
        }

        let patch = ScimPatchRequest::new(operations);
        let url = self.url(&format!("Groups/{group_id}"));
        self.retry
            .execute("patch_group_members", || {
                self.send_no_content(Method::PATCH, &url, Some(&patch))
            })
            .await
    }

    // Transport

    /// Every resource of one type, following `startIndex` pagination.
    async fn list_all<T: DeserializeOwned>(&self, resource: &str) -> ScimClientResult<Vec<T>> {
        let mut items: Vec<T> = Vec::new();
        let mut start_index = 1;
        loop {
            let page = self
                .page::<T>(resource, None, Some(start_index), Some(FETCH_PAGE_SIZE))
                .await?;
            let fetched = page.resources.len();
            items.extend(page.resources);

            if items.len() > self.max_resources {
                return Err(ScimClientError::TooManyResources {
                    resource: resource.to_string(),
                    limit: self.max_resources,
                });
            }
            if fetched == 0 || (items.len() as i64) >= page.total_results {
                return Ok(items);
            }
            start_index += fetched as i64;
        }
    }

    /// GET one page of `resource`.
    async fn page<T: DeserializeOwned>(
        &self,
        resource: &str,
        filter: Option<&str>,
        start_index: Option<i64>,
        count: Option<i64>,
    ) -> ScimClientResult<ScimListResponse<T>> {
        let mut query: Vec<(&str, String)> = Vec::new();
        if let Some(filter) = filter {
            query.push(("filter", filter.to_string()));
        }
        if let Some(start_index) = start_index {
            query.push(("startIndex", start_index.to_string()));
        }
        if let Some(count) = count {
            query.push(("count", count.to_string()));
        }

        let url = self.url(resource);
        self.retry
            .execute("list", || self.get(&url, &query))
            .await
    }

    async fn get<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> ScimClientResult<T> {
        debug!(url = %url, query = ?query, "SCIM GET");
        let request = self.auth.apply(self.http_client.get(url)).query(query);
        let response = check_status(request.send().await?).await?;
        Ok(serde_json::from_str(&response.text().await?)?)
    }

    async fn send<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        url: &str,
        body: Option<&B>,
    ) -> ScimClientResult<T> {
        let response = self.request(method, url, body).await?;
        Ok(serde_json::from_str(&response.text().await?)?)
    }

    async fn send_no_content<B: Serialize>(
        &self,
        method: Method,
        url: &str,
        body: Option<&B>,
    ) -> ScimClientResult<()> {
        self.request(method, url, body).await.map(|_| ())
    }

    async fn request<B: Serialize>(
        &self,
        method: Method,
        url: &str,
        body: Option<&B>,
    ) -> ScimClientResult<Response> {
        debug!(method = %method, url = %url, "SCIM request");
        let mut request = self.auth.apply(self.http_client.request(method, url));
        if let Some(body) = body {
            request = request
                .header(reqwest::header::CONTENT_TYPE, SCIM_CONTENT_TYPE)
                .json(body);
        }
        check_status(request.send().await?).await
    }
}

/// Pass successful responses through; turn the rest into errors.
async fn check_status(response: Response) -> ScimClientResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let retry_after_secs = response
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok());
    let body = response.text().await.unwrap_or_default();

    Err(match status {
        StatusCode::NOT_FOUND => ScimClientError::NotFound(body),
        StatusCode::CONFLICT => ScimClientError::Conflict(body),
        StatusCode::TOO_MANY_REQUESTS => {
            warn!(retry_after_secs = ?retry_after_secs, "SCIM target rate limited");
            ScimClientError::RateLimited { retry_after_secs }
        }
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            ScimClientError::AuthError(format!("{} {body}", status.as_u16()))
        }
        _ => ScimClientError::ScimError {
            status: status.as_u16(),
            detail: if body.is_empty() {
                status.to_string()
            } else {
                body
            },
        },
    })
}

/// `attr eq "value"` with the value escaped.
fn eq_filter(attribute: &str, value: &str) -> String {
    format!("{attribute} eq \"{}\"", escape_scim_filter_value(value))
}

/// Escape a value for use inside a SCIM filter string literal.
///
/// String values in filter expressions are enclosed in double-quotes
/// (RFC 7644 Section 3.4.2.2); backslashes and double-quotes are escaped.
fn escape_scim_filter_value(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eq_filter_escapes_quotes() {
        assert_eq!(eq_filter("userName", "a@x.com"), r#"userName eq "a@x.com""#);
        assert_eq!(
            eq_filter("displayName", r#"The "A" team"#),
            r#"displayName eq "The \"A\" team""#
        );
    }

    #[test]
    fn test_url_joins_without_double_slash() {
        let client = ScimClient::with_http_client(
            "https://scim.example.com/scim/v2/",
            ScimAuth::bearer("t"),
            Client::new(),
        );
        assert_eq!(client.url("Users"), "https://scim.example.com/scim/v2/Users");
    }
}
