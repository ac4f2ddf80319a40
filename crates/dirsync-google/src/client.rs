//! Admin Directory API v1 HTTP client with pagination and retry.

use std::time::Duration;

use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};

use crate::error::{DirectoryError, DirectoryResult};
use crate::models::{
    ApiError, GoogleGroup, GoogleMember, GoogleUser, GroupsPage, MembersPage, Page, UsersPage,
};

/// Public endpoint of the Google Admin SDK.
pub const DEFAULT_BASE_URL: &str = "https://admin.googleapis.com";

/// Customer alias resolving to the caller's own account.
pub const MY_CUSTOMER: &str = "my_customer";

const PAGE_SIZE: &str = "200";

/// Google Admin Directory client.
#[derive(Debug, Clone)]
pub struct DirectoryClient {
    http_client: reqwest::Client,
    base_url: String,
    customer_id: String,
    access_token: String,
    max_retries: u32,
    base_delay: Duration,
}

impl DirectoryClient {
    /// Creates a new directory client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(
        base_url: &str,
        customer_id: &str,
        access_token: &str,
        timeout: Duration,
    ) -> DirectoryResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DirectoryError::Config(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self::with_http_client(
            base_url,
            customer_id,
            access_token,
            http_client,
        ))
    }

    /// Creates a client around an existing `reqwest::Client`.
    #[must_use]
    pub fn with_http_client(
        base_url: &str,
        customer_id: &str,
        access_token: &str,
        http_client: reqwest::Client,
    ) -> Self {
        Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            customer_id: customer_id.to_string(),
            access_token: access_token.to_string(),
            max_retries: 5,
            base_delay: Duration::from_secs(1),
        }
    }

    /// Overrides retry behavior for 429 and 5xx responses.
    #[must_use]
    pub fn with_retries(mut self, max_retries: u32, base_delay: Duration) -> Self {
        self.max_retries = max_retries;
        self.base_delay = base_delay;
        self
    }

    fn directory_url(&self, path: &str) -> String {
        format!("{}/admin/directory/v1/{}", self.base_url, path)
    }

    /// Users matching `query`; every user when `query` is empty.
    pub async fn users(&self, query: &str) -> DirectoryResult<Vec<GoogleUser>> {
        let mut params = vec![("customer", self.customer_id.clone())];
        if !query.is_empty() {
            params.push(("query", query.to_string()));
        }
        self.get_all::<GoogleUser, UsersPage>(&self.directory_url("users"), params)
            .await
    }

    /// Users deleted in the last 20 days and still restorable.
    pub async fn deleted_users(&self) -> DirectoryResult<Vec<GoogleUser>> {
        let params = vec![
            ("customer", self.customer_id.clone()),
            ("showDeleted", "true".to_string()),
        ];
        self.get_all::<GoogleUser, UsersPage>(&self.directory_url("users"), params)
            .await
    }

    /// A single user by primary email, `None` when unknown.
    pub async fn user(&self, email: &str) -> DirectoryResult<Option<GoogleUser>> {
        let url = self.directory_url(&format!("users/{email}"));
        match self.get::<GoogleUser>(&url, &[]).await {
            Ok(user) => Ok(Some(user)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Groups matching `query`; every group when `query` is empty.
    pub async fn groups(&self, query: &str) -> DirectoryResult<Vec<GoogleGroup>> {
        let mut params = vec![("customer", self.customer_id.clone())];
        if !query.is_empty() {
            params.push(("query", query.to_string()));
        }
        self.get_all::<GoogleGroup, GroupsPage>(&self.directory_url("groups"), params)
            .await
    }

    /// Direct members of the group with id or email `group_key`.
    pub async fn members(&self, group_key: &str) -> DirectoryResult<Vec<GoogleMember>> {
        let url = self.directory_url(&format!("groups/{group_key}/members"));
        self.get_all::<GoogleMember, MembersPage>(&url, Vec::new())
            .await
    }

    /// Fetches every page of a list call, following `nextPageToken`.
    #[instrument(skip(self, params))]
    async fn get_all<T, P>(
        &self,
        url: &str,
        mut params: Vec<(&'static str, String)>,
    ) -> DirectoryResult<Vec<T>>
    where
        P: Page<T> + DeserializeOwned,
    {
        params.push(("maxResults", PAGE_SIZE.to_string()));
        let mut items = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut query = params.clone();
            if let Some(token) = page_token.take() {
                query.push(("pageToken", token));
            }

            let page: P = self.get(url, &query).await?;
            let (page_items, next) = page.into_parts();
            debug!(count = page_items.len(), "Fetched directory page");
            items.extend(page_items);

            match next {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => return Ok(items),
            }
        }
    }

    /// GET with bearer auth, retrying 429 and transient 5xx responses.
    async fn get<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&'static str, String)],
    ) -> DirectoryResult<T> {
        let mut retries = 0;
        let mut delay = self.base_delay;

        loop {
            let response = self
                .http_client
                .get(url)
                .bearer_auth(&self.access_token)
                .query(query)
                .send()
                .await?;
            let status = response.status();

            if status.is_success() {
                return response.json().await.map_err(DirectoryError::from);
            }

            let transient = matches!(
                status,
                reqwest::StatusCode::TOO_MANY_REQUESTS
                    | reqwest::StatusCode::INTERNAL_SERVER_ERROR
                    | reqwest::StatusCode::BAD_GATEWAY
                    | reqwest::StatusCode::SERVICE_UNAVAILABLE
                    | reqwest::StatusCode::GATEWAY_TIMEOUT
            );
            if transient {
                if retries < self.max_retries {
                    retries += 1;
                    warn!(
                        "Transient error {}, retry {}/{} after {:?}",
                        status, retries, self.max_retries, delay
                    );
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                    continue;
                }
                return Err(DirectoryError::MaxRetriesExceeded {
                    attempts: retries + 1,
                    message: format!("{status} from {url}"),
                });
            }

            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);

            return Err(match status {
                reqwest::StatusCode::NOT_FOUND => DirectoryError::NotFound(message),
                reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN => {
                    DirectoryError::PermissionDenied(message)
                }
                _ => DirectoryError::Api {
                    status: status.as_u16(),
                    message,
                },
            });
        }
    }
}
