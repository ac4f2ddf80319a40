//! Wiremock-backed SCIM target and canned resource bodies.

use serde_json::{json, Value};
use wiremock::MockServer;

use dirsync_scim_client::{RetryPolicy, ScimAuth, ScimClient};

pub const TOKEN: &str = "test-token-123";

/// A mock server plus a client pointed at it that never retries.
pub struct MockScimServer {
    pub server: MockServer,
}

impl MockScimServer {
    pub async fn new() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    pub fn client(&self) -> ScimClient {
        self.client_with_retry(RetryPolicy::none())
    }

    pub fn client_with_retry(&self, retry: RetryPolicy) -> ScimClient {
        ScimClient::with_http_client(
            &self.server.uri(),
            ScimAuth::bearer(TOKEN),
            reqwest::Client::new(),
        )
        .with_retry_policy(retry)
    }
}

pub fn user_json(id: &str, user_name: &str) -> Value {
    json!({
        "schemas": ["urn:ietf:params:scim:schemas:core:2.0:User"],
        "id": id,
        "userName": user_name,
        "name": { "givenName": "Given", "familyName": "Family" },
        "displayName": "Given Family",
        "active": true
    })
}

pub fn group_json(id: &str, display_name: &str) -> Value {
    json!({
        "schemas": ["urn:ietf:params:scim:schemas:core:2.0:Group"],
        "id": id,
        "displayName": display_name
    })
}

pub fn list_json(resources: Vec<Value>, total_results: usize) -> Value {
    json!({
        "schemas": ["urn:ietf:params:scim:api:messages:2.0:ListResponse"],
        "totalResults": total_results,
        "itemsPerPage": resources.len(),
        "Resources": resources
    })
}
