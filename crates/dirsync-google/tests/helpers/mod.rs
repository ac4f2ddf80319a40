//! Shared helpers for directory reader tests.

#![allow(dead_code)]

use std::time::Duration;

use serde_json::{json, Value};
use wiremock::MockServer;

use dirsync_google::{DirectoryClient, MY_CUSTOMER};

pub const TOKEN: &str = "ya29.test-token";

pub async fn server() -> MockServer {
    MockServer::start().await
}

/// Client pointed at `server`, retrying without delay.
pub fn client(server: &MockServer) -> DirectoryClient {
    DirectoryClient::with_http_client(&server.uri(), MY_CUSTOMER, TOKEN, reqwest::Client::new())
        .with_retries(2, Duration::ZERO)
}

pub fn user_json(email: &str, suspended: bool) -> Value {
    json!({
        "kind": "admin#directory#user",
        "id": format!("uid-{email}"),
        "primaryEmail": email,
        "name": { "givenName": "Given", "familyName": "Family" },
        "suspended": suspended
    })
}

pub fn group_json(id: &str, name: &str, email: &str) -> Value {
    json!({
        "kind": "admin#directory#group",
        "id": id,
        "name": name,
        "email": email
    })
}

pub fn member_json(email: &str, kind: &str) -> Value {
    json!({ "kind": "admin#directory#member", "email": email, "type": kind })
}
