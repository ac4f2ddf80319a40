//! The SCIM client seen through the reconciler's provisioning interface.

mod helpers;

use helpers::mock_scim_server::{group_json, list_json, user_json, MockScimServer};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, ResponseTemplate};

use dirsync_core::{DownstreamGroup, DownstreamUser, ProvisioningClient, ResourceKind, SyncError};

#[tokio::test]
async fn test_create_user_returns_target_id() {
    let mock = MockScimServer::new().await;
    Mock::given(method("POST"))
        .and(path("/Users"))
        .and(body_partial_json(json!({
            "userName": "a@x.com",
            "active": false,
            "name": { "givenName": "Ann", "familyName": "Lee" }
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "u-9",
            "userName": "a@x.com",
            "name": { "givenName": "Ann", "familyName": "Lee" },
            "displayName": "Ann Lee",
            "active": false
        })))
        .expect(1)
        .mount(&mock.server)
        .await;

    let client = mock.client();
    let provisioning: &dyn ProvisioningClient = &client;
    let created = provisioning
        .create_user(&DownstreamUser::new("a@x.com", "Ann", "Lee", false))
        .await
        .unwrap();

    assert_eq!(created.id.as_deref(), Some("u-9"));
    assert!(!created.active);
}

#[tokio::test]
async fn test_update_user_puts_by_id() {
    let mock = MockScimServer::new().await;
    Mock::given(method("PUT"))
        .and(path("/Users/u-1"))
        .and(body_partial_json(json!({ "userName": "a@x.com", "active": true })))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json("u-1", "a@x.com")))
        .expect(1)
        .mount(&mock.server)
        .await;

    let client = mock.client();
    let user = DownstreamUser::new("a@x.com", "Given", "Family", true).with_id("u-1");
    let updated = ProvisioningClient::update_user(&client, &user).await.unwrap();
    assert_eq!(updated, user);
}

#[tokio::test]
async fn test_update_user_without_id_is_rejected() {
    let mock = MockScimServer::new().await;
    let client = mock.client();
    let user = DownstreamUser::new("a@x.com", "Given", "Family", true);

    let err = ProvisioningClient::update_user(&client, &user)
        .await
        .unwrap_err();
    assert!(matches!(err, SyncError::InvariantViolation(_)));
}

#[tokio::test]
async fn test_delete_missing_user_is_not_found() {
    let mock = MockScimServer::new().await;
    Mock::given(method("DELETE"))
        .and(path("/Users/u-1"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock.server)
        .await;

    let client = mock.client();
    let user = DownstreamUser::new("a@x.com", "Given", "Family", true).with_id("u-1");
    let err = ProvisioningClient::delete_user(&client, &user)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        SyncError::NotFound { kind: ResourceKind::User, ref key } if key == "a@x.com"
    ));
}

#[tokio::test]
async fn test_server_failure_is_transient() {
    let mock = MockScimServer::new().await;
    Mock::given(method("DELETE"))
        .and(path("/Groups/g-1"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock.server)
        .await;

    let client = mock.client();
    let group = DownstreamGroup::new("eng").with_id("g-1");
    let err = ProvisioningClient::delete_group(&client, &group)
        .await
        .unwrap_err();
    assert!(err.is_transient());
}

#[tokio::test]
async fn test_membership_changes_patch_the_group() {
    let mock = MockScimServer::new().await;
    Mock::given(method("PATCH"))
        .and(path("/Groups/g-1"))
        .and(body_partial_json(json!({
            "Operations": [{ "op": "add", "path": "members", "value": [{ "value": "u-1" }] }]
        })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock.server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/Groups/g-1"))
        .and(body_partial_json(json!({
            "Operations": [{ "op": "remove", "path": "members[value eq \"u-1\"]" }]
        })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock.server)
        .await;

    let client = mock.client();
    let user = DownstreamUser::new("a@x.com", "Given", "Family", true).with_id("u-1");
    let group = DownstreamGroup::new("eng").with_id("g-1");

    ProvisioningClient::add_member(&client, &user, &group)
        .await
        .unwrap();
    ProvisioningClient::remove_member(&client, &user, &group)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_list_groups_maps_to_downstream() {
    let mock = MockScimServer::new().await;
    Mock::given(method("GET"))
        .and(path("/Groups"))
        .respond_with(ResponseTemplate::new(200).set_body_json(list_json(
            vec![group_json("g-1", "eng"), group_json("g-2", "ops")],
            2,
        )))
        .mount(&mock.server)
        .await;

    let client = mock.client();
    let groups = ProvisioningClient::list_groups(&client).await.unwrap();
    assert_eq!(
        groups,
        vec![
            DownstreamGroup::new("eng").with_id("g-1"),
            DownstreamGroup::new("ops").with_id("g-2"),
        ]
    );
}
