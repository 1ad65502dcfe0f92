//! Integration tests for the Directory client and the identity-provider
//! port, against a mock HTTP server.

use std::sync::Arc;

use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use dirsync_core::IdentityProviderService;
use dirsync_google::{DirectoryClient, DirectoryService, GoogleIdentityProvider, StaticTokenProvider};

fn client(server: &MockServer) -> DirectoryClient {
    DirectoryClient::with_base_url(
        Arc::new(StaticTokenProvider::new("test-token")),
        server.uri(),
    )
    .unwrap()
}

#[tokio::test]
async fn list_groups_follows_page_tokens() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/groups"))
        .and(header("Authorization", "Bearer test-token"))
        .and(query_param("customer", "my_customer"))
        .and(query_param("pageToken", "page-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "groups": [{"id": "g-2", "name": "ops", "email": "ops@example.com"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/groups"))
        .and(query_param("customer", "my_customer"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "groups": [{"id": "g-1", "name": "devs", "email": "devs@example.com"}],
            "nextPageToken": "page-2"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let groups = client(&server).list_groups(&[]).await.unwrap();

    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].name, "devs");
    assert_eq!(groups[1].name, "ops");
}

#[tokio::test]
async fn list_groups_runs_one_pass_per_filter_query() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/groups"))
        .and(query_param("query", "email:devs*"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "groups": [{"id": "g-1", "name": "devs", "email": "devs@example.com"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/groups"))
        .and(query_param("query", "email:ops*"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "groups": [{"id": "g-2", "name": "ops", "email": "ops@example.com"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let groups = client(&server)
        .list_groups(&["email:devs*".to_string(), "email:ops*".to_string()])
        .await
        .unwrap();

    assert_eq!(groups.len(), 2);
}

#[tokio::test]
async fn provider_drops_duplicate_group_names_keeping_the_first() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/groups"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "groups": [
                {"id": "g-1", "name": "devs", "email": "devs@example.com"},
                {"id": "g-2", "name": "devs", "email": "devs-emea@example.com"},
                {"id": "g-3", "name": "ops", "email": "ops@example.com"}
            ]
        })))
        .mount(&server)
        .await;

    let provider = GoogleIdentityProvider::new(client(&server));
    let groups = provider.get_groups(&[]).await.unwrap();

    assert_eq!(groups.items, 2);
    assert_eq!(groups.resources[0].name, "devs");
    assert_eq!(groups.resources[0].ipid, "g-1");
    assert_eq!(groups.resources[1].name, "ops");
}

#[tokio::test]
async fn provider_drops_nested_group_members() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/groups/g-1/members"))
        .and(query_param("includeDerivedMembership", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "members": [
                {"id": "u-1", "email": "ada@example.com", "status": "ACTIVE", "type": "USER"},
                {"id": "g-9", "email": "nested@example.com", "type": "GROUP"},
                {"id": "u-2", "email": "grace@example.com", "status": "ACTIVE", "type": "USER"}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = GoogleIdentityProvider::new(client(&server));
    let members = provider.get_group_members("g-1").await.unwrap();

    assert_eq!(members.items, 2);
    assert!(members.resources.iter().all(|m| m.email != "nested@example.com"));
}

#[tokio::test]
async fn users_by_groups_members_fetches_each_email_once() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/groups"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "groups": [
                {"id": "g-1", "name": "devs", "email": "devs@example.com"},
                {"id": "g-2", "name": "ops", "email": "ops@example.com"}
            ]
        })))
        .mount(&server)
        .await;

    // ada is a member of both groups; her record must be fetched once
    for group in ["g-1", "g-2"] {
        Mock::given(method("GET"))
            .and(path(format!("/groups/{group}/members")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "members": [
                    {"id": "u-1", "email": "ada@example.com", "status": "ACTIVE", "type": "USER"}
                ]
            })))
            .mount(&server)
            .await;
    }

    Mock::given(method("GET"))
        .and(path("/users/ada@example.com"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "u-1",
            "primaryEmail": "ada@example.com",
            "name": {"givenName": "Ada", "familyName": "Lovelace", "fullName": "Ada Lovelace"},
            "suspended": false
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = GoogleIdentityProvider::new(client(&server));
    let groups = provider.get_groups(&[]).await.unwrap();
    let groups_members = provider.get_groups_members(&groups).await.unwrap();
    let users = provider
        .get_users_by_groups_members(&groups_members)
        .await
        .unwrap();

    assert_eq!(groups_members.items, 2);
    assert_eq!(users.items, 1);
    assert_eq!(users.resources[0].display_name, "Ada Lovelace");
    assert!(users.resources[0].active);
}

#[tokio::test]
async fn api_rejection_is_a_permanent_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/groups"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "error": {"code": 403, "message": "Not Authorized"}
        })))
        .mount(&server)
        .await;

    let provider = GoogleIdentityProvider::new(client(&server));
    let err = provider.get_groups(&[]).await.unwrap_err();

    assert!(!err.is_transient());
}

#[tokio::test]
async fn server_failure_is_a_transient_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/groups"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let provider = GoogleIdentityProvider::new(client(&server));
    let err = provider.get_groups(&[]).await.unwrap_err();

    assert!(err.is_transient());
}
