//! Integration tests for the mobile member data endpoints.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations and seed data
//! - The mobile server running (cargo run -p wayside-mobile)
//! - For authenticated tests, `MEMBER_ACCESS_TOKEN` in environment
//!
//! Run with: cargo test -p wayside-integration-tests -- --ignored

use reqwest::{Client, StatusCode};
use serde_json::Value;

use wayside_integration_tests::{client, mobile_base_url};

/// Bearer token for a signed-in member, when the environment has one.
fn member_token() -> Option<String> {
    std::env::var("MEMBER_ACCESS_TOKEN").ok()
}

async fn get(client: &Client, path: &str, token: Option<&str>) -> reqwest::Response {
    let base_url = mobile_base_url();
    let mut req = client.get(format!("{base_url}{path}"));
    if let Some(token) = token {
        req = req.bearer_auth(token);
    }
    req.send().await.expect("Request failed")
}

// ============================================================================
// Public Endpoint Tests
// ============================================================================

#[tokio::test]
#[ignore = "Requires running mobile server"]
async fn test_health() {
    let client = client();
    let resp = get(&client, "/health", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires running mobile server and seed data"]
async fn test_sermons_are_public() {
    let client = client();
    let resp = get(&client, "/api/sermons", None).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("Failed to parse response");
    assert_eq!(body.get("success"), Some(&Value::Bool(true)));
    assert!(body["data"].is_array());
}

// ============================================================================
// Auth Guard Tests
// ============================================================================

#[tokio::test]
#[ignore = "Requires running mobile server"]
async fn test_member_endpoints_require_bearer_token() {
    let client = client();

    for path in [
        "/api/profile",
        "/api/events",
        "/api/events/history",
        "/api/groups",
        "/api/discipleship-groups",
        "/api/prayer-requests",
        "/api/giving/history",
        "/api/notifications/preferences",
    ] {
        let resp = get(&client, path, None).await;
        assert_eq!(
            resp.status(),
            StatusCode::UNAUTHORIZED,
            "{path} must require authentication"
        );
    }
}

#[tokio::test]
#[ignore = "Requires running mobile server"]
async fn test_garbage_token_is_rejected() {
    let client = client();
    let resp = get(&client, "/api/profile", Some("garbage")).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

// ============================================================================
// Member Data Tests
// ============================================================================

#[tokio::test]
#[ignore = "Requires running mobile server and a member access token"]
async fn test_profile_resolves_contact() {
    let Some(token) = member_token() else {
        return;
    };
    let client = client();

    let resp = get(&client, "/api/profile", Some(&token)).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = resp.json().await.expect("Failed to parse response");
    assert!(body["data"]["id"].is_string());
    assert!(body["data"]["firstName"].is_string());
}

#[tokio::test]
#[ignore = "Requires running mobile server and a member access token"]
async fn test_events_carry_registration_flags() {
    let Some(token) = member_token() else {
        return;
    };
    let client = client();

    let resp = get(&client, "/api/events", Some(&token)).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = resp.json().await.expect("Failed to parse response");
    let events = body["data"].as_array().expect("Expected events array");
    for event in events {
        assert!(event["isRegistered"].is_boolean());
        assert!(event["isCheckedIn"].is_boolean());
    }
}

#[tokio::test]
#[ignore = "Requires running mobile server, seed data, and a member access token"]
async fn test_group_join_is_idempotent() {
    let Some(token) = member_token() else {
        return;
    };
    let client = client();
    let base_url = mobile_base_url();

    let resp = get(&client, "/api/groups", Some(&token)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("Failed to parse response");
    let Some(group) = body["data"].as_array().and_then(|g| g.first()) else {
        return; // No seed groups available
    };
    let group_id = group["id"].as_str().expect("Missing group id");

    // First join requests membership, the second reports the pending state
    let resp = client
        .post(format!("{base_url}/api/groups/{group_id}/join"))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to join group");
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client
        .post(format!("{base_url}/api/groups/{group_id}/join"))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to re-join group");
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = resp.json().await.expect("Failed to parse response");
    let outcome = body["data"]["outcome"].as_str().expect("Missing outcome");
    assert!(outcome == "already_pending" || outcome == "already_member");
}
