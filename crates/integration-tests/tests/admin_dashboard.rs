//! Integration tests for the admin dashboard (staff session auth,
//! contacts CRUD, transport, settings store).
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied
//! - The admin server running (cargo run -p wayside-admin)
//! - A staff account created via `wayside-cli admin create`
//!
//! Run with: cargo test -p wayside-integration-tests -- --ignored

use reqwest::{Client, StatusCode};
use serde_json::{Value, json};

use wayside_integration_tests::{admin_base_url, client, unique_email};

/// Log in with the staff credentials from the environment.
///
/// Skips (returns `None`) when `STAFF_EMAIL`/`STAFF_PASSWORD` are unset.
async fn staff_client() -> Option<Client> {
    let email = std::env::var("STAFF_EMAIL").ok()?;
    let password = std::env::var("STAFF_PASSWORD").ok()?;

    let client = client();
    let base_url = admin_base_url();
    let resp = client
        .post(format!("{base_url}/auth/login"))
        .form(&[("email", email.as_str()), ("password", password.as_str())])
        .send()
        .await
        .expect("Failed to log in");

    assert!(
        resp.status().is_success() || resp.status().is_redirection(),
        "Staff login failed: {}",
        resp.status()
    );
    Some(client)
}

// ============================================================================
// Staff Auth Tests
// ============================================================================

#[tokio::test]
#[ignore = "Requires running admin server"]
async fn test_staff_login_wrong_password() {
    let client = client();
    let base_url = admin_base_url();

    let resp = client
        .post(format!("{base_url}/auth/login"))
        .form(&[("email", "nobody@example.com"), ("password", "wrong")])
        .send()
        .await
        .expect("Failed to send login");

    assert!(!resp.status().is_redirection(), "Bad login must not redirect in");
}

#[tokio::test]
#[ignore = "Requires running admin server"]
async fn test_dashboard_requires_session() {
    let client = client();
    let base_url = admin_base_url();

    let resp = client
        .get(format!("{base_url}/contacts"))
        .send()
        .await
        .expect("Failed to request contacts");

    // Unauthenticated staff pages redirect to the login form
    assert!(
        resp.status() == StatusCode::UNAUTHORIZED
            || resp.url().path().starts_with("/auth")
            || resp.status().is_redirection()
    );
}

// ============================================================================
// Contacts CRUD Tests
// ============================================================================

#[tokio::test]
#[ignore = "Requires running admin server and staff credentials"]
async fn test_contact_create_and_list() {
    let Some(client) = staff_client().await else {
        return;
    };
    let base_url = admin_base_url();
    let email = unique_email();

    let resp = client
        .post(format!("{base_url}/contacts"))
        .form(&[
            ("email", email.as_str()),
            ("first_name", "Integration"),
            ("last_name", "Test"),
        ])
        .send()
        .await
        .expect("Failed to create contact");
    assert!(resp.status().is_success() || resp.status().is_redirection());

    let resp = client
        .get(format!("{base_url}/contacts?q={email}"))
        .send()
        .await
        .expect("Failed to search contacts");
    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.expect("Failed to read response");
    assert!(body.contains(&email));
}

// ============================================================================
// Transport Tests
// ============================================================================

#[tokio::test]
#[ignore = "Requires running admin server"]
async fn test_transport_requests_require_session() {
    let client = client();
    let base_url = admin_base_url();

    let resp = client
        .get(format!("{base_url}/transport-requests"))
        .send()
        .await
        .expect("Failed to request transport requests");

    assert!(
        resp.status() == StatusCode::UNAUTHORIZED
            || resp.url().path().starts_with("/auth")
            || resp.status().is_redirection()
    );
}

#[tokio::test]
#[ignore = "Requires running admin server and staff credentials"]
async fn test_driver_create_and_list() {
    let Some(client) = staff_client().await else {
        return;
    };
    let base_url = admin_base_url();

    let resp = client
        .post(format!("{base_url}/drivers"))
        .json(&json!({
            "name": "Integration Driver",
            "vehicleMake": "Honda",
            "vehicleModel": "Odyssey",
            "capacity": 7
        }))
        .send()
        .await
        .expect("Failed to create driver");
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = resp.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["status"], Value::String("available".into()));
    assert_eq!(body["data"]["capacity"], Value::from(7));

    let resp = client
        .get(format!("{base_url}/drivers"))
        .send()
        .await
        .expect("Failed to list drivers");
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires running admin server and staff credentials"]
async fn test_driver_capacity_must_be_positive() {
    let Some(client) = staff_client().await else {
        return;
    };
    let base_url = admin_base_url();

    let resp = client
        .post(format!("{base_url}/drivers"))
        .json(&json!({ "name": "No Seats", "capacity": 0 }))
        .send()
        .await
        .expect("Failed to send driver create");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// ============================================================================
// Settings Store Tests
// ============================================================================

#[tokio::test]
#[ignore = "Requires running admin server and staff credentials"]
async fn test_settings_round_trip() {
    let Some(client) = staff_client().await else {
        return;
    };
    let base_url = admin_base_url();

    let resp = client
        .put(format!("{base_url}/api/settings/integration-test"))
        .json(&json!({ "checked": true }))
        .send()
        .await
        .expect("Failed to write setting");
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client
        .get(format!("{base_url}/api/settings/integration-test"))
        .send()
        .await
        .expect("Failed to read setting");
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = resp.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["checked"], Value::Bool(true));
}

#[tokio::test]
#[ignore = "Requires running admin server"]
async fn test_settings_write_requires_session() {
    let client = client();
    let base_url = admin_base_url();

    let resp = client
        .put(format!("{base_url}/api/settings/integration-test"))
        .json(&json!({ "checked": false }))
        .send()
        .await
        .expect("Failed to send request");

    assert!(
        resp.status() == StatusCode::UNAUTHORIZED || resp.status().is_redirection(),
        "Unauthenticated settings write must be rejected"
    );
}
