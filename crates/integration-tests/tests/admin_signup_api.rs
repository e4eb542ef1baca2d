//! Integration tests for the admin privileged signup API.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied
//! - The admin server running (cargo run -p wayside-admin)
//! - SMTP and auth subsystem credentials in environment
//!
//! Run with: cargo test -p wayside-integration-tests -- --ignored

use reqwest::StatusCode;
use serde_json::{Value, json};
use uuid::Uuid;

use wayside_integration_tests::{admin_base_url, client, test_pool, unique_email};

// ============================================================================
// Send Verification Tests
// ============================================================================

#[tokio::test]
#[ignore = "Requires running admin server and SMTP credentials"]
async fn test_send_verification_creates_contact() {
    let client = client();
    let base_url = admin_base_url();
    let email = unique_email();

    let resp = client
        .post(format!("{base_url}/api/auth/send-verification"))
        .json(&json!({
            "email": email,
            "firstName": "Integration",
            "lastName": "Test"
        }))
        .send()
        .await
        .expect("Failed to send verification");

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("Failed to parse response");
    assert_eq!(body.get("success"), Some(&Value::Bool(true)));

    let data = body.get("data").expect("Missing data");
    assert!(data.get("contactId").is_some());
    assert!(data.get("expiresAt").is_some());

    // The contact row should exist with a pending verification
    let pool = test_pool().await;
    let (verified, has_token): (bool, bool) = sqlx::query_as(
        "SELECT email_verified, email_verification_token IS NOT NULL
         FROM contacts WHERE email = $1",
    )
    .bind(&email)
    .fetch_one(&pool)
    .await
    .expect("Contact row not found");

    assert!(!verified);
    assert!(has_token);
}

#[tokio::test]
#[ignore = "Requires running admin server"]
async fn test_send_verification_rejects_invalid_email() {
    let client = client();
    let base_url = admin_base_url();

    let resp = client
        .post(format!("{base_url}/api/auth/send-verification"))
        .json(&json!({
            "email": "not-an-email",
            "firstName": "Integration",
            "lastName": "Test"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.expect("Failed to parse response");
    assert_eq!(body.get("success"), Some(&Value::Bool(false)));
}

#[tokio::test]
#[ignore = "Requires running admin server"]
async fn test_resend_verification_unknown_contact() {
    let client = client();
    let base_url = admin_base_url();

    let resp = client
        .post(format!("{base_url}/api/auth/resend-verification"))
        .json(&json!({ "contactId": Uuid::new_v4() }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// ============================================================================
// Verify Email Tests
// ============================================================================

#[tokio::test]
#[ignore = "Requires running admin server and SMTP credentials"]
async fn test_verify_email_wrong_code() {
    let client = client();
    let base_url = admin_base_url();
    let email = unique_email();

    let resp = client
        .post(format!("{base_url}/api/auth/send-verification"))
        .json(&json!({
            "email": email,
            "firstName": "Integration",
            "lastName": "Test"
        }))
        .send()
        .await
        .expect("Failed to send verification");
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = resp.json().await.expect("Failed to parse response");
    let contact_id = body["data"]["contactId"].as_str().expect("Missing contactId");

    // Six digits, guaranteed stale
    let resp = client
        .post(format!("{base_url}/api/auth/verify-email"))
        .json(&json!({ "contactId": contact_id, "code": "000000" }))
        .send()
        .await
        .expect("Failed to verify");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // The contact must stay unverified so the code can be resent
    let pool = test_pool().await;
    let verified: bool = sqlx::query_scalar("SELECT email_verified FROM contacts WHERE id = $1")
        .bind(Uuid::parse_str(contact_id).expect("Bad contactId"))
        .fetch_one(&pool)
        .await
        .expect("Contact row not found");
    assert!(!verified);
}

// ============================================================================
// Sign-In Tests
// ============================================================================

#[tokio::test]
#[ignore = "Requires running admin server and auth subsystem credentials"]
async fn test_sign_in_wrong_password() {
    let client = client();
    let base_url = admin_base_url();

    let resp = client
        .post(format!("{base_url}/api/auth/sign-in"))
        .json(&json!({
            "email": unique_email(),
            "password": "definitely-wrong"
        }))
        .send()
        .await
        .expect("Failed to sign in");

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = resp.json().await.expect("Failed to parse response");
    assert_eq!(body.get("success"), Some(&Value::Bool(false)));
}
