//! Integration tests for the mobile signup and sign-in flow.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied
//! - Both servers running (wayside-admin on 3001, wayside-mobile on 3002)
//! - Auth subsystem and SMTP credentials in the admin environment
//!
//! Run with: cargo test -p wayside-integration-tests -- --ignored

use reqwest::StatusCode;
use serde_json::{Value, json};

use wayside_integration_tests::{client, mobile_base_url, unique_email};

// ============================================================================
// Signup Validation Tests
// ============================================================================

#[tokio::test]
#[ignore = "Requires running mobile server"]
async fn test_signup_rejects_invalid_email() {
    let client = client();
    let base_url = mobile_base_url();

    let resp = client
        .post(format!("{base_url}/api/auth/signup"))
        .json(&json!({
            "firstName": "Integration",
            "lastName": "Test",
            "email": "not-an-email",
            "password": "password123",
            "passwordConfirmation": "password123"
        }))
        .send()
        .await
        .expect("Failed to send signup");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.expect("Failed to parse response");
    assert_eq!(body.get("success"), Some(&Value::Bool(false)));
}

#[tokio::test]
#[ignore = "Requires running mobile server"]
async fn test_signup_rejects_short_password() {
    let client = client();
    let base_url = mobile_base_url();

    let resp = client
        .post(format!("{base_url}/api/auth/signup"))
        .json(&json!({
            "firstName": "Integration",
            "lastName": "Test",
            "email": unique_email(),
            "password": "abc",
            "passwordConfirmation": "abc"
        }))
        .send()
        .await
        .expect("Failed to send signup");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "Requires running mobile server"]
async fn test_signup_rejects_mismatched_passwords() {
    let client = client();
    let base_url = mobile_base_url();

    let resp = client
        .post(format!("{base_url}/api/auth/signup"))
        .json(&json!({
            "firstName": "Integration",
            "lastName": "Test",
            "email": unique_email(),
            "password": "password123",
            "passwordConfirmation": "password124"
        }))
        .send()
        .await
        .expect("Failed to send signup");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// ============================================================================
// Signup Flow Tests
// ============================================================================

#[tokio::test]
#[ignore = "Requires running mobile and admin servers with SMTP credentials"]
async fn test_signup_start_issues_verification() {
    let client = client();
    let base_url = mobile_base_url();

    let resp = client
        .post(format!("{base_url}/api/auth/signup"))
        .json(&json!({
            "firstName": "Integration",
            "lastName": "Test",
            "email": unique_email(),
            "password": "password123",
            "passwordConfirmation": "password123"
        }))
        .send()
        .await
        .expect("Failed to send signup");

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["stage"], Value::String("verification".into()));
    assert!(body["data"]["contactId"].is_string());
    assert!(body["data"]["expiresAt"].is_string());
}

#[tokio::test]
#[ignore = "Requires running mobile and admin servers with SMTP credentials"]
async fn test_signup_wrong_code_can_resend() {
    let client = client();
    let base_url = mobile_base_url();
    let email = unique_email();

    let details = json!({
        "firstName": "Integration",
        "lastName": "Test",
        "email": email,
        "password": "password123",
        "passwordConfirmation": "password123"
    });

    let resp = client
        .post(format!("{base_url}/api/auth/signup"))
        .json(&details)
        .send()
        .await
        .expect("Failed to start signup");
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("Failed to parse response");
    let contact_id = body["data"]["contactId"].clone();

    // A wrong code must not consume the pending verification
    let mut verify = details.clone();
    verify["contactId"] = contact_id.clone();
    verify["code"] = json!("000000");
    let resp = client
        .post(format!("{base_url}/api/auth/signup/verify"))
        .json(&verify)
        .send()
        .await
        .expect("Failed to verify");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // Resend still works against the same contact
    let resp = client
        .post(format!("{base_url}/api/auth/signup/resend"))
        .json(&json!({ "contactId": contact_id }))
        .send()
        .await
        .expect("Failed to resend");
    assert_eq!(resp.status(), StatusCode::OK);
}

// ============================================================================
// Sign-In Tests
// ============================================================================

#[tokio::test]
#[ignore = "Requires running mobile server and auth subsystem credentials"]
async fn test_sign_in_wrong_password() {
    let client = client();
    let base_url = mobile_base_url();

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

#[tokio::test]
#[ignore = "Requires running mobile server"]
async fn test_refresh_rejects_garbage_token() {
    let client = client();
    let base_url = mobile_base_url();

    let resp = client
        .post(format!("{base_url}/api/auth/refresh"))
        .json(&json!({ "refreshToken": "garbage" }))
        .send()
        .await
        .expect("Failed to refresh");

    assert!(!resp.status().is_success());
}
