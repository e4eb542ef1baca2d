//! Privileged auth endpoints backing the mobile signup and sign-in flows.
//!
//! These are unauthenticated by design (they ARE the signup path) and sit
//! behind the strict auth rate limiter. Each one exists because public
//! signups and logins are disabled on the hosted auth subsystem.

use axum::{Json, Router, extract::State, routing::post};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use wayside_core::{ContactId, Email, IdentityId};

use crate::error::AppError;
use crate::state::AppState;

use super::{ApiResponse, ok};

/// Build the privileged auth router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/auth/send-verification", post(send_verification))
        .route("/api/auth/resend-verification", post(send_verification))
        .route("/api/auth/verify-email", post(verify_email))
        .route("/api/auth/create-user", post(create_user))
        .route("/api/auth/sign-in", post(sign_in))
}

/// Request for issuing (or reissuing) a verification code.
///
/// Either `contact_id` (resend for a known signup) or `email` (first send)
/// must be present.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendVerificationRequest {
    pub email: Option<String>,
    pub contact_id: Option<ContactId>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Response carrying the provisional contact and code expiry.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendVerificationResponse {
    pub contact_id: ContactId,
    pub expires_at: DateTime<Utc>,
}

/// Issue a 6-digit verification code and email it.
///
/// Finds or creates the contact by email; reissuing overwrites any prior
/// code. Serves both `/send-verification` and `/resend-verification`.
///
/// # Errors
///
/// Returns a friendly 400 on a duplicate-email conflict.
pub async fn send_verification(
    State(state): State<AppState>,
    Json(body): Json<SendVerificationRequest>,
) -> Result<Json<ApiResponse<SendVerificationResponse>>, AppError> {
    let issued = if let Some(contact_id) = body.contact_id {
        state.verification().issue_by_contact_id(contact_id).await?
    } else {
        let raw = body
            .email
            .as_deref()
            .ok_or_else(|| AppError::BadRequest("email or contactId is required".into()))?;
        let email = Email::parse(raw)
            .map_err(|e| AppError::BadRequest(format!("invalid email address: {e}")))?;

        state
            .verification()
            .issue_by_email(
                &email,
                body.first_name.as_deref().unwrap_or("Mobile"),
                body.last_name.as_deref().unwrap_or("User"),
            )
            .await?
    };

    Ok(ok(SendVerificationResponse {
        contact_id: issued.contact_id,
        expires_at: issued.expires_at,
    }))
}

/// Request for checking a submitted verification code.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyEmailRequest {
    pub contact_id: ContactId,
    pub code: String,
}

/// Response for a successful verification.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyEmailResponse {
    pub contact_id: ContactId,
    pub verified: bool,
}

/// Check a submitted code; success consumes it.
///
/// # Errors
///
/// Returns 400 with "Invalid verification code" for a wrong, consumed,
/// or expired code. The client cannot distinguish the cases; the resend
/// endpoint covers all of them.
pub async fn verify_email(
    State(state): State<AppState>,
    Json(body): Json<VerifyEmailRequest>,
) -> Result<Json<ApiResponse<VerifyEmailResponse>>, AppError> {
    let outcome = state.verification().verify(body.contact_id, &body.code).await?;
    match outcome.rejection_message() {
        None => Ok(ok(VerifyEmailResponse {
            contact_id: body.contact_id,
            verified: true,
        })),
        Some(message) => Err(AppError::BadRequest(message.to_owned())),
    }
}

/// Request for creating a verified auth user.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub email: String,
    pub password: String,
    pub contact_id: ContactId,
    pub first_name: String,
    pub last_name: String,
}

/// Response carrying the new auth identity.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserResponse {
    pub user_id: IdentityId,
}

/// Create a confirmed auth user via the service-role admin endpoint.
///
/// Links the contact in user metadata and sends the welcome email
/// (best-effort; a welcome delivery failure never fails the signup).
///
/// # Errors
///
/// Returns 502 with the subsystem's message if creation is rejected.
pub async fn create_user(
    State(state): State<AppState>,
    Json(body): Json<CreateUserRequest>,
) -> Result<Json<ApiResponse<CreateUserResponse>>, AppError> {
    let user = state
        .auth_admin()
        .create_user(
            &body.email,
            &body.password,
            body.contact_id,
            &body.first_name,
            &body.last_name,
        )
        .await?;

    if let Err(e) = state.email().send_welcome(&body.email, &body.first_name).await {
        tracing::warn!(error = %e, "Welcome email failed to send");
    }

    Ok(ok(CreateUserResponse { user_id: user.id }))
}

/// Request for a server-side password grant.
#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

/// Server-side password grant with service credentials.
///
/// This is the fallback target the mobile backend uses when the auth
/// subsystem reports `logins_disabled` for a direct sign-in.
///
/// # Errors
///
/// Returns 502 with the subsystem's message on a rejected grant.
pub async fn sign_in(
    State(state): State<AppState>,
    Json(body): Json<SignInRequest>,
) -> Result<Json<ApiResponse<crate::services::auth_admin::AuthSession>>, AppError> {
    let session = state
        .auth_admin()
        .sign_in(&body.email, &body.password)
        .await?;

    Ok(ok(session))
}
