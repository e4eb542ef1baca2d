//! Sign-in and the signup flow.

use axum::{Json, Router, extract::State, routing::post};
use serde::Deserialize;

use wayside_core::ContactId;

use crate::error::AppError;
use crate::services::auth::AuthSession;
use crate::services::signup::{SignupDetails, SignupStage};
use crate::state::AppState;

use super::{ApiResponse, ok};

/// Build the auth router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/auth/sign-in", post(sign_in))
        .route("/api/auth/refresh", post(refresh))
        .route("/api/auth/signup", post(signup_start))
        .route("/api/auth/signup/resend", post(signup_resend))
        .route("/api/auth/signup/verify", post(signup_verify))
}

#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

/// Password sign-in.
///
/// Falls back to the privileged grant only when the auth subsystem
/// reports that direct logins are disabled.
///
/// # Errors
///
/// Returns 401 on wrong credentials.
pub async fn sign_in(
    State(state): State<AppState>,
    Json(body): Json<SignInRequest>,
) -> Result<Json<ApiResponse<AuthSession>>, AppError> {
    let session = state.sessions().sign_in(&body.email, &body.password).await?;
    Ok(ok(session))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Refresh-token grant.
///
/// # Errors
///
/// Returns 502 with the subsystem's message on a stale token.
pub async fn refresh(
    State(state): State<AppState>,
    Json(body): Json<RefreshRequest>,
) -> Result<Json<ApiResponse<AuthSession>>, AppError> {
    let session = state.auth().refresh(&body.refresh_token).await?;
    Ok(ok(session))
}

/// Details stage: validate and send the verification email.
///
/// # Errors
///
/// Returns 400 on validation failure without issuing a code.
pub async fn signup_start(
    State(state): State<AppState>,
    Json(details): Json<SignupDetails>,
) -> Result<Json<ApiResponse<SignupStage>>, AppError> {
    let stage = state.signup().start(&details).await?;
    Ok(ok(stage))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResendRequest {
    pub contact_id: ContactId,
}

/// Reissue the verification code; the flow stays on the verification
/// stage with a fresh expiry.
///
/// # Errors
///
/// Returns 502 if the admin backend cannot reissue.
pub async fn signup_resend(
    State(state): State<AppState>,
    Json(body): Json<ResendRequest>,
) -> Result<Json<ApiResponse<SignupStage>>, AppError> {
    let stage = state.signup().resend(body.contact_id).await?;
    Ok(ok(stage))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyRequest {
    pub contact_id: ContactId,
    pub code: String,
    #[serde(flatten)]
    pub details: SignupDetails,
}

/// Verification stage: check the code, create the account, sign in.
///
/// # Errors
///
/// Returns 400 on a wrong or expired code (flow stays on verification)
/// and a distinct error when the account exists but sign-in failed.
pub async fn signup_verify(
    State(state): State<AppState>,
    Json(body): Json<VerifyRequest>,
) -> Result<Json<ApiResponse<SignupStage>>, AppError> {
    let stage = state
        .signup()
        .complete(body.contact_id, &body.code, &body.details)
        .await?;
    Ok(ok(stage))
}
