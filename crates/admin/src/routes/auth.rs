//! Staff login and logout.

use axum::{Json, Router, extract::State, routing::post};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use wayside_core::Email;

use crate::db::AdminUserRepository;
use crate::error::AppError;
use crate::middleware::auth::{clear_current_admin, set_current_admin};
use crate::models::CurrentAdmin;
use crate::state::AppState;

use super::api::{ApiResponse, ok};

/// Build the staff auth router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
}

/// Login request.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// The logged-in staff account, echoed back on success.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub email: String,
    pub display_name: String,
}

/// Verify credentials and establish a session.
///
/// # Errors
///
/// Returns 401 on a wrong email or password; the message never says which.
pub async fn login(
    session: Session,
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, AppError> {
    let email = Email::parse(&body.email)
        .map_err(|_| AppError::Unauthorized("Invalid email or password".into()))?;

    let user = AdminUserRepository::new(state.pool())
        .verify_login(&email, &body.password)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid email or password".into()))?;

    let current = CurrentAdmin::from(&user);
    set_current_admin(&session, &current)
        .await
        .map_err(|e| AppError::Internal(format!("session write failed: {e}")))?;

    tracing::info!(staff = %current.email, "Staff login");

    Ok(ok(LoginResponse {
        email: current.email,
        display_name: current.display_name,
    }))
}

/// Logout confirmation.
#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub logged_out: bool,
}

/// Clear the session.
///
/// # Errors
///
/// Returns 500 if the session cannot be modified.
pub async fn logout(session: Session) -> Result<Json<ApiResponse<LogoutResponse>>, AppError> {
    clear_current_admin(&session)
        .await
        .map_err(|e| AppError::Internal(format!("session write failed: {e}")))?;

    Ok(ok(LogoutResponse { logged_out: true }))
}
