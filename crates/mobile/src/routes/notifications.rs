//! Push tokens and notification preferences.

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::Value as JsonValue;

use crate::db::AppUserRepository;
use crate::error::AppError;
use crate::middleware::CurrentMember;
use crate::state::AppState;

use super::{ApiResponse, ok};

/// Build the notifications router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/notifications/token", post(register_token))
        .route(
            "/api/notifications/preferences",
            get(preferences).put(set_preferences),
        )
}

#[derive(Debug, Deserialize)]
pub struct RegisterTokenRequest {
    pub token: String,
    pub platform: String,
}

/// Register (or refresh) the device's Expo push token.
///
/// # Errors
///
/// Returns 400 on an empty token.
pub async fn register_token(
    member: CurrentMember,
    State(state): State<AppState>,
    Json(body): Json<RegisterTokenRequest>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    if body.token.trim().is_empty() {
        return Err(AppError::BadRequest("token is required".into()));
    }

    AppUserRepository::new(state.pool())
        .register_push_token(member.identity, &body.token, &body.platform)
        .await?;
    Ok(ok(serde_json::json!({ "registered": true })))
}

/// The member's notification preference blob.
///
/// # Errors
///
/// Returns 500 on a storage failure.
pub async fn preferences(
    member: CurrentMember,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<JsonValue>>, AppError> {
    let preferences = AppUserRepository::new(state.pool())
        .notification_preferences(member.identity)
        .await?;
    Ok(ok(preferences))
}

/// Replace the member's notification preference blob.
///
/// # Errors
///
/// Returns 400 if the body is not a JSON object.
pub async fn set_preferences(
    member: CurrentMember,
    State(state): State<AppState>,
    Json(body): Json<JsonValue>,
) -> Result<Json<ApiResponse<JsonValue>>, AppError> {
    if !body.is_object() {
        return Err(AppError::BadRequest(
            "preferences must be a JSON object".into(),
        ));
    }

    AppUserRepository::new(state.pool())
        .set_notification_preferences(member.identity, &body)
        .await?;
    Ok(ok(body))
}
