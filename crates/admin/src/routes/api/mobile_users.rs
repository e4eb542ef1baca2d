//! Mobile app user endpoints: push tokens and notification preferences.

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use wayside_core::IdentityId;

use crate::db::AppUserRepository;
use crate::error::AppError;
use crate::state::AppState;

use super::{ApiResponse, ok};

/// Build the mobile users router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/mobile-users/register-push-token",
            post(register_push_token),
        )
        .route(
            "/api/mobile-users/notification-preferences",
            get(get_preferences).post(set_preferences),
        )
}

/// Request for registering a device push token.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterPushTokenRequest {
    pub user_id: IdentityId,
    pub token: String,
    pub platform: String,
}

/// Confirmation of token registration.
#[derive(Debug, Serialize)]
pub struct RegisterPushTokenResponse {
    pub registered: bool,
}

/// Append or refresh an Expo push token on the app user's device list.
///
/// # Errors
///
/// Returns 404 if no app user row exists for the identity.
pub async fn register_push_token(
    State(state): State<AppState>,
    Json(body): Json<RegisterPushTokenRequest>,
) -> Result<Json<ApiResponse<RegisterPushTokenResponse>>, AppError> {
    AppUserRepository::new(state.pool())
        .register_push_token(body.user_id, &body.token, &body.platform)
        .await?;

    Ok(ok(RegisterPushTokenResponse { registered: true }))
}

/// Identity selector for preference reads.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferencesQuery {
    pub user_id: IdentityId,
}

/// Get the notification preference blob for an app user.
///
/// # Errors
///
/// Returns 404 if no app user row exists for the identity.
pub async fn get_preferences(
    State(state): State<AppState>,
    Query(query): Query<PreferencesQuery>,
) -> Result<Json<ApiResponse<JsonValue>>, AppError> {
    let preferences = AppUserRepository::new(state.pool())
        .get_notification_preferences(query.user_id)
        .await?;

    Ok(ok(preferences))
}

/// Request for replacing the notification preference blob.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetPreferencesRequest {
    pub user_id: IdentityId,
    pub preferences: JsonValue,
}

/// Confirmation of a preference write.
#[derive(Debug, Serialize)]
pub struct SetPreferencesResponse {
    pub updated: bool,
}

/// Replace the notification preference blob for an app user.
///
/// # Errors
///
/// Returns 404 if no app user row exists for the identity.
pub async fn set_preferences(
    State(state): State<AppState>,
    Json(body): Json<SetPreferencesRequest>,
) -> Result<Json<ApiResponse<SetPreferencesResponse>>, AppError> {
    AppUserRepository::new(state.pool())
        .set_notification_preferences(body.user_id, &body.preferences)
        .await?;

    Ok(ok(SetPreferencesResponse { updated: true }))
}
