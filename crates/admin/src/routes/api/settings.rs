//! Keyed settings endpoints (branding, giving config, comms).

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::error::AppError;
use crate::middleware::RequireStaffAuth;
use crate::state::AppState;

use super::{ApiResponse, ok};

/// Build the settings router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/settings/{key}", get(get_setting).put(put_setting))
}

/// Read a settings blob. Served through the cache; reads are public so the
/// mobile backend can fetch branding without staff credentials.
///
/// # Errors
///
/// Returns 404 for an unknown key.
pub async fn get_setting(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<ApiResponse<JsonValue>>, AppError> {
    let value = state
        .settings()
        .get(&key)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("setting '{key}'")))?;

    Ok(ok(value))
}

/// Confirmation of a settings write.
#[derive(Debug, Serialize)]
pub struct PutSettingResponse {
    pub updated: bool,
}

/// Write a settings blob (staff only).
///
/// # Errors
///
/// Returns 500 if the write fails.
pub async fn put_setting(
    RequireStaffAuth(_admin): RequireStaffAuth,
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(value): Json<JsonValue>,
) -> Result<Json<ApiResponse<PutSettingResponse>>, AppError> {
    state.settings().set(&key, &value).await?;
    Ok(ok(PutSettingResponse { updated: true }))
}
