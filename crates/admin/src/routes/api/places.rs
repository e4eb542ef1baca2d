//! Address autocomplete proxy endpoint.

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use serde::Deserialize;
use serde_json::Value as JsonValue;

use crate::error::AppError;
use crate::middleware::RequireStaffAuth;
use crate::services::places::PlacesError;
use crate::state::AppState;

use super::{ApiResponse, ok};

/// Build the places router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/places/autocomplete", get(autocomplete))
}

/// Autocomplete query.
#[derive(Debug, Deserialize)]
pub struct AutocompleteQuery {
    pub input: String,
}

/// Proxy an address autocomplete lookup (staff only; keeps the API key
/// server-side).
///
/// # Errors
///
/// Returns 400 when the proxy is not configured.
pub async fn autocomplete(
    RequireStaffAuth(_admin): RequireStaffAuth,
    State(state): State<AppState>,
    Query(query): Query<AutocompleteQuery>,
) -> Result<Json<ApiResponse<Vec<JsonValue>>>, AppError> {
    let predictions = state
        .places()
        .autocomplete(&query.input)
        .await
        .map_err(|e| match e {
            PlacesError::NotConfigured => AppError::BadRequest(e.to_string()),
            PlacesError::Http(_) => AppError::Internal(e.to_string()),
        })?;

    Ok(ok(predictions))
}
