//! Prayer request review for the dashboard.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};

use wayside_core::PrayerRequestId;

use crate::db::prayer::{PrayerRequest, PrayerRequestRepository};
use crate::db::Page;
use crate::error::AppError;
use crate::middleware::RequireStaffAuth;
use crate::state::AppState;

use super::api::{ApiResponse, ok};

/// Build the prayer router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/prayer-requests", get(list))
        .route("/prayer-requests/{id}/answered", post(mark_answered))
}

/// List prayer requests, newest first.
///
/// # Errors
///
/// Returns 500 on a query failure.
pub async fn list(
    RequireStaffAuth(_admin): RequireStaffAuth,
    State(state): State<AppState>,
    Query(page): Query<Page>,
) -> Result<Json<ApiResponse<Vec<PrayerRequest>>>, AppError> {
    let requests = PrayerRequestRepository::new(state.pool()).list(page).await?;
    Ok(ok(requests))
}

/// Mark a request answered.
///
/// # Errors
///
/// Returns 404 if the request does not exist.
pub async fn mark_answered(
    RequireStaffAuth(_admin): RequireStaffAuth,
    State(state): State<AppState>,
    Path(id): Path<PrayerRequestId>,
) -> Result<Json<ApiResponse<bool>>, AppError> {
    PrayerRequestRepository::new(state.pool()).mark_answered(id).await?;
    Ok(ok(true))
}
