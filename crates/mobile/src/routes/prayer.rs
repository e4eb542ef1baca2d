//! Prayer request submission and the member's own list.

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::{get, post},
};
use serde::Deserialize;

use crate::db::prayer::PrayerRequestView;
use crate::db::{Page, PrayerRequestRepository};
use crate::error::AppError;
use crate::middleware::CurrentMember;
use crate::state::AppState;

use super::{ApiResponse, ok};

/// Build the prayer router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/prayer-requests", get(list).post(submit))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRequest {
    pub subject: String,
    pub body: String,
    #[serde(default)]
    pub is_anonymous: bool,
}

/// Submit a prayer request.
///
/// # Errors
///
/// Returns 400 on an empty subject or body.
pub async fn submit(
    member: CurrentMember,
    State(state): State<AppState>,
    Json(body): Json<SubmitRequest>,
) -> Result<Json<ApiResponse<PrayerRequestView>>, AppError> {
    if body.subject.trim().is_empty() || body.body.trim().is_empty() {
        return Err(AppError::BadRequest("subject and body are required".into()));
    }

    let request = PrayerRequestRepository::new(state.pool())
        .submit(
            member.contact_id,
            body.subject.trim(),
            body.body.trim(),
            body.is_anonymous,
        )
        .await?;
    Ok(ok(request))
}

/// The member's own prayer requests, newest first.
///
/// # Errors
///
/// Returns 500 on a storage failure.
pub async fn list(
    member: CurrentMember,
    State(state): State<AppState>,
    Query(page): Query<Page>,
) -> Result<Json<ApiResponse<Vec<PrayerRequestView>>>, AppError> {
    let requests = PrayerRequestRepository::new(state.pool())
        .list_own(member.contact_id, page)
        .await?;
    Ok(ok(requests))
}
