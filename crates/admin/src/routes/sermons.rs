//! Sermon catalog management.

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::db::sermons::{Sermon, SermonRepository};
use crate::db::Page;
use crate::error::AppError;
use crate::middleware::RequireStaffAuth;
use crate::state::AppState;

use super::api::{ApiResponse, ok};

/// Build the sermons router.
pub fn router() -> Router<AppState> {
    Router::new().route("/sermons", get(list).post(create))
}

/// List all sermons (including unpublished).
///
/// # Errors
///
/// Returns 500 on a query failure.
pub async fn list(
    RequireStaffAuth(_admin): RequireStaffAuth,
    State(state): State<AppState>,
    Query(page): Query<Page>,
) -> Result<Json<ApiResponse<Vec<Sermon>>>, AppError> {
    let sermons = SermonRepository::new(state.pool()).list(page).await?;
    Ok(ok(sermons))
}

/// New sermon fields.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSermonRequest {
    pub title: String,
    pub speaker: Option<String>,
    pub scripture_reference: Option<String>,
    pub video_url: Option<String>,
    pub audio_url: Option<String>,
    pub preached_on: NaiveDate,
    #[serde(default)]
    pub is_published: bool,
}

/// Add a sermon to the catalog.
///
/// # Errors
///
/// Returns 500 on a query failure.
pub async fn create(
    RequireStaffAuth(_admin): RequireStaffAuth,
    State(state): State<AppState>,
    Json(body): Json<CreateSermonRequest>,
) -> Result<Json<ApiResponse<Sermon>>, AppError> {
    let sermon = SermonRepository::new(state.pool())
        .create(
            &body.title,
            body.speaker.as_deref(),
            body.scripture_reference.as_deref(),
            body.video_url.as_deref(),
            body.audio_url.as_deref(),
            body.preached_on,
            body.is_published,
        )
        .await?;
    Ok(ok(sermon))
}
