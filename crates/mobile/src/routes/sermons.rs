//! The published sermon catalog. Public: the app shows sermons before
//! sign-in.

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};

use crate::db::sermons::SermonView;
use crate::db::{Page, SermonRepository};
use crate::error::AppError;
use crate::state::AppState;

use super::{ApiResponse, ok};

/// Build the sermons router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/sermons", get(list))
}

/// Published sermons, most recent first.
///
/// # Errors
///
/// Returns 500 on a storage failure.
pub async fn list(
    State(state): State<AppState>,
    Query(page): Query<Page>,
) -> Result<Json<ApiResponse<Vec<SermonView>>>, AppError> {
    let sermons = SermonRepository::new(state.pool()).list_published(page).await?;
    Ok(ok(sermons))
}
