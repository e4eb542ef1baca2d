//! Member management for the dashboard.

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use serde::Deserialize;

use wayside_core::ContactId;

use crate::db::members::{Member, MemberRepository};
use crate::db::Page;
use crate::error::AppError;
use crate::middleware::RequireStaffAuth;
use crate::state::AppState;

use super::api::{ApiResponse, ok};

/// Build the members router.
pub fn router() -> Router<AppState> {
    Router::new().route("/members", get(list).post(promote))
}

/// List members.
///
/// # Errors
///
/// Returns 500 on a query failure.
pub async fn list(
    RequireStaffAuth(_admin): RequireStaffAuth,
    State(state): State<AppState>,
    Query(page): Query<Page>,
) -> Result<Json<ApiResponse<Vec<Member>>>, AppError> {
    let members = MemberRepository::new(state.pool()).list(page).await?;
    Ok(ok(members))
}

/// Request to promote a contact to member.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromoteRequest {
    pub contact_id: ContactId,
    pub notes: Option<String>,
}

/// Promote a contact to formal membership.
///
/// # Errors
///
/// Returns 500 on a query failure.
pub async fn promote(
    RequireStaffAuth(admin): RequireStaffAuth,
    State(state): State<AppState>,
    Json(body): Json<PromoteRequest>,
) -> Result<Json<ApiResponse<Member>>, AppError> {
    let member = MemberRepository::new(state.pool())
        .create(body.contact_id, body.notes.as_deref())
        .await?;
    tracing::info!(staff = %admin.email, contact_id = %body.contact_id, "Contact promoted to member");
    Ok(ok(member))
}
