//! Group management: listings, creation, and the join-request approval
//! queue.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use serde::Deserialize;

use wayside_core::{GroupId, MembershipId};

use crate::db::groups::{DiscipleshipGroup, Group, GroupRepository, Membership};
use crate::db::Page;
use crate::error::AppError;
use crate::middleware::RequireStaffAuth;
use crate::state::AppState;

use super::api::{ApiResponse, ok};

/// Build the groups router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/groups", get(list).post(create))
        .route("/groups/{id}/memberships", get(list_memberships))
        .route("/memberships/{id}/approve", post(approve))
        .route("/memberships/{id}/reject", post(reject))
        .route("/discipleship-groups", get(list_discipleship))
}

/// List groups.
///
/// # Errors
///
/// Returns 500 on a query failure.
pub async fn list(
    RequireStaffAuth(_admin): RequireStaffAuth,
    State(state): State<AppState>,
    Query(page): Query<Page>,
) -> Result<Json<ApiResponse<Vec<Group>>>, AppError> {
    let groups = GroupRepository::new(state.pool()).list_groups(page).await?;
    Ok(ok(groups))
}

/// New group fields.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGroupRequest {
    pub name: String,
    pub description: Option<String>,
    pub meeting_day: Option<String>,
}

/// Create a group.
///
/// # Errors
///
/// Returns 500 on a query failure.
pub async fn create(
    RequireStaffAuth(_admin): RequireStaffAuth,
    State(state): State<AppState>,
    Json(body): Json<CreateGroupRequest>,
) -> Result<Json<ApiResponse<Group>>, AppError> {
    let group = GroupRepository::new(state.pool())
        .create_group(
            &body.name,
            body.description.as_deref(),
            body.meeting_day.as_deref(),
        )
        .await?;
    Ok(ok(group))
}

/// List the membership rows for a group (the approval queue).
///
/// # Errors
///
/// Returns 500 on a query failure.
pub async fn list_memberships(
    RequireStaffAuth(_admin): RequireStaffAuth,
    State(state): State<AppState>,
    Path(id): Path<GroupId>,
) -> Result<Json<ApiResponse<Vec<Membership>>>, AppError> {
    let memberships = GroupRepository::new(state.pool()).list_memberships(id).await?;
    Ok(ok(memberships))
}

/// Approve a pending join request.
///
/// # Errors
///
/// Returns 404 if the membership does not exist.
pub async fn approve(
    RequireStaffAuth(admin): RequireStaffAuth,
    State(state): State<AppState>,
    Path(id): Path<MembershipId>,
) -> Result<Json<ApiResponse<bool>>, AppError> {
    GroupRepository::new(state.pool()).approve_membership(id).await?;
    tracing::info!(staff = %admin.email, membership_id = %id, "Membership approved");
    Ok(ok(true))
}

/// Rejection reason, shown to staff (not the applicant).
#[derive(Debug, Deserialize)]
pub struct RejectRequest {
    pub reason: Option<String>,
}

/// Reject a pending join request.
///
/// # Errors
///
/// Returns 404 if the membership does not exist.
pub async fn reject(
    RequireStaffAuth(admin): RequireStaffAuth,
    State(state): State<AppState>,
    Path(id): Path<MembershipId>,
    Json(body): Json<RejectRequest>,
) -> Result<Json<ApiResponse<bool>>, AppError> {
    GroupRepository::new(state.pool())
        .reject_membership(id, body.reason.as_deref())
        .await?;
    tracing::info!(staff = %admin.email, membership_id = %id, "Membership rejected");
    Ok(ok(true))
}

/// List discipleship groups.
///
/// # Errors
///
/// Returns 500 on a query failure.
pub async fn list_discipleship(
    RequireStaffAuth(_admin): RequireStaffAuth,
    State(state): State<AppState>,
    Query(page): Query<Page>,
) -> Result<Json<ApiResponse<Vec<DiscipleshipGroup>>>, AppError> {
    let groups = GroupRepository::new(state.pool())
        .list_discipleship_groups(page)
        .await?;
    Ok(ok(groups))
}
