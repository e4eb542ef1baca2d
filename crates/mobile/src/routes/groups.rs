//! Group browsing and join requests.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};

use wayside_core::{DiscipleshipGroupId, GroupId};

use crate::db::GroupRepository;
use crate::db::groups::{DiscipleshipView, GroupView, JoinOutcome};
use crate::error::AppError;
use crate::middleware::CurrentMember;
use crate::state::AppState;

use super::{ApiResponse, ok};

/// Build the groups router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/groups", get(list))
        .route("/api/groups/{id}/join", post(join))
        .route("/api/discipleship-groups", get(list_discipleship))
        .route("/api/discipleship-groups/{id}/join", post(join_discipleship))
}

/// All groups with the member's own membership status.
///
/// # Errors
///
/// Returns 500 on a storage failure.
pub async fn list(
    member: CurrentMember,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<GroupView>>>, AppError> {
    let groups = GroupRepository::new(state.pool())
        .list(member.contact_id)
        .await?;
    Ok(ok(groups))
}

/// Request to join a group. Re-applying after rejection resets the
/// request to pending; an active or pending membership is reported back.
///
/// # Errors
///
/// Returns 404 for an unknown group.
pub async fn join(
    member: CurrentMember,
    State(state): State<AppState>,
    Path(id): Path<GroupId>,
) -> Result<Json<ApiResponse<JoinOutcome>>, AppError> {
    let outcome = GroupRepository::new(state.pool())
        .request_join(id, member.contact_id)
        .await?;
    Ok(ok(outcome))
}

/// Discipleship groups with the member's status and role.
///
/// # Errors
///
/// Returns 500 on a storage failure.
pub async fn list_discipleship(
    member: CurrentMember,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<DiscipleshipView>>>, AppError> {
    let groups = GroupRepository::new(state.pool())
        .list_discipleship(member.contact_id)
        .await?;
    Ok(ok(groups))
}

/// Request to join a discipleship group as a mentee.
///
/// # Errors
///
/// Returns 500 on a storage failure.
pub async fn join_discipleship(
    member: CurrentMember,
    State(state): State<AppState>,
    Path(id): Path<DiscipleshipGroupId>,
) -> Result<Json<ApiResponse<JoinOutcome>>, AppError> {
    let outcome = GroupRepository::new(state.pool())
        .request_join_discipleship(id, member.contact_id)
        .await?;
    Ok(ok(outcome))
}
