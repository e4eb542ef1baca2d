//! Event browsing, registration, and self check-in.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use serde::Serialize;

use wayside_core::EventId;

use crate::db::events::{AttendanceView, EventView};
use crate::db::{EventRepository, Page};
use crate::error::AppError;
use crate::middleware::CurrentMember;
use crate::state::AppState;

use super::{ApiResponse, ok};

/// Build the events router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/events", get(list))
        .route("/api/events/history", get(history))
        .route("/api/events/{id}", get(detail))
        .route("/api/events/{id}/register", post(register))
        .route("/api/events/{id}/check-in", post(check_in))
}

/// Upcoming published events with the member's registration state.
///
/// # Errors
///
/// Returns 500 on a storage failure.
pub async fn list(
    member: CurrentMember,
    State(state): State<AppState>,
    Query(page): Query<Page>,
) -> Result<Json<ApiResponse<Vec<EventView>>>, AppError> {
    let events = EventRepository::new(state.pool())
        .list_upcoming(member.contact_id, page)
        .await?;
    Ok(ok(events))
}

/// One published event.
///
/// # Errors
///
/// Returns 404 for unknown, draft, or cancelled events.
pub async fn detail(
    member: CurrentMember,
    State(state): State<AppState>,
    Path(id): Path<EventId>,
) -> Result<Json<ApiResponse<EventView>>, AppError> {
    let event = EventRepository::new(state.pool())
        .get_published(id, member.contact_id)
        .await?
        .ok_or_else(|| AppError::NotFound("event".into()))?;
    Ok(ok(event))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisteredResponse {
    pub event_id: EventId,
    pub registered: bool,
}

/// Register for an event. A repeated tap is harmless.
///
/// # Errors
///
/// Returns 404 for events not open to the app.
pub async fn register(
    member: CurrentMember,
    State(state): State<AppState>,
    Path(id): Path<EventId>,
) -> Result<Json<ApiResponse<RegisteredResponse>>, AppError> {
    let repo = EventRepository::new(state.pool());
    repo.get_published(id, member.contact_id)
        .await?
        .ok_or_else(|| AppError::NotFound("event".into()))?;
    repo.register(id, member.contact_id).await?;

    Ok(ok(RegisteredResponse {
        event_id: id,
        registered: true,
    }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckInResponse {
    pub event_id: EventId,
    pub checked_in_at: DateTime<Utc>,
}

/// Self check-in. Repeats keep the original timestamp.
///
/// # Errors
///
/// Returns 404 for events not open to the app.
pub async fn check_in(
    member: CurrentMember,
    State(state): State<AppState>,
    Path(id): Path<EventId>,
) -> Result<Json<ApiResponse<CheckInResponse>>, AppError> {
    let repo = EventRepository::new(state.pool());
    repo.get_published(id, member.contact_id)
        .await?
        .ok_or_else(|| AppError::NotFound("event".into()))?;
    let checked_in_at = repo.check_in(id, member.contact_id).await?;

    Ok(ok(CheckInResponse {
        event_id: id,
        checked_in_at,
    }))
}

/// The member's check-in history.
///
/// # Errors
///
/// Returns 500 on a storage failure.
pub async fn history(
    member: CurrentMember,
    State(state): State<AppState>,
    Query(page): Query<Page>,
) -> Result<Json<ApiResponse<Vec<AttendanceView>>>, AppError> {
    let entries = EventRepository::new(state.pool())
        .attendance_history(member.contact_id, page)
        .await?;
    Ok(ok(entries))
}
