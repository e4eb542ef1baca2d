//! Event management: calendar CRUD, registrations, and check-in.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use wayside_core::{ContactId, EventId, EventStatus};

use crate::db::events::{Attendance, Event, EventRepository, Registration};
use crate::db::Page;
use crate::error::AppError;
use crate::middleware::RequireStaffAuth;
use crate::state::AppState;

use super::api::{ApiResponse, ok};

/// Build the events router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/events", get(list).post(create))
        .route("/events/{id}", get(get_one))
        .route("/events/{id}/registrations", get(list_registrations))
        .route("/events/{id}/check-in", post(check_in))
}

/// List events (all statuses).
///
/// # Errors
///
/// Returns 500 on a query failure.
pub async fn list(
    RequireStaffAuth(_admin): RequireStaffAuth,
    State(state): State<AppState>,
    Query(page): Query<Page>,
) -> Result<Json<ApiResponse<Vec<Event>>>, AppError> {
    let events = EventRepository::new(state.pool()).list(page).await?;
    Ok(ok(events))
}

/// Get one event.
///
/// # Errors
///
/// Returns 404 if the event does not exist.
pub async fn get_one(
    RequireStaffAuth(_admin): RequireStaffAuth,
    State(state): State<AppState>,
    Path(id): Path<EventId>,
) -> Result<Json<ApiResponse<Event>>, AppError> {
    let event = EventRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("event {id}")))?;
    Ok(ok(event))
}

/// New event fields.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
    pub status: Option<EventStatus>,
}

/// Create an event. Defaults to draft until staff publish it.
///
/// # Errors
///
/// Returns 500 on a query failure.
pub async fn create(
    RequireStaffAuth(_admin): RequireStaffAuth,
    State(state): State<AppState>,
    Json(body): Json<CreateEventRequest>,
) -> Result<Json<ApiResponse<Event>>, AppError> {
    let event = EventRepository::new(state.pool())
        .create(
            &body.title,
            body.description.as_deref(),
            body.location.as_deref(),
            body.starts_at,
            body.ends_at,
            body.status.unwrap_or(EventStatus::Draft),
        )
        .await?;
    Ok(ok(event))
}

/// List an event's registrations.
///
/// # Errors
///
/// Returns 500 on a query failure.
pub async fn list_registrations(
    RequireStaffAuth(_admin): RequireStaffAuth,
    State(state): State<AppState>,
    Path(id): Path<EventId>,
) -> Result<Json<ApiResponse<Vec<Registration>>>, AppError> {
    let registrations = EventRepository::new(state.pool()).list_registrations(id).await?;
    Ok(ok(registrations))
}

/// Staff check-in request (front desk kiosk).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckInRequest {
    pub contact_id: ContactId,
}

/// Check a contact in to an event. Idempotent.
///
/// # Errors
///
/// Returns 500 on a query failure.
pub async fn check_in(
    RequireStaffAuth(_admin): RequireStaffAuth,
    State(state): State<AppState>,
    Path(id): Path<EventId>,
    Json(body): Json<CheckInRequest>,
) -> Result<Json<ApiResponse<Attendance>>, AppError> {
    let attendance = EventRepository::new(state.pool())
        .check_in(id, body.contact_id, "staff")
        .await?;
    Ok(ok(attendance))
}
