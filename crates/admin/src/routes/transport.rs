//! Event transport coordination: ride requests, drivers, and the
//! auto-assign action.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use wayside_core::{
    ContactId, DriverId, EventId, TransportRequestId, TransportStatus,
};

use crate::db::Page;
use crate::db::transport::{Driver, TransportRepository, TransportRequest};
use crate::error::AppError;
use crate::middleware::RequireStaffAuth;
use crate::services::transport::{PlannedAssignment, SeatBudget, plan_assignments};
use crate::state::AppState;

use super::api::{ApiResponse, ok};

/// Build the transport router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/transport-requests", get(list_requests).post(create_request))
        .route("/transport-requests/{id}/assign", post(assign))
        .route("/transport-requests/{id}/complete", post(complete))
        .route("/transport-requests/{id}/cancel", post(cancel))
        .route("/drivers", get(list_drivers).post(create_driver))
        .route("/events/{id}/transport/auto-assign", post(auto_assign))
}

/// Request list filters. Paging fields are inlined rather than
/// flattened; urlencoded deserialization rejects flattened numerics.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestFilter {
    pub event_id: Option<EventId>,
    pub status: Option<TransportStatus>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl RequestFilter {
    fn page(&self) -> Page {
        let defaults = Page::default();
        Page {
            limit: self.limit.unwrap_or(defaults.limit),
            offset: self.offset.unwrap_or(defaults.offset),
        }
    }
}

/// List ride requests, optionally filtered by event and status.
///
/// # Errors
///
/// Returns 500 on a query failure.
pub async fn list_requests(
    RequireStaffAuth(_admin): RequireStaffAuth,
    State(state): State<AppState>,
    Query(filter): Query<RequestFilter>,
) -> Result<Json<ApiResponse<Vec<TransportRequest>>>, AppError> {
    let requests = TransportRepository::new(state.pool())
        .list_requests(filter.event_id, filter.status, filter.page())
        .await?;
    Ok(ok(requests))
}

/// New ride request fields (staff logging a phoned-in request).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRequestBody {
    pub event_id: EventId,
    pub contact_id: ContactId,
    pub pickup_location: Option<JsonValue>,
    pub notes: Option<String>,
}

/// Log a ride request.
///
/// # Errors
///
/// Returns 500 on a query failure.
pub async fn create_request(
    RequireStaffAuth(admin): RequireStaffAuth,
    State(state): State<AppState>,
    Json(body): Json<CreateRequestBody>,
) -> Result<Json<ApiResponse<TransportRequest>>, AppError> {
    let request = TransportRepository::new(state.pool())
        .create_request(
            body.event_id,
            body.contact_id,
            body.pickup_location.as_ref(),
            body.notes.as_deref(),
        )
        .await?;
    tracing::info!(staff = %admin.email, request_id = %request.id, "Transport request logged");
    Ok(ok(request))
}

/// Driver to assign.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignBody {
    pub driver_id: DriverId,
}

/// Assign a driver to a pending request.
///
/// # Errors
///
/// Returns 404 if no pending request matches.
pub async fn assign(
    RequireStaffAuth(admin): RequireStaffAuth,
    State(state): State<AppState>,
    Path(id): Path<TransportRequestId>,
    Json(body): Json<AssignBody>,
) -> Result<Json<ApiResponse<bool>>, AppError> {
    TransportRepository::new(state.pool())
        .assign(id, body.driver_id)
        .await?;
    tracing::info!(
        staff = %admin.email,
        request_id = %id,
        driver_id = %body.driver_id,
        "Transport request assigned"
    );
    Ok(ok(true))
}

/// Mark a request completed.
///
/// # Errors
///
/// Returns 404 if the request does not exist.
pub async fn complete(
    RequireStaffAuth(admin): RequireStaffAuth,
    State(state): State<AppState>,
    Path(id): Path<TransportRequestId>,
) -> Result<Json<ApiResponse<bool>>, AppError> {
    TransportRepository::new(state.pool()).complete(id).await?;
    tracing::info!(staff = %admin.email, request_id = %id, "Transport request completed");
    Ok(ok(true))
}

/// Cancel a request and release its driver.
///
/// # Errors
///
/// Returns 404 if the request does not exist.
pub async fn cancel(
    RequireStaffAuth(admin): RequireStaffAuth,
    State(state): State<AppState>,
    Path(id): Path<TransportRequestId>,
) -> Result<Json<ApiResponse<bool>>, AppError> {
    TransportRepository::new(state.pool()).cancel(id).await?;
    tracing::info!(staff = %admin.email, request_id = %id, "Transport request cancelled");
    Ok(ok(true))
}

/// List drivers.
///
/// # Errors
///
/// Returns 500 on a query failure.
pub async fn list_drivers(
    RequireStaffAuth(_admin): RequireStaffAuth,
    State(state): State<AppState>,
    Query(page): Query<Page>,
) -> Result<Json<ApiResponse<Vec<Driver>>>, AppError> {
    let drivers = TransportRepository::new(state.pool()).list_drivers(page).await?;
    Ok(ok(drivers))
}

/// New driver fields.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDriverBody {
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub vehicle_make: Option<String>,
    pub vehicle_model: Option<String>,
    pub license_plate: Option<String>,
    pub capacity: Option<i32>,
}

/// Register a volunteer driver.
///
/// # Errors
///
/// Returns 400 on a non-positive capacity, 500 on a query failure.
pub async fn create_driver(
    RequireStaffAuth(admin): RequireStaffAuth,
    State(state): State<AppState>,
    Json(body): Json<CreateDriverBody>,
) -> Result<Json<ApiResponse<Driver>>, AppError> {
    let capacity = body.capacity.unwrap_or(4);
    if capacity < 1 {
        return Err(AppError::BadRequest("Capacity must be at least 1".into()));
    }

    let driver = TransportRepository::new(state.pool())
        .create_driver(
            &body.name,
            body.phone.as_deref(),
            body.email.as_deref(),
            body.vehicle_make.as_deref(),
            body.vehicle_model.as_deref(),
            body.license_plate.as_deref(),
            capacity,
        )
        .await?;
    tracing::info!(staff = %admin.email, driver_id = %driver.id, "Driver registered");
    Ok(ok(driver))
}

/// Auto-assign result summary.
#[derive(Debug, Serialize)]
pub struct AutoAssignResult {
    pub assigned: Vec<AssignedPair>,
    pub unassigned: usize,
}

/// One applied assignment.
#[derive(Debug, Serialize)]
pub struct AssignedPair {
    pub request_id: TransportRequestId,
    pub driver_id: DriverId,
}

impl From<PlannedAssignment> for AssignedPair {
    fn from(planned: PlannedAssignment) -> Self {
        Self {
            request_id: planned.request_id,
            driver_id: planned.driver_id,
        }
    }
}

/// Distribute all pending requests for an event across available
/// drivers, largest remaining capacity first.
///
/// # Errors
///
/// Returns 500 on a query failure.
pub async fn auto_assign(
    RequireStaffAuth(admin): RequireStaffAuth,
    State(state): State<AppState>,
    Path(event_id): Path<EventId>,
) -> Result<Json<ApiResponse<AutoAssignResult>>, AppError> {
    let repo = TransportRepository::new(state.pool());

    let pending = repo.pending_requests(event_id).await?;
    let drivers = repo.available_drivers().await?;
    let loads = repo.driver_loads(event_id).await?;

    let planned = plan_assignments(&pending, SeatBudget::from_drivers(&drivers, &loads));
    let unassigned = pending.len().saturating_sub(planned.len());

    let mut assigned = Vec::with_capacity(planned.len());
    for assignment in planned {
        repo.assign(assignment.request_id, assignment.driver_id).await?;
        assigned.push(AssignedPair::from(assignment));
    }

    tracing::info!(
        staff = %admin.email,
        event_id = %event_id,
        assigned = assigned.len(),
        unassigned,
        "Transport auto-assign run"
    );
    Ok(ok(AutoAssignResult { assigned, unassigned }))
}
