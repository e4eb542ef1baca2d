//! Event transport: ride requests and volunteer drivers.
//!
//! Members (or staff, on their behalf) request a pickup for an event;
//! staff assign drivers from the dashboard, either one at a time or via
//! the auto-assign planner in [`crate::services::transport`].

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value as JsonValue;
use sqlx::PgPool;

use wayside_core::{ContactId, DriverId, DriverStatus, EventId, TransportRequestId, TransportStatus};

use super::{Page, RepositoryError};

/// A volunteer driver and their vehicle.
#[derive(Debug, Clone, Serialize)]
pub struct Driver {
    pub id: DriverId,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub status: DriverStatus,
    pub vehicle_make: Option<String>,
    pub vehicle_model: Option<String>,
    pub license_plate: Option<String>,
    pub capacity: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct DriverRow {
    id: DriverId,
    name: String,
    phone: Option<String>,
    email: Option<String>,
    status: String,
    vehicle_make: Option<String>,
    vehicle_model: Option<String>,
    license_plate: Option<String>,
    capacity: i32,
    created_at: DateTime<Utc>,
}

impl TryFrom<DriverRow> for Driver {
    type Error = RepositoryError;

    fn try_from(row: DriverRow) -> Result<Self, Self::Error> {
        let status = row.status.parse::<DriverStatus>().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid driver status in database: {e}"))
        })?;
        Ok(Self {
            id: row.id,
            name: row.name,
            phone: row.phone,
            email: row.email,
            status,
            vehicle_make: row.vehicle_make,
            vehicle_model: row.vehicle_model,
            license_plate: row.license_plate,
            capacity: row.capacity,
            created_at: row.created_at,
        })
    }
}

const DRIVER_COLUMNS: &str = "id, name, phone, email, status, vehicle_make, vehicle_model, \
     license_plate, capacity, created_at";

/// A ride request for an event.
#[derive(Debug, Clone, Serialize)]
pub struct TransportRequest {
    pub id: TransportRequestId,
    pub event_id: EventId,
    pub contact_id: ContactId,
    /// `{ lat, lng, address }` as captured by the pickup picker.
    pub pickup_location: Option<JsonValue>,
    pub notes: Option<String>,
    pub status: TransportStatus,
    pub assigned_driver: Option<DriverId>,
    pub requested_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct TransportRequestRow {
    id: TransportRequestId,
    event_id: EventId,
    contact_id: ContactId,
    pickup_location: Option<JsonValue>,
    notes: Option<String>,
    status: String,
    assigned_driver: Option<DriverId>,
    requested_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<TransportRequestRow> for TransportRequest {
    type Error = RepositoryError;

    fn try_from(row: TransportRequestRow) -> Result<Self, Self::Error> {
        let status = row.status.parse::<TransportStatus>().map_err(|e| {
            RepositoryError::DataCorruption(format!(
                "invalid transport request status in database: {e}"
            ))
        })?;
        Ok(Self {
            id: row.id,
            event_id: row.event_id,
            contact_id: row.contact_id,
            pickup_location: row.pickup_location,
            notes: row.notes,
            status,
            assigned_driver: row.assigned_driver,
            requested_at: row.requested_at,
            updated_at: row.updated_at,
        })
    }
}

const REQUEST_COLUMNS: &str = "id, event_id, contact_id, pickup_location, notes, status, \
     assigned_driver, requested_at, updated_at";

/// A driver's current assigned-request count for one event.
#[derive(Debug, Clone, Copy, sqlx::FromRow)]
pub struct DriverLoad {
    pub driver_id: DriverId,
    pub assigned: i64,
}

/// Repository for transport requests and drivers.
pub struct TransportRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> TransportRepository<'a> {
    /// Create a new repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    // Drivers
    // =========================================================================

    /// List drivers, alphabetical.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_drivers(&self, page: Page) -> Result<Vec<Driver>, RepositoryError> {
        let page = page.clamped();
        let rows = sqlx::query_as::<_, DriverRow>(&format!(
            "SELECT {DRIVER_COLUMNS} FROM drivers ORDER BY name LIMIT $1 OFFSET $2"
        ))
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Driver::try_from).collect()
    }

    /// List drivers currently marked available.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn available_drivers(&self) -> Result<Vec<Driver>, RepositoryError> {
        let rows = sqlx::query_as::<_, DriverRow>(&format!(
            "SELECT {DRIVER_COLUMNS} FROM drivers WHERE status = 'available' ORDER BY name"
        ))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Driver::try_from).collect()
    }

    /// Register a driver (staff entry).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[allow(clippy::too_many_arguments)]
    pub async fn create_driver(
        &self,
        name: &str,
        phone: Option<&str>,
        email: Option<&str>,
        vehicle_make: Option<&str>,
        vehicle_model: Option<&str>,
        license_plate: Option<&str>,
        capacity: i32,
    ) -> Result<Driver, RepositoryError> {
        let row = sqlx::query_as::<_, DriverRow>(&format!(
            "INSERT INTO drivers
                 (id, name, phone, email, vehicle_make, vehicle_model, license_plate, capacity)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {DRIVER_COLUMNS}"
        ))
        .bind(DriverId::generate())
        .bind(name)
        .bind(phone)
        .bind(email)
        .bind(vehicle_make)
        .bind(vehicle_model)
        .bind(license_plate)
        .bind(capacity)
        .fetch_one(self.pool)
        .await?;

        row.try_into()
    }

    /// Set a driver's availability.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the driver does not exist.
    pub async fn set_driver_status(
        &self,
        id: DriverId,
        status: DriverStatus,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE drivers SET status = $2 WHERE id = $1")
            .bind(id)
            .bind(status.as_str())
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    // =========================================================================
    // Transport requests
    // =========================================================================

    /// List requests, newest first, optionally filtered by event and status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_requests(
        &self,
        event_id: Option<EventId>,
        status: Option<TransportStatus>,
        page: Page,
    ) -> Result<Vec<TransportRequest>, RepositoryError> {
        let page = page.clamped();
        let rows = sqlx::query_as::<_, TransportRequestRow>(&format!(
            "SELECT {REQUEST_COLUMNS} FROM transport_requests
             WHERE ($1::uuid IS NULL OR event_id = $1)
               AND ($2::text IS NULL OR status = $2)
             ORDER BY requested_at DESC LIMIT $3 OFFSET $4"
        ))
        .bind(event_id)
        .bind(status.map(|s| s.as_str()))
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TransportRequest::try_from).collect()
    }

    /// Get a single request.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_request(
        &self,
        id: TransportRequestId,
    ) -> Result<Option<TransportRequest>, RepositoryError> {
        let row = sqlx::query_as::<_, TransportRequestRow>(&format!(
            "SELECT {REQUEST_COLUMNS} FROM transport_requests WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(TransportRequest::try_from).transpose()
    }

    /// Log a ride request for an event.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create_request(
        &self,
        event_id: EventId,
        contact_id: ContactId,
        pickup_location: Option<&JsonValue>,
        notes: Option<&str>,
    ) -> Result<TransportRequest, RepositoryError> {
        let row = sqlx::query_as::<_, TransportRequestRow>(&format!(
            "INSERT INTO transport_requests (id, event_id, contact_id, pickup_location, notes)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {REQUEST_COLUMNS}"
        ))
        .bind(TransportRequestId::generate())
        .bind(event_id)
        .bind(contact_id)
        .bind(pickup_location)
        .bind(notes)
        .fetch_one(self.pool)
        .await?;

        row.try_into()
    }

    /// Assign a driver to a pending request.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no pending request matches;
    /// already-assigned or closed requests are not reassigned silently.
    pub async fn assign(
        &self,
        id: TransportRequestId,
        driver_id: DriverId,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE transport_requests
             SET status = 'assigned', assigned_driver = $2, updated_at = NOW()
             WHERE id = $1 AND status = 'pending'",
        )
        .bind(id)
        .bind(driver_id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Mark an assigned request completed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the request does not exist.
    pub async fn complete(&self, id: TransportRequestId) -> Result<(), RepositoryError> {
        self.set_request_status(id, TransportStatus::Completed).await
    }

    /// Cancel a request and release its driver.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the request does not exist.
    pub async fn cancel(&self, id: TransportRequestId) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE transport_requests
             SET status = 'cancelled', assigned_driver = NULL, updated_at = NOW()
             WHERE id = $1",
        )
        .bind(id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn set_request_status(
        &self,
        id: TransportRequestId,
        status: TransportStatus,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE transport_requests SET status = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(status.as_str())
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Pending, unassigned requests for an event (auto-assign input).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn pending_requests(
        &self,
        event_id: EventId,
    ) -> Result<Vec<TransportRequest>, RepositoryError> {
        let rows = sqlx::query_as::<_, TransportRequestRow>(&format!(
            "SELECT {REQUEST_COLUMNS} FROM transport_requests
             WHERE event_id = $1 AND status = 'pending' AND assigned_driver IS NULL
             ORDER BY requested_at"
        ))
        .bind(event_id)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TransportRequest::try_from).collect()
    }

    /// Assigned-request counts per driver for an event.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn driver_loads(&self, event_id: EventId) -> Result<Vec<DriverLoad>, RepositoryError> {
        let loads = sqlx::query_as::<_, DriverLoad>(
            "SELECT assigned_driver AS driver_id, COUNT(*) AS assigned
             FROM transport_requests
             WHERE event_id = $1 AND status = 'assigned' AND assigned_driver IS NOT NULL
             GROUP BY assigned_driver",
        )
        .bind(event_id)
        .fetch_all(self.pool)
        .await?;
        Ok(loads)
    }
}
