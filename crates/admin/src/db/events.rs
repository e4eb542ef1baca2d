//! Event, registration, and attendance repositories.
//!
//! Registration records intent to attend; attendance records an actual
//! check-in. Both are unique per (event, contact) so repeated mobile taps
//! are harmless.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;

use wayside_core::{AttendanceId, ContactId, EventId, EventStatus, RegistrationId};

use super::RepositoryError;

/// A calendar event.
#[derive(Debug, Clone, Serialize)]
pub struct Event {
    pub id: EventId,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
    pub status: EventStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct EventRow {
    id: EventId,
    title: String,
    description: Option<String>,
    location: Option<String>,
    starts_at: DateTime<Utc>,
    ends_at: Option<DateTime<Utc>>,
    status: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<EventRow> for Event {
    type Error = RepositoryError;

    fn try_from(row: EventRow) -> Result<Self, Self::Error> {
        let status = row.status.parse::<EventStatus>().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid event status in database: {e}"))
        })?;
        Ok(Self {
            id: row.id,
            title: row.title,
            description: row.description,
            location: row.location,
            starts_at: row.starts_at,
            ends_at: row.ends_at,
            status,
            created_at: row.created_at,
        })
    }
}

const EVENT_COLUMNS: &str =
    "id, title, description, location, starts_at, ends_at, status, created_at";

/// An event registration.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Registration {
    pub id: RegistrationId,
    pub event_id: EventId,
    pub contact_id: ContactId,
    pub registered_at: DateTime<Utc>,
}

/// An attendance (check-in) record.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Attendance {
    pub id: AttendanceId,
    pub event_id: EventId,
    pub contact_id: ContactId,
    pub checked_in_at: DateTime<Utc>,
    pub method: String,
}

/// Repository for events, registrations, and attendance.
pub struct EventRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> EventRepository<'a> {
    /// Create a new repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List events for the dashboard (all statuses), newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, page: super::Page) -> Result<Vec<Event>, RepositoryError> {
        let page = page.clamped();
        let rows = sqlx::query_as::<_, EventRow>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events ORDER BY starts_at DESC LIMIT $1 OFFSET $2"
        ))
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Event::try_from).collect()
    }

    /// List upcoming published events for the mobile app.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_upcoming_published(
        &self,
        page: super::Page,
    ) -> Result<Vec<Event>, RepositoryError> {
        let page = page.clamped();
        let rows = sqlx::query_as::<_, EventRow>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events
             WHERE status = 'published' AND starts_at >= NOW() - INTERVAL '1 day'
             ORDER BY starts_at
             LIMIT $1 OFFSET $2"
        ))
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Event::try_from).collect()
    }

    /// Get one event.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: EventId) -> Result<Option<Event>, RepositoryError> {
        let row = sqlx::query_as::<_, EventRow>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(Event::try_from).transpose()
    }

    /// Create an event (staff entry).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create(
        &self,
        title: &str,
        description: Option<&str>,
        location: Option<&str>,
        starts_at: DateTime<Utc>,
        ends_at: Option<DateTime<Utc>>,
        status: EventStatus,
    ) -> Result<Event, RepositoryError> {
        let row = sqlx::query_as::<_, EventRow>(&format!(
            "INSERT INTO events (id, title, description, location, starts_at, ends_at, status)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {EVENT_COLUMNS}"
        ))
        .bind(EventId::generate())
        .bind(title)
        .bind(description)
        .bind(location)
        .bind(starts_at)
        .bind(ends_at)
        .bind(status.as_str())
        .fetch_one(self.pool)
        .await?;

        Event::try_from(row)
    }

    // =========================================================================
    // Registrations
    // =========================================================================

    /// Register a contact for an event. Idempotent per (event, contact).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn register(
        &self,
        event_id: EventId,
        contact_id: ContactId,
    ) -> Result<Registration, RepositoryError> {
        let registration = sqlx::query_as::<_, Registration>(
            "INSERT INTO registrations (id, event_id, contact_id, registered_at)
             VALUES ($1, $2, $3, NOW())
             ON CONFLICT (event_id, contact_id) DO UPDATE SET event_id = EXCLUDED.event_id
             RETURNING id, event_id, contact_id, registered_at",
        )
        .bind(RegistrationId::generate())
        .bind(event_id)
        .bind(contact_id)
        .fetch_one(self.pool)
        .await?;

        Ok(registration)
    }

    /// Whether a contact is registered for an event.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn is_registered(
        &self,
        event_id: EventId,
        contact_id: ContactId,
    ) -> Result<bool, RepositoryError> {
        let row = sqlx::query_as::<_, (i64,)>(
            "SELECT COUNT(*) FROM registrations WHERE event_id = $1 AND contact_id = $2",
        )
        .bind(event_id)
        .bind(contact_id)
        .fetch_one(self.pool)
        .await?;

        Ok(row.0 > 0)
    }

    /// List registrations for an event (dashboard).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_registrations(
        &self,
        event_id: EventId,
    ) -> Result<Vec<Registration>, RepositoryError> {
        let rows = sqlx::query_as::<_, Registration>(
            "SELECT id, event_id, contact_id, registered_at
             FROM registrations WHERE event_id = $1 ORDER BY registered_at",
        )
        .bind(event_id)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    // =========================================================================
    // Attendance
    // =========================================================================

    /// Check a contact in to an event. Repeated check-ins keep the original
    /// timestamp.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn check_in(
        &self,
        event_id: EventId,
        contact_id: ContactId,
        method: &str,
    ) -> Result<Attendance, RepositoryError> {
        let attendance = sqlx::query_as::<_, Attendance>(
            "INSERT INTO attendance (id, event_id, contact_id, checked_in_at, method)
             VALUES ($1, $2, $3, NOW(), $4)
             ON CONFLICT (event_id, contact_id) DO UPDATE SET event_id = EXCLUDED.event_id
             RETURNING id, event_id, contact_id, checked_in_at, method",
        )
        .bind(AttendanceId::generate())
        .bind(event_id)
        .bind(contact_id)
        .bind(method)
        .fetch_one(self.pool)
        .await?;

        Ok(attendance)
    }

    /// Check-in history for a contact, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn check_in_history(
        &self,
        contact_id: ContactId,
        page: super::Page,
    ) -> Result<Vec<Attendance>, RepositoryError> {
        let page = page.clamped();
        let rows = sqlx::query_as::<_, Attendance>(
            "SELECT id, event_id, contact_id, checked_in_at, method
             FROM attendance WHERE contact_id = $1
             ORDER BY checked_in_at DESC LIMIT $2 OFFSET $3",
        )
        .bind(contact_id)
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }
}
