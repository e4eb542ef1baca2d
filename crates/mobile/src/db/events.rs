//! Published events, the member's registrations, and self check-in.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;

use wayside_core::{AttendanceId, ContactId, EventId, RegistrationId};

use super::RepositoryError;

/// A published event as shown in the app, with the member's own state.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct EventView {
    pub id: EventId,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
    pub is_registered: bool,
    pub is_checked_in: bool,
}

/// A past check-in, joined with the event title.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceView {
    pub id: AttendanceId,
    pub event_id: EventId,
    pub event_title: String,
    pub checked_in_at: DateTime<Utc>,
}

const EVENT_VIEW_QUERY: &str = "SELECT e.id, e.title, e.description, e.location,
        e.starts_at, e.ends_at,
        EXISTS (SELECT 1 FROM registrations r
                WHERE r.event_id = e.id AND r.contact_id = $1) AS is_registered,
        EXISTS (SELECT 1 FROM attendance a
                WHERE a.event_id = e.id AND a.contact_id = $1) AS is_checked_in
 FROM events e";

/// Member-facing event repository.
pub struct EventRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> EventRepository<'a> {
    /// Create a new repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Upcoming published events, soonest first, with the member's own
    /// registration and check-in flags.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_upcoming(
        &self,
        contact_id: ContactId,
        page: super::Page,
    ) -> Result<Vec<EventView>, RepositoryError> {
        let page = page.clamped();
        let events = sqlx::query_as::<_, EventView>(&format!(
            "{EVENT_VIEW_QUERY}
             WHERE e.status = 'published' AND e.starts_at >= NOW() - INTERVAL '1 day'
             ORDER BY e.starts_at
             LIMIT $2 OFFSET $3"
        ))
        .bind(contact_id)
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(self.pool)
        .await?;
        Ok(events)
    }

    /// One published event with the member's own flags.
    ///
    /// Draft and cancelled events are invisible to the app.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_published(
        &self,
        event_id: EventId,
        contact_id: ContactId,
    ) -> Result<Option<EventView>, RepositoryError> {
        let event = sqlx::query_as::<_, EventView>(&format!(
            "{EVENT_VIEW_QUERY} WHERE e.id = $2 AND e.status = 'published'"
        ))
        .bind(contact_id)
        .bind(event_id)
        .fetch_optional(self.pool)
        .await?;
        Ok(event)
    }

    /// Register the member for an event. Idempotent per (event, contact),
    /// so a double tap is harmless.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn register(
        &self,
        event_id: EventId,
        contact_id: ContactId,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO registrations (id, event_id, contact_id, registered_at)
             VALUES ($1, $2, $3, NOW())
             ON CONFLICT (event_id, contact_id) DO NOTHING",
        )
        .bind(RegistrationId::generate())
        .bind(event_id)
        .bind(contact_id)
        .execute(self.pool)
        .await?;
        Ok(())
    }

    /// Self check-in. Repeated check-ins keep the original timestamp.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn check_in(
        &self,
        event_id: EventId,
        contact_id: ContactId,
    ) -> Result<DateTime<Utc>, RepositoryError> {
        let row = sqlx::query_as::<_, (DateTime<Utc>,)>(
            "INSERT INTO attendance (id, event_id, contact_id, checked_in_at, method)
             VALUES ($1, $2, $3, NOW(), 'mobile')
             ON CONFLICT (event_id, contact_id) DO UPDATE SET event_id = EXCLUDED.event_id
             RETURNING checked_in_at",
        )
        .bind(AttendanceId::generate())
        .bind(event_id)
        .bind(contact_id)
        .fetch_one(self.pool)
        .await?;
        Ok(row.0)
    }

    /// The member's check-in history, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn attendance_history(
        &self,
        contact_id: ContactId,
        page: super::Page,
    ) -> Result<Vec<AttendanceView>, RepositoryError> {
        let page = page.clamped();
        let rows = sqlx::query_as::<_, AttendanceView>(
            "SELECT a.id, a.event_id, e.title AS event_title, a.checked_in_at
             FROM attendance a
             JOIN events e ON e.id = a.event_id
             WHERE a.contact_id = $1
             ORDER BY a.checked_in_at DESC
             LIMIT $2 OFFSET $3",
        )
        .bind(contact_id)
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }
}
