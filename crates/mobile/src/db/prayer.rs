//! Prayer requests submitted from the app.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;

use wayside_core::{ContactId, PrayerRequestId};

use super::RepositoryError;

/// A prayer request as shown back to its author.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PrayerRequestView {
    pub id: PrayerRequestId,
    pub subject: String,
    pub body: String,
    pub is_anonymous: bool,
    pub is_answered: bool,
    pub created_at: DateTime<Utc>,
}

/// Member-facing prayer request repository.
pub struct PrayerRequestRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PrayerRequestRepository<'a> {
    /// Create a new repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Submit a prayer request.
    ///
    /// Anonymous requests keep the contact link for the author's own list
    /// but are hidden from the dashboard's name column.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn submit(
        &self,
        contact_id: ContactId,
        subject: &str,
        body: &str,
        is_anonymous: bool,
    ) -> Result<PrayerRequestView, RepositoryError> {
        let request = sqlx::query_as::<_, PrayerRequestView>(
            "INSERT INTO prayer_requests (id, contact_id, subject, body, is_anonymous)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id, subject, body, is_anonymous, is_answered, created_at",
        )
        .bind(PrayerRequestId::generate())
        .bind(contact_id)
        .bind(subject)
        .bind(body)
        .bind(is_anonymous)
        .fetch_one(self.pool)
        .await?;
        Ok(request)
    }

    /// The member's own prayer requests, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_own(
        &self,
        contact_id: ContactId,
        page: super::Page,
    ) -> Result<Vec<PrayerRequestView>, RepositoryError> {
        let page = page.clamped();
        let requests = sqlx::query_as::<_, PrayerRequestView>(
            "SELECT id, subject, body, is_anonymous, is_answered, created_at
             FROM prayer_requests
             WHERE contact_id = $1
             ORDER BY created_at DESC
             LIMIT $2 OFFSET $3",
        )
        .bind(contact_id)
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(self.pool)
        .await?;
        Ok(requests)
    }
}
