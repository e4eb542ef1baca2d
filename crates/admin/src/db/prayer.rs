//! Prayer request repository.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;

use wayside_core::{ContactId, PrayerRequestId};

use super::RepositoryError;

/// A prayer request submitted from the app or entered by staff.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct PrayerRequest {
    pub id: PrayerRequestId,
    pub contact_id: Option<ContactId>,
    pub subject: String,
    pub body: String,
    /// Anonymous requests hide the submitter's name from staff views.
    pub is_anonymous: bool,
    pub is_answered: bool,
    pub created_at: DateTime<Utc>,
}

/// Repository for prayer requests.
pub struct PrayerRequestRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PrayerRequestRepository<'a> {
    /// Create a new repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List requests for the dashboard, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, page: super::Page) -> Result<Vec<PrayerRequest>, RepositoryError> {
        let page = page.clamped();
        let rows = sqlx::query_as::<_, PrayerRequest>(
            "SELECT id, contact_id, subject, body, is_anonymous, is_answered, created_at
             FROM prayer_requests ORDER BY created_at DESC LIMIT $1 OFFSET $2",
        )
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// List a contact's own requests, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_contact(
        &self,
        contact_id: ContactId,
        page: super::Page,
    ) -> Result<Vec<PrayerRequest>, RepositoryError> {
        let page = page.clamped();
        let rows = sqlx::query_as::<_, PrayerRequest>(
            "SELECT id, contact_id, subject, body, is_anonymous, is_answered, created_at
             FROM prayer_requests WHERE contact_id = $1
             ORDER BY created_at DESC LIMIT $2 OFFSET $3",
        )
        .bind(contact_id)
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Submit a new request.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create(
        &self,
        contact_id: Option<ContactId>,
        subject: &str,
        body: &str,
        is_anonymous: bool,
    ) -> Result<PrayerRequest, RepositoryError> {
        let row = sqlx::query_as::<_, PrayerRequest>(
            "INSERT INTO prayer_requests (id, contact_id, subject, body, is_anonymous)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id, contact_id, subject, body, is_anonymous, is_answered, created_at",
        )
        .bind(PrayerRequestId::generate())
        .bind(contact_id)
        .bind(subject)
        .bind(body)
        .bind(is_anonymous)
        .fetch_one(self.pool)
        .await?;
        Ok(row)
    }

    /// Mark a request answered (staff action).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the request does not exist.
    pub async fn mark_answered(&self, id: PrayerRequestId) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE prayer_requests SET is_answered = TRUE WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
