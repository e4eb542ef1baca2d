//! The published sermon catalog.

use chrono::NaiveDate;
use serde::Serialize;
use sqlx::PgPool;

use wayside_core::SermonId;

use super::RepositoryError;

/// A published sermon as shown in the app.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SermonView {
    pub id: SermonId,
    pub title: String,
    pub speaker: Option<String>,
    pub scripture_reference: Option<String>,
    pub video_url: Option<String>,
    pub audio_url: Option<String>,
    pub preached_on: NaiveDate,
}

/// Member-facing sermon repository.
pub struct SermonRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> SermonRepository<'a> {
    /// Create a new repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Published sermons, most recent first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_published(
        &self,
        page: super::Page,
    ) -> Result<Vec<SermonView>, RepositoryError> {
        let page = page.clamped();
        let sermons = sqlx::query_as::<_, SermonView>(
            "SELECT id, title, speaker, scripture_reference, video_url, audio_url, preached_on
             FROM sermons
             WHERE is_published
             ORDER BY preached_on DESC
             LIMIT $1 OFFSET $2",
        )
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(self.pool)
        .await?;
        Ok(sermons)
    }
}
