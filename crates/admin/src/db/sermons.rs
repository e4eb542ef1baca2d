//! Sermon catalog repository.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::PgPool;

use wayside_core::SermonId;

use super::RepositoryError;

/// A published sermon.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Sermon {
    pub id: SermonId,
    pub title: String,
    pub speaker: Option<String>,
    pub scripture_reference: Option<String>,
    pub video_url: Option<String>,
    pub audio_url: Option<String>,
    pub preached_on: NaiveDate,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
}

const SERMON_COLUMNS: &str = "id, title, speaker, scripture_reference, video_url, audio_url, \
                              preached_on, is_published, created_at";

/// Repository for the sermon catalog.
pub struct SermonRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> SermonRepository<'a> {
    /// Create a new repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List sermons for the dashboard (all), newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, page: super::Page) -> Result<Vec<Sermon>, RepositoryError> {
        let page = page.clamped();
        let rows = sqlx::query_as::<_, Sermon>(&format!(
            "SELECT {SERMON_COLUMNS} FROM sermons
             ORDER BY preached_on DESC LIMIT $1 OFFSET $2"
        ))
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// List published sermons for the mobile app, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_published(&self, page: super::Page) -> Result<Vec<Sermon>, RepositoryError> {
        let page = page.clamped();
        let rows = sqlx::query_as::<_, Sermon>(&format!(
            "SELECT {SERMON_COLUMNS} FROM sermons
             WHERE is_published ORDER BY preached_on DESC LIMIT $1 OFFSET $2"
        ))
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Add a sermon to the catalog (staff entry).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        &self,
        title: &str,
        speaker: Option<&str>,
        scripture_reference: Option<&str>,
        video_url: Option<&str>,
        audio_url: Option<&str>,
        preached_on: NaiveDate,
        is_published: bool,
    ) -> Result<Sermon, RepositoryError> {
        let row = sqlx::query_as::<_, Sermon>(&format!(
            "INSERT INTO sermons
                 (id, title, speaker, scripture_reference, video_url, audio_url,
                  preached_on, is_published)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {SERMON_COLUMNS}"
        ))
        .bind(SermonId::generate())
        .bind(title)
        .bind(speaker)
        .bind(scripture_reference)
        .bind(video_url)
        .bind(audio_url)
        .bind(preached_on)
        .bind(is_published)
        .fetch_one(self.pool)
        .await?;
        Ok(row)
    }
}
