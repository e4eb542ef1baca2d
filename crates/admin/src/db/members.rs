//! Member repository.
//!
//! Membership is a formal status layered on a contact (a contact can exist
//! for years as a visitor before becoming a member).

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;

use wayside_core::{ContactId, MemberId};

use super::RepositoryError;

/// A formal church member.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Member {
    pub id: MemberId,
    pub contact_id: ContactId,
    pub joined_at: DateTime<Utc>,
    pub notes: Option<String>,
}

/// Repository for member records.
pub struct MemberRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> MemberRepository<'a> {
    /// Create a new repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List members, most recent first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, page: super::Page) -> Result<Vec<Member>, RepositoryError> {
        let page = page.clamped();
        let members = sqlx::query_as::<_, Member>(
            "SELECT id, contact_id, joined_at, notes
             FROM members ORDER BY joined_at DESC LIMIT $1 OFFSET $2",
        )
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(self.pool)
        .await?;
        Ok(members)
    }

    /// Get the member record for a contact, if any.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_contact(
        &self,
        contact_id: ContactId,
    ) -> Result<Option<Member>, RepositoryError> {
        let member = sqlx::query_as::<_, Member>(
            "SELECT id, contact_id, joined_at, notes FROM members WHERE contact_id = $1",
        )
        .bind(contact_id)
        .fetch_optional(self.pool)
        .await?;
        Ok(member)
    }

    /// Promote a contact to member. Idempotent per contact.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create(
        &self,
        contact_id: ContactId,
        notes: Option<&str>,
    ) -> Result<Member, RepositoryError> {
        let member = sqlx::query_as::<_, Member>(
            "INSERT INTO members (id, contact_id, joined_at, notes)
             VALUES ($1, $2, NOW(), $3)
             ON CONFLICT (contact_id) DO UPDATE SET notes = COALESCE($3, members.notes)
             RETURNING id, contact_id, joined_at, notes",
        )
        .bind(MemberId::generate())
        .bind(contact_id)
        .bind(notes)
        .fetch_one(self.pool)
        .await?;
        Ok(member)
    }
}
