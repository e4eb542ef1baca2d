//! The identity-to-contact link table, from the member's side.
//!
//! One row per auth identity, enforced by a unique constraint on
//! `auth_user_id`, so the resolver's upsert is race-free: concurrent
//! first sign-ins collapse into a single row and an existing link is
//! never overwritten.

use chrono::Utc;
use serde_json::Value as JsonValue;
use sqlx::PgPool;

use wayside_core::{AppUserId, ContactId, IdentityId};

use super::RepositoryError;

/// Member-facing app user repository.
pub struct AppUserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AppUserRepository<'a> {
    /// Create a new repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// The contact currently linked to an identity, if any.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn linked_contact(
        &self,
        identity: IdentityId,
    ) -> Result<Option<ContactId>, RepositoryError> {
        let row = sqlx::query_as::<_, (Option<ContactId>,)>(
            "SELECT contact_id FROM mobile_app_users WHERE auth_user_id = $1",
        )
        .bind(identity)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.and_then(|r| r.0))
    }

    /// Idempotently link an identity to a contact.
    ///
    /// Keyed on the unique `auth_user_id` constraint; `contact_id` is only
    /// filled when currently NULL, so a second resolution sees the first
    /// one's link.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn upsert_link(
        &self,
        identity: IdentityId,
        contact_id: ContactId,
    ) -> Result<ContactId, RepositoryError> {
        let row = sqlx::query_as::<_, (Option<ContactId>,)>(
            "INSERT INTO mobile_app_users
                 (id, auth_user_id, contact_id, status, devices, registered_at, last_active)
             VALUES ($1, $2, $3, 'active', '[]'::jsonb, NOW(), NOW())
             ON CONFLICT (auth_user_id) DO UPDATE
                 SET contact_id = COALESCE(mobile_app_users.contact_id, EXCLUDED.contact_id),
                     last_active = NOW()
             RETURNING contact_id",
        )
        .bind(AppUserId::generate())
        .bind(identity)
        .bind(contact_id)
        .fetch_one(self.pool)
        .await?;

        // The COALESCE guarantees a non-null contact_id after this upsert.
        row.0.ok_or_else(|| {
            RepositoryError::DataCorruption("upsert_link returned a null contact_id".into())
        })
    }

    /// Record app activity for an identity.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn touch_last_active(&self, identity: IdentityId) -> Result<(), RepositoryError> {
        sqlx::query("UPDATE mobile_app_users SET last_active = NOW() WHERE auth_user_id = $1")
            .bind(identity)
            .execute(self.pool)
            .await?;
        Ok(())
    }

    /// Register (or refresh) a push token on the identity's device list.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no app user row exists.
    pub async fn register_push_token(
        &self,
        identity: IdentityId,
        token: &str,
        platform: &str,
    ) -> Result<(), RepositoryError> {
        let device = serde_json::json!({
            "token": token,
            "platform": platform,
            "updated_at": Utc::now(),
        });

        let result = sqlx::query(
            "UPDATE mobile_app_users
             SET devices = (
                     SELECT COALESCE(jsonb_agg(d), '[]'::jsonb)
                     FROM jsonb_array_elements(devices) AS d
                     WHERE d->>'token' IS DISTINCT FROM $2
                 ) || jsonb_build_array($3::jsonb),
                 last_active = NOW()
             WHERE auth_user_id = $1",
        )
        .bind(identity)
        .bind(token)
        .bind(device)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Get the notification preference blob for an identity.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no app user row exists.
    pub async fn notification_preferences(
        &self,
        identity: IdentityId,
    ) -> Result<JsonValue, RepositoryError> {
        let row = sqlx::query_as::<_, (JsonValue,)>(
            "SELECT notification_preferences FROM mobile_app_users WHERE auth_user_id = $1",
        )
        .bind(identity)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Ok(row.0)
    }

    /// Replace the notification preference blob for an identity.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no app user row exists.
    pub async fn set_notification_preferences(
        &self,
        identity: IdentityId,
        preferences: &JsonValue,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE mobile_app_users SET notification_preferences = $2 WHERE auth_user_id = $1",
        )
        .bind(identity)
        .bind(preferences)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
