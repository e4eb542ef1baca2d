//! Mobile app user repository.
//!
//! `mobile_app_users` links an auth identity (`auth_user_id`, issued by the
//! hosted auth subsystem) to a contact record. At most one row exists per
//! identity - enforced by a unique constraint so concurrent provisioning
//! attempts collapse into a single row instead of racing. A contact may be
//! linked from more than one row; that is deliberate pending product
//! clarification (see the schema comment).

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value as JsonValue;
use sqlx::PgPool;

use wayside_core::{AppUserId, AppUserStatus, ContactId, IdentityId};

use super::RepositoryError;

/// A mobile app user row.
#[derive(Debug, Clone, Serialize)]
pub struct AppUser {
    pub id: AppUserId,
    pub auth_user_id: IdentityId,
    pub contact_id: Option<ContactId>,
    pub status: AppUserStatus,
    /// Registered push tokens, one JSON object per device.
    pub devices: JsonValue,
    pub registered_at: DateTime<Utc>,
    pub last_active: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct AppUserRow {
    id: AppUserId,
    auth_user_id: IdentityId,
    contact_id: Option<ContactId>,
    status: String,
    devices: JsonValue,
    registered_at: DateTime<Utc>,
    last_active: DateTime<Utc>,
}

impl TryFrom<AppUserRow> for AppUser {
    type Error = RepositoryError;

    fn try_from(row: AppUserRow) -> Result<Self, Self::Error> {
        let status = row.status.parse::<AppUserStatus>().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid app user status in database: {e}"))
        })?;
        Ok(Self {
            id: row.id,
            auth_user_id: row.auth_user_id,
            contact_id: row.contact_id,
            status,
            devices: row.devices,
            registered_at: row.registered_at,
            last_active: row.last_active,
        })
    }
}

const APP_USER_COLUMNS: &str =
    "id, auth_user_id, contact_id, status, devices, registered_at, last_active";

/// Repository for mobile app user operations.
pub struct AppUserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AppUserRepository<'a> {
    /// Create a new repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get the app user row for an auth identity.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_identity(
        &self,
        identity: IdentityId,
    ) -> Result<Option<AppUser>, RepositoryError> {
        let row = sqlx::query_as::<_, AppUserRow>(&format!(
            "SELECT {APP_USER_COLUMNS} FROM mobile_app_users WHERE auth_user_id = $1"
        ))
        .bind(identity)
        .fetch_optional(self.pool)
        .await?;

        row.map(AppUser::try_from).transpose()
    }

    /// Idempotently link an identity to a contact.
    ///
    /// Single-statement upsert keyed on the unique `auth_user_id` constraint:
    /// concurrent first-time calls for the same identity produce exactly one
    /// row, and an existing link is never overwritten (`contact_id` is only
    /// filled when currently NULL).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn upsert_link(
        &self,
        identity: IdentityId,
        contact_id: Option<ContactId>,
    ) -> Result<AppUser, RepositoryError> {
        let row = sqlx::query_as::<_, AppUserRow>(&format!(
            "INSERT INTO mobile_app_users
                 (id, auth_user_id, contact_id, status, devices, registered_at, last_active)
             VALUES ($1, $2, $3, 'active', '[]'::jsonb, NOW(), NOW())
             ON CONFLICT (auth_user_id) DO UPDATE
                 SET contact_id = COALESCE(mobile_app_users.contact_id, EXCLUDED.contact_id),
                     last_active = NOW()
             RETURNING {APP_USER_COLUMNS}"
        ))
        .bind(AppUserId::generate())
        .bind(identity)
        .bind(contact_id)
        .fetch_one(self.pool)
        .await?;

        AppUser::try_from(row)
    }

    /// List app users joined with their contact names, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_with_contacts(
        &self,
        page: super::Page,
    ) -> Result<Vec<AppUserWithContact>, RepositoryError> {
        let page = page.clamped();
        let rows = sqlx::query_as::<_, AppUserWithContactRow>(
            "SELECT u.id, u.auth_user_id, u.contact_id, u.status, u.registered_at,
                    u.last_active, c.first_name, c.last_name, c.email
             FROM mobile_app_users u
             LEFT JOIN contacts c ON c.id = u.contact_id
             ORDER BY u.registered_at DESC
             LIMIT $1 OFFSET $2",
        )
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter()
            .map(AppUserWithContact::try_from)
            .collect()
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
    /// The devices column is a JSONB array of `{token, platform, updated_at}`
    /// objects; an existing entry for the same token is replaced.
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
    pub async fn get_notification_preferences(
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

    /// Identities whose app user row has no linked contact.
    ///
    /// Input to the dashboard's "fix missing records" repair action.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn unlinked_identities(&self) -> Result<Vec<IdentityId>, RepositoryError> {
        let rows = sqlx::query_as::<_, (IdentityId,)>(
            "SELECT auth_user_id FROM mobile_app_users WHERE contact_id IS NULL",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.0).collect())
    }

    /// All registered push tokens across active app users.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn all_push_tokens(&self) -> Result<Vec<String>, RepositoryError> {
        let rows = sqlx::query_as::<_, (String,)>(
            "SELECT DISTINCT d->>'token'
             FROM mobile_app_users, jsonb_array_elements(devices) AS d
             WHERE status = 'active' AND d->>'token' IS NOT NULL",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.0).collect())
    }
}

/// App user joined with contact display fields, for the dashboard list.
#[derive(Debug, Clone, Serialize)]
pub struct AppUserWithContact {
    pub id: AppUserId,
    pub auth_user_id: IdentityId,
    pub contact_id: Option<ContactId>,
    pub status: AppUserStatus,
    pub registered_at: DateTime<Utc>,
    pub last_active: DateTime<Utc>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
}

#[derive(sqlx::FromRow)]
struct AppUserWithContactRow {
    id: AppUserId,
    auth_user_id: IdentityId,
    contact_id: Option<ContactId>,
    status: String,
    registered_at: DateTime<Utc>,
    last_active: DateTime<Utc>,
    first_name: Option<String>,
    last_name: Option<String>,
    email: Option<String>,
}

impl TryFrom<AppUserWithContactRow> for AppUserWithContact {
    type Error = RepositoryError;

    fn try_from(row: AppUserWithContactRow) -> Result<Self, Self::Error> {
        let status = row.status.parse::<AppUserStatus>().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid app user status in database: {e}"))
        })?;
        Ok(Self {
            id: row.id,
            auth_user_id: row.auth_user_id,
            contact_id: row.contact_id,
            status,
            registered_at: row.registered_at,
            last_active: row.last_active,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
        })
    }
}
