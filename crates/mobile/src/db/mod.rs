//! Member-facing database access.
//!
//! The mobile backend shares the `PostgreSQL` database with the admin
//! backend but only ever touches it on behalf of the signed-in member:
//! published events, the member's own registrations, memberships, prayer
//! requests, and giving history. Schema migrations live with the admin
//! crate and run via `wayside-cli migrate`.
//!
//! Queries are runtime-checked (`sqlx::query_as`) so the workspace builds
//! without a live database.

pub mod app_users;
pub mod contacts;
pub mod events;
pub mod giving;
pub mod groups;
pub mod prayer;
pub mod sermons;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use app_users::AppUserRepository;
pub use contacts::ContactRepository;
pub use events::EventRepository;
pub use giving::GivingRepository;
pub use groups::GroupRepository;
pub use prayer::PrayerRequestRepository;
pub use sermons::SermonRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

impl RepositoryError {
    /// Map a sqlx error, converting unique violations into `Conflict`.
    pub(crate) fn from_insert(e: sqlx::Error, conflict_message: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = e
            && db_err.is_unique_violation()
        {
            return Self::Conflict(conflict_message.to_owned());
        }
        Self::Database(e)
    }
}

/// Create a `PostgreSQL` connection pool sized for the mobile workload.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(8)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Offset pagination for member-facing lists. Mobile screens page in
/// smaller chunks than the dashboard.
#[derive(Debug, Clone, Copy, serde::Deserialize)]
pub struct Page {
    /// Maximum rows to return.
    #[serde(default = "Page::default_limit")]
    pub limit: i64,
    /// Rows to skip.
    #[serde(default)]
    pub offset: i64,
}

impl Page {
    const MAX_LIMIT: i64 = 100;

    const fn default_limit() -> i64 {
        25
    }

    /// Clamp to sane bounds.
    #[must_use]
    pub const fn clamped(self) -> Self {
        let limit = if self.limit < 1 {
            1
        } else if self.limit > Self::MAX_LIMIT {
            Self::MAX_LIMIT
        } else {
            self.limit
        };
        let offset = if self.offset < 0 { 0 } else { self.offset };
        Self { limit, offset }
    }
}

impl Default for Page {
    fn default() -> Self {
        Self {
            limit: Self::default_limit(),
            offset: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Page;

    #[test]
    fn page_clamps_out_of_range_values() {
        let page = Page {
            limit: 500,
            offset: -1,
        }
        .clamped();
        assert_eq!(page.limit, 100);
        assert_eq!(page.offset, 0);
    }
}
