//! Database operations for the Wayside `PostgreSQL` database.
//!
//! # Tables
//!
//! - `contacts` - Person records, the universal foreign key target
//! - `mobile_app_users` - Links auth identities to contacts
//! - `members` - Formal church membership status per contact
//! - `groups` / `group_memberships` - Small groups and join requests
//! - `discipleship_groups` / `discipleship_memberships` - Mentoring groups
//! - `events` / `registrations` / `attendance` - Calendar, sign-ups, check-ins
//! - `prayer_requests` - Member-submitted prayer requests
//! - `transactions` - Donations and giving history
//! - `sermons` - Published sermon catalog
//! - `transport_requests` / `drivers` - Event ride coordination
//! - `admin_users` - Dashboard staff accounts
//! - `session` - Tower-sessions storage
//! - `settings` - Application settings (JSONB)
//!
//! # Migrations
//!
//! Migrations are stored in `crates/admin/migrations/` and run via:
//! ```bash
//! cargo run -p wayside-cli -- migrate
//! ```
//!
//! All queries here are runtime-checked (`sqlx::query_as`) rather than
//! compile-time macros, so the workspace builds without a live database.

pub mod admin_users;
pub mod app_users;
pub mod contacts;
pub mod events;
pub mod groups;
pub mod members;
pub mod prayer;
pub mod sermons;
pub mod settings;
pub mod transactions;
pub mod transport;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use admin_users::AdminUserRepository;
pub use app_users::AppUserRepository;
pub use contacts::ContactRepository;
pub use events::EventRepository;
pub use groups::GroupRepository;
pub use members::MemberRepository;
pub use prayer::PrayerRequestRepository;
pub use sermons::SermonRepository;
pub use settings::SettingsRepository;
pub use transactions::TransactionRepository;
pub use transport::TransportRepository;

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

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Offset-based pagination parameters, passed through to `LIMIT`/`OFFSET`.
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
    const MAX_LIMIT: i64 = 200;

    const fn default_limit() -> i64 {
        50
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
            limit: 10_000,
            offset: -5,
        }
        .clamped();
        assert_eq!(page.limit, 200);
        assert_eq!(page.offset, 0);

        let page = Page {
            limit: 0,
            offset: 30,
        }
        .clamped();
        assert_eq!(page.limit, 1);
        assert_eq!(page.offset, 30);
    }
}
