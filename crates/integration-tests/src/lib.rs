//! Integration tests for Wayside.
//!
//! # Running Tests
//!
//! ```bash
//! # Start the database and apply migrations
//! cargo run -p wayside-cli -- migrate
//!
//! # Start both servers
//! cargo run -p wayside-admin
//! cargo run -p wayside-mobile
//!
//! # Run the ignored integration tests
//! cargo test -p wayside-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `admin_*` - Admin dashboard API tests (port 3001)
//! - `mobile_*` - Mobile companion API tests (port 3002)
//!
//! All tests are `#[ignore]`d by default because they need running
//! servers; base URLs are configurable via `ADMIN_BASE_URL`,
//! `MOBILE_BASE_URL`, and `DATABASE_URL`.

use reqwest::Client;
use sqlx::PgPool;
use uuid::Uuid;
use wayside_core::Email;

/// Base URL for the admin API.
#[must_use]
pub fn admin_base_url() -> String {
    std::env::var("ADMIN_BASE_URL").unwrap_or_else(|_| "http://localhost:3001".to_string())
}

/// Base URL for the mobile API.
#[must_use]
pub fn mobile_base_url() -> String {
    std::env::var("MOBILE_BASE_URL").unwrap_or_else(|_| "http://localhost:3002".to_string())
}

/// HTTP client with a cookie store, for the session-based admin API.
///
/// # Panics
///
/// Panics if the client cannot be constructed.
#[must_use]
pub fn client() -> Client {
    Client::builder()
        .cookie_store(true)
        .build()
        .expect("Failed to create HTTP client")
}

/// A unique throwaway email for one test run, normalized the same way
/// the servers normalize it.
///
/// # Panics
///
/// Panics if the generated address fails validation.
#[must_use]
pub fn unique_email() -> String {
    Email::parse(&format!("integration-test-{}@example.com", Uuid::new_v4()))
        .expect("Generated email must be valid")
        .into_inner()
}

/// Direct database handle for row-level assertions and cleanup.
///
/// # Panics
///
/// Panics when `DATABASE_URL` is unset or unreachable.
pub async fn test_pool() -> PgPool {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    PgPool::connect(&url)
        .await
        .expect("Failed to connect to test database")
}
