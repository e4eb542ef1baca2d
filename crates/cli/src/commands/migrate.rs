//! Database migration runner.
//!
//! Migrations live in the admin crate; both backends share the one
//! database, so a single `migrate` run brings everything up to date.

use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

fn database_url() -> Result<String, MigrationError> {
    std::env::var("ADMIN_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map_err(|_| MigrationError::MissingEnvVar("ADMIN_DATABASE_URL or DATABASE_URL"))
}

/// Run all pending migrations against the shared database.
///
/// # Errors
///
/// Returns an error when the database URL is missing, the connection
/// fails, or a migration fails to apply.
pub async fn run() -> Result<(), MigrationError> {
    dotenvy::dotenv().ok();

    let url = database_url()?;

    tracing::info!("Connecting to database");
    let pool = PgPoolOptions::new().max_connections(2).connect(&url).await?;

    tracing::info!("Running migrations");
    sqlx::migrate!("../admin/migrations").run(&pool).await?;

    tracing::info!("Migrations complete");
    Ok(())
}
