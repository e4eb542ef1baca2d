//! Staff account management for the admin dashboard.

use argon2::password_hash::SaltString;
use argon2::password_hash::rand_core::OsRng;
use argon2::{Argon2, PasswordHasher};
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;
use wayside_core::Email;

#[derive(Debug, Error)]
pub enum AdminError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Invalid email address: {0}")]
    InvalidEmail(String),

    #[error("A staff account with email {0} already exists")]
    UserExists(String),

    #[error("Password hashing failed: {0}")]
    Hashing(String),
}

fn database_url() -> Result<String, AdminError> {
    std::env::var("ADMIN_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map_err(|_| AdminError::MissingEnvVar("ADMIN_DATABASE_URL or DATABASE_URL"))
}

fn hash_password(password: &str) -> Result<String, AdminError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AdminError::Hashing(e.to_string()))
}

/// Create a staff account for the admin dashboard.
///
/// When `password` is `None`, a random one is generated and printed
/// exactly once.
///
/// # Errors
///
/// Returns an error for an invalid email, a duplicate account, or a
/// database failure.
pub async fn create_user(email: &str, name: &str, password: Option<&str>) -> Result<(), AdminError> {
    dotenvy::dotenv().ok();

    let email = Email::parse(email).map_err(|e| AdminError::InvalidEmail(e.to_string()))?;

    let url = database_url()?;
    let pool = PgPool::connect(&url).await?;

    let exists: bool =
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM admin_users WHERE email = $1)")
            .bind(email.as_str())
            .fetch_one(&pool)
            .await?;
    if exists {
        return Err(AdminError::UserExists(email.as_str().to_owned()));
    }

    let generated = password.is_none();
    let password = match password {
        Some(p) => p.to_owned(),
        None => Uuid::new_v4().simple().to_string(),
    };
    let password_hash = hash_password(&password)?;

    sqlx::query(
        "INSERT INTO admin_users (id, email, display_name, password_hash) VALUES ($1, $2, $3, $4)",
    )
    .bind(Uuid::new_v4())
    .bind(email.as_str())
    .bind(name)
    .bind(&password_hash)
    .execute(&pool)
    .await?;

    println!("Created staff account for {}", email.as_str());
    if generated {
        println!("Generated password: {password}");
        println!("Store it now; it is not shown again.");
    }

    Ok(())
}
