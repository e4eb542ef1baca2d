//! Dashboard staff account repository.
//!
//! Dashboard accounts are separate from mobile auth identities. Passwords
//! are hashed with Argon2id; hashing runs on a blocking thread because it
//! is deliberately slow.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;

use wayside_core::{AdminUserId, Email};

use super::RepositoryError;

/// A dashboard staff account.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct AdminUser {
    pub id: AdminUserId,
    pub email: Email,
    pub display_name: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Repository for dashboard staff accounts.
pub struct AdminUserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AdminUserRepository<'a> {
    /// Create a new repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get an account by email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<AdminUser>, RepositoryError> {
        let user = sqlx::query_as::<_, AdminUser>(
            "SELECT id, email, display_name, password_hash, created_at
             FROM admin_users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(self.pool)
        .await?;
        Ok(user)
    }

    /// Create a staff account with a freshly hashed password.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already has an
    /// account.
    pub async fn create(
        &self,
        email: &Email,
        display_name: &str,
        password: &str,
    ) -> Result<AdminUser, RepositoryError> {
        let password_hash = hash_password(password)?;

        let user = sqlx::query_as::<_, AdminUser>(
            "INSERT INTO admin_users (id, email, display_name, password_hash)
             VALUES ($1, $2, $3, $4)
             RETURNING id, email, display_name, password_hash, created_at",
        )
        .bind(AdminUserId::generate())
        .bind(email)
        .bind(display_name)
        .bind(password_hash)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            RepositoryError::from_insert(e, "An account with this email already exists.")
        })?;

        Ok(user)
    }

    /// Verify a login attempt. Returns the account on success, `None` on a
    /// wrong password or unknown email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the lookup fails.
    pub async fn verify_login(
        &self,
        email: &Email,
        password: &str,
    ) -> Result<Option<AdminUser>, RepositoryError> {
        let Some(user) = self.get_by_email(email).await? else {
            return Ok(None);
        };

        let hash = user.password_hash.clone();
        let password = password.to_owned();
        let verified = tokio::task::spawn_blocking(move || {
            PasswordHash::new(&hash)
                .map(|parsed| {
                    Argon2::default()
                        .verify_password(password.as_bytes(), &parsed)
                        .is_ok()
                })
                .unwrap_or(false)
        })
        .await
        .map_err(|e| RepositoryError::DataCorruption(format!("hash verification task: {e}")))?;

        Ok(verified.then_some(user))
    }
}

fn hash_password(password: &str) -> Result<String, RepositoryError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| RepositoryError::DataCorruption(format!("password hashing failed: {e}")))
}

#[cfg(test)]
mod tests {
    use super::hash_password;
    use argon2::password_hash::{PasswordHash, PasswordVerifier};
    use argon2::Argon2;

    #[test]
    fn hashed_password_verifies() {
        let hash = hash_password("correct horse battery staple").unwrap();
        let parsed = PasswordHash::new(&hash).unwrap();
        assert!(
            Argon2::default()
                .verify_password(b"correct horse battery staple", &parsed)
                .is_ok()
        );
        assert!(
            Argon2::default()
                .verify_password(b"wrong password", &parsed)
                .is_err()
        );
    }
}
