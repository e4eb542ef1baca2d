//! Contact repository.
//!
//! Contacts are the universal foreign key target: registrations, attendance,
//! memberships, prayer requests, and transactions all hang off a contact ID.
//! Verification state for mobile signup also lives on the contact row (only
//! the SHA-256 hash of the emailed code is stored).

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;

use wayside_core::{ContactId, ContactSource, Email, VerificationCode};

use super::RepositoryError;

/// A person record.
#[derive(Debug, Clone, Serialize)]
pub struct Contact {
    pub id: ContactId,
    pub email: Option<Email>,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub source: ContactSource,
    pub email_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Verification state stored on a contact row.
#[derive(Debug, Clone)]
pub struct ContactVerification {
    pub token_hash: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub email_verified: bool,
}

/// New contact fields for staff entry or mobile provisioning.
#[derive(Debug, Clone)]
pub struct NewContact {
    pub email: Option<Email>,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub source: ContactSource,
}

#[derive(sqlx::FromRow)]
struct ContactRow {
    id: ContactId,
    email: Option<Email>,
    first_name: String,
    last_name: String,
    phone: Option<String>,
    source: String,
    email_verified: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ContactRow> for Contact {
    type Error = RepositoryError;

    fn try_from(row: ContactRow) -> Result<Self, Self::Error> {
        let source = row.source.parse::<ContactSource>().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid contact source in database: {e}"))
        })?;
        Ok(Self {
            id: row.id,
            email: row.email,
            first_name: row.first_name,
            last_name: row.last_name,
            phone: row.phone,
            source,
            email_verified: row.email_verified,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const CONTACT_COLUMNS: &str = "id, email, first_name, last_name, phone, source, \
                               email_verified, created_at, updated_at";

/// Repository for contact database operations.
pub struct ContactRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ContactRepository<'a> {
    /// Create a new contact repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a contact by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ContactId) -> Result<Option<Contact>, RepositoryError> {
        let row = sqlx::query_as::<_, ContactRow>(&format!(
            "SELECT {CONTACT_COLUMNS} FROM contacts WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(Contact::try_from).transpose()
    }

    /// Get a contact by email address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<Contact>, RepositoryError> {
        let row = sqlx::query_as::<_, ContactRow>(&format!(
            "SELECT {CONTACT_COLUMNS} FROM contacts WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(self.pool)
        .await?;

        row.map(Contact::try_from).transpose()
    }

    /// List contacts with offset pagination and an optional name/email search.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        page: super::Page,
        search: Option<&str>,
    ) -> Result<Vec<Contact>, RepositoryError> {
        let page = page.clamped();
        let pattern = search.map(|s| format!("%{s}%"));

        let rows = sqlx::query_as::<_, ContactRow>(&format!(
            "SELECT {CONTACT_COLUMNS} FROM contacts
             WHERE $1::text IS NULL
                OR first_name ILIKE $1 OR last_name ILIKE $1 OR email ILIKE $1
             ORDER BY last_name, first_name
             LIMIT $2 OFFSET $3"
        ))
        .bind(pattern)
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Contact::try_from).collect()
    }

    /// Create a new contact.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    pub async fn create(&self, new: &NewContact) -> Result<Contact, RepositoryError> {
        let row = sqlx::query_as::<_, ContactRow>(&format!(
            "INSERT INTO contacts (id, email, first_name, last_name, phone, source)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {CONTACT_COLUMNS}"
        ))
        .bind(ContactId::generate())
        .bind(new.email.as_ref())
        .bind(&new.first_name)
        .bind(&new.last_name)
        .bind(new.phone.as_deref())
        .bind(new.source.as_str())
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            RepositoryError::from_insert(
                e,
                "This email address is already registered. Please use a different email.",
            )
        })?;

        Contact::try_from(row)
    }

    /// Find a contact by email, creating one if absent.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn find_or_create_by_email(
        &self,
        email: &Email,
        first_name: &str,
        last_name: &str,
        source: ContactSource,
    ) -> Result<Contact, RepositoryError> {
        if let Some(existing) = self.get_by_email(email).await? {
            return Ok(existing);
        }

        match self
            .create(&NewContact {
                email: Some(email.clone()),
                first_name: first_name.to_owned(),
                last_name: last_name.to_owned(),
                phone: None,
                source,
            })
            .await
        {
            Ok(contact) => Ok(contact),
            // Lost a create race: the row exists now, fetch it.
            Err(RepositoryError::Conflict(_)) => self
                .get_by_email(email)
                .await?
                .ok_or(RepositoryError::NotFound),
            Err(other) => Err(other),
        }
    }

    /// Update the mutable profile fields of a contact.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the contact does not exist.
    pub async fn update_profile(
        &self,
        id: ContactId,
        first_name: &str,
        last_name: &str,
        phone: Option<&str>,
    ) -> Result<Contact, RepositoryError> {
        let row = sqlx::query_as::<_, ContactRow>(&format!(
            "UPDATE contacts
             SET first_name = $2, last_name = $3, phone = $4, updated_at = NOW()
             WHERE id = $1
             RETURNING {CONTACT_COLUMNS}"
        ))
        .bind(id)
        .bind(first_name)
        .bind(last_name)
        .bind(phone)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Contact::try_from(row)
    }

    /// Delete a contact. Admin-only; mobile flows never delete contacts.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: ContactId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM contacts WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    // Email verification state
    // =========================================================================

    /// Store a freshly issued verification code hash on the contact row.
    ///
    /// Reissuing (resend) overwrites any prior code.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the contact does not exist.
    pub async fn store_verification(
        &self,
        id: ContactId,
        code: &VerificationCode,
        expires_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE contacts
             SET email_verification_token = $2,
                 email_verification_expires = $3,
                 email_verification_sent_at = NOW(),
                 email_verified = FALSE,
                 updated_at = NOW()
             WHERE id = $1",
        )
        .bind(id)
        .bind(code.hash())
        .bind(expires_at)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Load the stored verification state for a contact.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the contact does not exist.
    pub async fn get_verification(
        &self,
        id: ContactId,
    ) -> Result<ContactVerification, RepositoryError> {
        let row = sqlx::query_as::<_, (Option<String>, Option<DateTime<Utc>>, bool)>(
            "SELECT email_verification_token, email_verification_expires, email_verified
             FROM contacts WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Ok(ContactVerification {
            token_hash: row.0,
            expires_at: row.1,
            email_verified: row.2,
        })
    }

    /// Mark a contact verified and consume the stored code.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the contact does not exist.
    pub async fn mark_verified(&self, id: ContactId) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE contacts
             SET email_verified = TRUE,
                 email_verification_token = NULL,
                 email_verification_expires = NULL,
                 updated_at = NOW()
             WHERE id = $1",
        )
        .bind(id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
