//! Signup email verification.
//!
//! Issues 6-digit codes (stored as a SHA-256 hash on the contact row with
//! a 24 hour expiry) and checks submitted codes. A successful check
//! consumes the stored code; a resend overwrites it.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use thiserror::Error;

use wayside_core::{ContactId, ContactSource, Email, VerificationCode, verification_expiry};

use crate::db::contacts::{Contact, ContactRepository, ContactVerification};
use crate::db::RepositoryError;
use crate::services::email::{EmailError, EmailService};

/// Errors from the verification flow.
#[derive(Debug, Error)]
pub enum VerificationError {
    /// Underlying repository failure.
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// Code email could not be delivered.
    #[error(transparent)]
    Email(#[from] EmailError),

    /// Contact has no email address to deliver to.
    #[error("contact has no email address")]
    NoEmailAddress,
}

/// Result of checking a submitted code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeCheck {
    /// Code matches the latest issued one and is within its expiry.
    Valid,
    /// Wrong code, malformed code, or no code outstanding.
    Invalid,
    /// Code matched but the expiry has passed.
    Expired,
}

impl CodeCheck {
    /// Client-facing rejection text, `None` for a valid code.
    ///
    /// Invalid and expired codes read the same to the client; the
    /// distinction stays internal.
    #[must_use]
    pub const fn rejection_message(self) -> Option<&'static str> {
        match self {
            Self::Valid => None,
            Self::Invalid | Self::Expired => Some("Invalid verification code"),
        }
    }
}

/// An issued verification, as returned to the signup client.
#[derive(Debug, Clone)]
pub struct IssuedVerification {
    pub contact_id: ContactId,
    pub expires_at: DateTime<Utc>,
}

/// Verification service wiring contacts, code storage, and email delivery.
#[derive(Clone)]
pub struct VerificationService {
    pool: PgPool,
    email: EmailService,
}

impl VerificationService {
    /// Create a new service.
    #[must_use]
    pub const fn new(pool: PgPool, email: EmailService) -> Self {
        Self { pool, email }
    }

    /// Issue (or reissue) a code for a signup identified by email.
    ///
    /// Finds or creates the contact, stores the code hash, and emails the
    /// code. Reissuing overwrites any outstanding code.
    ///
    /// # Errors
    ///
    /// Returns `VerificationError` if any step fails.
    pub async fn issue_by_email(
        &self,
        email: &Email,
        first_name: &str,
        last_name: &str,
    ) -> Result<IssuedVerification, VerificationError> {
        let contacts = ContactRepository::new(&self.pool);
        let contact = contacts
            .find_or_create_by_email(email, first_name, last_name, ContactSource::MobileApp)
            .await?;

        self.issue_for_contact(&contact).await
    }

    /// Issue (or reissue) a code for an existing contact.
    ///
    /// # Errors
    ///
    /// Returns `VerificationError::NoEmailAddress` if the contact has no
    /// email on file.
    pub async fn issue_by_contact_id(
        &self,
        contact_id: ContactId,
    ) -> Result<IssuedVerification, VerificationError> {
        let contacts = ContactRepository::new(&self.pool);
        let contact = contacts
            .get(contact_id)
            .await?
            .ok_or(RepositoryError::NotFound)?;

        self.issue_for_contact(&contact).await
    }

    async fn issue_for_contact(
        &self,
        contact: &Contact,
    ) -> Result<IssuedVerification, VerificationError> {
        let email = contact
            .email
            .as_ref()
            .ok_or(VerificationError::NoEmailAddress)?;

        let code = VerificationCode::generate();
        let expires_at = verification_expiry(Utc::now());

        let contacts = ContactRepository::new(&self.pool);
        contacts
            .store_verification(contact.id, &code, expires_at)
            .await?;

        self.email
            .send_verification_code(email.as_str(), code.as_str())
            .await?;

        tracing::info!(contact_id = %contact.id, "Verification code issued");

        Ok(IssuedVerification {
            contact_id: contact.id,
            expires_at,
        })
    }

    /// Check a submitted code; on success mark the contact verified and
    /// consume the code.
    ///
    /// # Errors
    ///
    /// Returns `VerificationError::Repository` if the contact does not
    /// exist or a query fails.
    pub async fn verify(
        &self,
        contact_id: ContactId,
        submitted: &str,
    ) -> Result<CodeCheck, VerificationError> {
        let contacts = ContactRepository::new(&self.pool);
        let stored = contacts.get_verification(contact_id).await?;

        let outcome = check_code(&stored, submitted, Utc::now());
        if outcome == CodeCheck::Valid {
            contacts.mark_verified(contact_id).await?;
            tracing::info!(contact_id = %contact_id, "Email verified");
        }
        Ok(outcome)
    }
}

/// Compare a submitted code against the stored verification state.
fn check_code(stored: &ContactVerification, submitted: &str, now: DateTime<Utc>) -> CodeCheck {
    let Ok(code) = VerificationCode::parse(submitted) else {
        return CodeCheck::Invalid;
    };
    let Some(hash) = stored.token_hash.as_deref() else {
        return CodeCheck::Invalid;
    };
    if !code.matches_hash(hash) {
        return CodeCheck::Invalid;
    }
    match stored.expires_at {
        Some(expires_at) if now <= expires_at => CodeCheck::Valid,
        _ => CodeCheck::Expired,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn stored(code: &VerificationCode, expires_in: Duration) -> ContactVerification {
        ContactVerification {
            token_hash: Some(code.hash()),
            expires_at: Some(Utc::now() + expires_in),
            email_verified: false,
        }
    }

    #[test]
    fn matching_code_within_expiry_is_valid() {
        let code = VerificationCode::generate();
        let state = stored(&code, Duration::hours(1));
        assert_eq!(check_code(&state, code.as_str(), Utc::now()), CodeCheck::Valid);
    }

    #[test]
    fn wrong_code_is_invalid() {
        let code = VerificationCode::parse("123456").unwrap();
        let state = stored(&code, Duration::hours(1));
        assert_eq!(
            check_code(&state, "654321", Utc::now()),
            CodeCheck::Invalid
        );
    }

    #[test]
    fn malformed_code_is_invalid() {
        let code = VerificationCode::generate();
        let state = stored(&code, Duration::hours(1));
        assert_eq!(check_code(&state, "12 456", Utc::now()), CodeCheck::Invalid);
        assert_eq!(check_code(&state, "", Utc::now()), CodeCheck::Invalid);
    }

    #[test]
    fn expired_code_is_reported_as_expired() {
        let code = VerificationCode::generate();
        let state = stored(&code, Duration::hours(-1));
        assert_eq!(
            check_code(&state, code.as_str(), Utc::now()),
            CodeCheck::Expired
        );
    }

    #[test]
    fn expired_and_wrong_codes_read_the_same_to_clients() {
        assert_eq!(
            CodeCheck::Expired.rejection_message(),
            Some("Invalid verification code")
        );
        assert_eq!(
            CodeCheck::Invalid.rejection_message(),
            Some("Invalid verification code")
        );
        assert_eq!(CodeCheck::Valid.rejection_message(), None);
    }

    #[test]
    fn consumed_code_is_invalid() {
        // After mark_verified the token is NULLed; any submission fails.
        let state = ContactVerification {
            token_hash: None,
            expires_at: None,
            email_verified: true,
        };
        assert_eq!(check_code(&state, "123456", Utc::now()), CodeCheck::Invalid);
    }
}
