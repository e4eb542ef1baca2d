//! The multi-stage signup flow.
//!
//! The app walks three stages: details entry, email verification, and
//! success. Client-side validation failures keep the user on the details
//! stage; a wrong code keeps the verification stage (and the provisional
//! contact) intact; resending a code never resets the flow.
//!
//! Completion is two distinct operations with distinct failures: account
//! creation (nothing exists yet, the user can retry) and the sign-in that
//! follows it (the account now exists, so the user is told to sign in
//! manually rather than retry the signup).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use wayside_core::{ContactId, Email, EmailError, IdentityId};

use super::admin_api::{AdminApiClient, AdminApiError, VerificationIssued};
use super::auth::AuthSession;
use super::session::{DirectGrant, FallbackGrant, SessionError, SessionService};

const MIN_PASSWORD_LENGTH: usize = 6;

/// What the user types on the details screen.
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupDetails {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub password_confirmation: String,
}

/// Client-side validation failures. These never leave the details stage.
#[derive(Debug, Clone, Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("invalid email address: {0}")]
    InvalidEmail(#[from] EmailError),

    #[error("passwords do not match")]
    PasswordMismatch,

    #[error("password must be at least {MIN_PASSWORD_LENGTH} characters")]
    PasswordTooShort,
}

impl SignupDetails {
    /// Validate the details and normalize the email.
    ///
    /// # Errors
    ///
    /// Returns the first failed check, in field order.
    pub fn validate(&self) -> Result<Email, ValidationError> {
        if self.first_name.trim().is_empty() {
            return Err(ValidationError::MissingField("firstName"));
        }
        if self.last_name.trim().is_empty() {
            return Err(ValidationError::MissingField("lastName"));
        }
        let email = Email::parse(&self.email)?;
        if self.password.len() < MIN_PASSWORD_LENGTH {
            return Err(ValidationError::PasswordTooShort);
        }
        if self.password != self.password_confirmation {
            return Err(ValidationError::PasswordMismatch);
        }
        Ok(email)
    }
}

/// The stage payloads the app renders.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase", tag = "stage")]
pub enum SignupStage {
    /// Details entry (initial, or after a validation failure).
    Details,
    /// Waiting for the emailed code.
    #[serde(rename_all = "camelCase")]
    Verification {
        contact_id: ContactId,
        expires_at: DateTime<Utc>,
    },
    /// Account created and signed in.
    Success { session: AuthSession },
}

/// Errors from the signup flow.
#[derive(Debug, Error)]
pub enum SignupError {
    /// Details failed validation; the flow stays on the details stage.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Issuing or reissuing the verification code failed.
    #[error("could not send verification code: {0}")]
    Verification(#[source] AdminApiError),

    /// The submitted code was wrong or expired; the verification stage
    /// (and the provisional contact) is kept.
    #[error("{message}")]
    InvalidCode { message: String },

    /// Account creation was refused. Nothing was created; retry is safe.
    #[error("could not create account: {message}")]
    AccountCreation { message: String },

    /// The account exists but the sign-in after creation failed. The user
    /// should sign in manually instead of retrying the signup.
    #[error("account created, but sign-in failed: {0}")]
    PostCreationSignIn(#[source] SessionError),
}

/// Privileged operations the signup flow needs from the admin backend.
#[async_trait]
pub trait SignupBackend: Send + Sync {
    async fn send_verification(
        &self,
        email: &str,
        first_name: &str,
        last_name: &str,
    ) -> Result<VerificationIssued, AdminApiError>;

    async fn resend_verification(
        &self,
        contact_id: ContactId,
    ) -> Result<VerificationIssued, AdminApiError>;

    async fn verify_email(&self, contact_id: ContactId, code: &str) -> Result<(), AdminApiError>;

    async fn create_user(
        &self,
        email: &str,
        password: &str,
        contact_id: ContactId,
        first_name: &str,
        last_name: &str,
    ) -> Result<IdentityId, AdminApiError>;
}

#[async_trait]
impl SignupBackend for AdminApiClient {
    async fn send_verification(
        &self,
        email: &str,
        first_name: &str,
        last_name: &str,
    ) -> Result<VerificationIssued, AdminApiError> {
        Self::send_verification(self, email, first_name, last_name).await
    }

    async fn resend_verification(
        &self,
        contact_id: ContactId,
    ) -> Result<VerificationIssued, AdminApiError> {
        Self::resend_verification(self, contact_id).await
    }

    async fn verify_email(&self, contact_id: ContactId, code: &str) -> Result<(), AdminApiError> {
        Self::verify_email(self, contact_id, code).await
    }

    async fn create_user(
        &self,
        email: &str,
        password: &str,
        contact_id: ContactId,
        first_name: &str,
        last_name: &str,
    ) -> Result<IdentityId, AdminApiError> {
        Self::create_user(self, email, password, contact_id, first_name, last_name).await
    }
}

/// Drives the signup stages against the admin backend.
pub struct SignupService<B, D, F> {
    backend: B,
    sessions: SessionService<D, F>,
}

impl<B, D, F> SignupService<B, D, F>
where
    B: SignupBackend,
    D: DirectGrant,
    F: FallbackGrant,
{
    /// Create the service.
    pub const fn new(backend: B, sessions: SessionService<D, F>) -> Self {
        Self { backend, sessions }
    }

    /// Details stage: validate and issue the verification code.
    ///
    /// On success the flow advances to the verification stage.
    ///
    /// # Errors
    ///
    /// Returns `SignupError::Validation` without touching the backend if
    /// the details are invalid.
    pub async fn start(&self, details: &SignupDetails) -> Result<SignupStage, SignupError> {
        let email = details.validate()?;

        let issued = self
            .backend
            .send_verification(email.as_str(), &details.first_name, &details.last_name)
            .await
            .map_err(SignupError::Verification)?;

        Ok(SignupStage::Verification {
            contact_id: issued.contact_id,
            expires_at: issued.expires_at,
        })
    }

    /// Reissue the code for a signup already on the verification stage.
    ///
    /// The stage is unchanged apart from the new expiry.
    ///
    /// # Errors
    ///
    /// Returns `SignupError::Verification` if reissuing fails.
    pub async fn resend(&self, contact_id: ContactId) -> Result<SignupStage, SignupError> {
        let issued = self
            .backend
            .resend_verification(contact_id)
            .await
            .map_err(SignupError::Verification)?;

        Ok(SignupStage::Verification {
            contact_id: issued.contact_id,
            expires_at: issued.expires_at,
        })
    }

    /// Verification stage: check the code, create the account, sign in.
    ///
    /// # Errors
    ///
    /// Returns `SignupError::InvalidCode` on a wrong or expired code,
    /// `SignupError::AccountCreation` if the account could not be made,
    /// and `SignupError::PostCreationSignIn` if the account was made but
    /// the first sign-in failed.
    pub async fn complete(
        &self,
        contact_id: ContactId,
        code: &str,
        details: &SignupDetails,
    ) -> Result<SignupStage, SignupError> {
        let email = details.validate()?;

        self.backend
            .verify_email(contact_id, code)
            .await
            .map_err(|e| match e {
                AdminApiError::Rejected { message, .. } => SignupError::InvalidCode { message },
                other => SignupError::Verification(other),
            })?;

        self.backend
            .create_user(
                email.as_str(),
                &details.password,
                contact_id,
                &details.first_name,
                &details.last_name,
            )
            .await
            .map_err(|e| match e {
                AdminApiError::Rejected { message, .. } => SignupError::AccountCreation { message },
                other => SignupError::Verification(other),
            })?;

        let session = self
            .sessions
            .sign_in(email.as_str(), &details.password)
            .await
            .map_err(SignupError::PostCreationSignIn)?;

        Ok(SignupStage::Success { session })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use wayside_core::IdentityId;

    use super::super::auth::{AuthError, AuthUser};
    use super::*;

    fn details() -> SignupDetails {
        SignupDetails {
            first_name: "Ruth".into(),
            last_name: "Park".into(),
            email: "Ruth.Park@Example.com".into(),
            password: "hunter22".into(),
            password_confirmation: "hunter22".into(),
        }
    }

    #[test]
    fn validation_normalizes_email() {
        let email = details().validate().unwrap();
        assert_eq!(email.as_str(), "ruth.park@example.com");
    }

    #[test]
    fn validation_rejects_short_and_mismatched_passwords() {
        let mut d = details();
        d.password = "ab1".into();
        d.password_confirmation = "ab1".into();
        assert!(matches!(
            d.validate().unwrap_err(),
            ValidationError::PasswordTooShort
        ));

        let mut d = details();
        d.password_confirmation = "hunter23".into();
        assert!(matches!(
            d.validate().unwrap_err(),
            ValidationError::PasswordMismatch
        ));
    }

    #[test]
    fn validation_requires_names() {
        let mut d = details();
        d.first_name = "  ".into();
        assert!(matches!(
            d.validate().unwrap_err(),
            ValidationError::MissingField("firstName")
        ));
    }

    /// In-memory stand-in for the admin backend with togglable failures.
    struct BackendFake {
        contact_id: ContactId,
        code: &'static str,
        sent: Mutex<u32>,
        fail_create: bool,
    }

    impl BackendFake {
        fn new() -> Self {
            Self {
                contact_id: ContactId::generate(),
                code: "123456",
                sent: Mutex::new(0),
                fail_create: false,
            }
        }

        fn issued(&self) -> VerificationIssued {
            VerificationIssued {
                contact_id: self.contact_id,
                expires_at: Utc::now() + chrono::Duration::hours(24),
            }
        }
    }

    #[async_trait]
    impl SignupBackend for BackendFake {
        async fn send_verification(
            &self,
            _email: &str,
            _first_name: &str,
            _last_name: &str,
        ) -> Result<VerificationIssued, AdminApiError> {
            *self.sent.lock().unwrap() += 1;
            Ok(self.issued())
        }

        async fn resend_verification(
            &self,
            contact_id: ContactId,
        ) -> Result<VerificationIssued, AdminApiError> {
            assert_eq!(contact_id, self.contact_id);
            *self.sent.lock().unwrap() += 1;
            Ok(self.issued())
        }

        async fn verify_email(
            &self,
            _contact_id: ContactId,
            code: &str,
        ) -> Result<(), AdminApiError> {
            if code == self.code {
                Ok(())
            } else {
                Err(AdminApiError::Rejected {
                    status: reqwest::StatusCode::BAD_REQUEST,
                    message: "Invalid verification code".into(),
                })
            }
        }

        async fn create_user(
            &self,
            _email: &str,
            _password: &str,
            _contact_id: ContactId,
            _first_name: &str,
            _last_name: &str,
        ) -> Result<IdentityId, AdminApiError> {
            if self.fail_create {
                Err(AdminApiError::Rejected {
                    status: reqwest::StatusCode::BAD_GATEWAY,
                    message: "A user with this email address has already been registered".into(),
                })
            } else {
                Ok(IdentityId::generate())
            }
        }
    }

    struct GrantFake {
        fail: bool,
    }

    #[async_trait]
    impl DirectGrant for GrantFake {
        async fn sign_in(&self, email: &str, _password: &str) -> Result<AuthSession, AuthError> {
            if self.fail {
                return Err(AuthError::UnexpectedResponse("boom".into()));
            }
            Ok(AuthSession {
                access_token: "access".into(),
                refresh_token: "refresh".into(),
                expires_in: 3600,
                user: AuthUser {
                    id: IdentityId::generate(),
                    email: Some(email.to_owned()),
                },
            })
        }
    }

    struct NoFallback;

    #[async_trait]
    impl FallbackGrant for NoFallback {
        async fn sign_in(
            &self,
            _email: &str,
            _password: &str,
        ) -> Result<AuthSession, AdminApiError> {
            panic!("fallback grant should not run in these tests");
        }
    }

    fn service(
        backend: BackendFake,
        sign_in_fails: bool,
    ) -> SignupService<BackendFake, GrantFake, NoFallback> {
        SignupService::new(
            backend,
            SessionService::new(GrantFake { fail: sign_in_fails }, NoFallback),
        )
    }

    #[tokio::test]
    async fn invalid_details_never_reach_the_backend() {
        let svc = service(BackendFake::new(), false);
        let mut d = details();
        d.email = "not-an-email".into();

        let err = svc.start(&d).await.unwrap_err();
        assert!(matches!(err, SignupError::Validation(_)));
        assert_eq!(*svc.backend.sent.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn start_advances_to_verification() {
        let svc = service(BackendFake::new(), false);
        let stage = svc.start(&details()).await.unwrap();
        assert!(matches!(stage, SignupStage::Verification { .. }));
    }

    #[tokio::test]
    async fn wrong_code_keeps_the_contact() {
        let svc = service(BackendFake::new(), false);
        let contact_id = svc.backend.contact_id;

        let err = svc
            .complete(contact_id, "000000", &details())
            .await
            .unwrap_err();
        assert!(matches!(err, SignupError::InvalidCode { .. }));

        // Resend still works for the same contact, so the flow can go on.
        let stage = svc.resend(contact_id).await.unwrap();
        match stage {
            SignupStage::Verification { contact_id: id, .. } => assert_eq!(id, contact_id),
            other => panic!("unexpected stage: {other:?}"),
        }
    }

    #[tokio::test]
    async fn happy_path_ends_in_success() {
        let svc = service(BackendFake::new(), false);
        let contact_id = svc.backend.contact_id;
        let stage = svc.complete(contact_id, "123456", &details()).await.unwrap();
        assert!(matches!(stage, SignupStage::Success { .. }));
    }

    #[tokio::test]
    async fn creation_failure_is_distinct_from_sign_in_failure() {
        let mut backend = BackendFake::new();
        backend.fail_create = true;
        let contact_id = backend.contact_id;
        let svc = service(backend, false);
        let err = svc
            .complete(contact_id, "123456", &details())
            .await
            .unwrap_err();
        assert!(matches!(err, SignupError::AccountCreation { .. }));

        let backend = BackendFake::new();
        let contact_id = backend.contact_id;
        let svc = service(backend, true);
        let err = svc
            .complete(contact_id, "123456", &details())
            .await
            .unwrap_err();
        assert!(matches!(err, SignupError::PostCreationSignIn(_)));
    }
}
