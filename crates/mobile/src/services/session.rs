//! Member sign-in with the disabled-logins fallback.
//!
//! The happy path is a direct anon-key password grant. When the auth
//! subsystem reports `logins_disabled` (and only then) the grant is
//! retried through the admin backend, which signs in with service
//! credentials. Wrong credentials never trigger the fallback; retrying a
//! bad password against a second endpoint would only mask the error.

use async_trait::async_trait;
use thiserror::Error;

use super::admin_api::{AdminApiClient, AdminApiError};
use super::auth::{AuthClient, AuthError, AuthErrorCode, AuthSession};

/// Direct password grant against the auth subsystem.
#[async_trait]
pub trait DirectGrant: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AuthError>;
}

/// Privileged password grant through the admin backend.
#[async_trait]
pub trait FallbackGrant: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AdminApiError>;
}

#[async_trait]
impl DirectGrant for AuthClient {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        Self::sign_in(self, email, password).await
    }
}

#[async_trait]
impl FallbackGrant for AdminApiClient {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AdminApiError> {
        Self::sign_in(self, email, password).await
    }
}

/// Errors from member sign-in.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Wrong email or password, from either grant path.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// The direct grant failed for a reason other than disabled logins.
    #[error(transparent)]
    Auth(AuthError),

    /// The fallback grant failed.
    #[error(transparent)]
    Fallback(#[from] AdminApiError),
}

/// Member sign-in orchestration.
pub struct SessionService<D = AuthClient, F = AdminApiClient> {
    direct: D,
    fallback: F,
}

impl<D: DirectGrant, F: FallbackGrant> SessionService<D, F> {
    /// Create the service over a direct and a fallback grant.
    pub const fn new(direct: D, fallback: F) -> Self {
        Self { direct, fallback }
    }

    /// Sign a member in.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidCredentials` on a wrong password and
    /// `SessionError::Fallback` when the admin backend refuses the
    /// fallback grant.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, SessionError> {
        match self.direct.sign_in(email, password).await {
            Ok(session) => Ok(session),
            Err(AuthError::Rejected {
                code: AuthErrorCode::LoginsDisabled,
                ..
            }) => {
                tracing::debug!("Direct logins disabled, using privileged sign-in");
                Ok(self.fallback.sign_in(email, password).await?)
            }
            Err(AuthError::Rejected {
                code: AuthErrorCode::InvalidCredentials,
                ..
            }) => Err(SessionError::InvalidCredentials),
            Err(other) => Err(SessionError::Auth(other)),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use wayside_core::IdentityId;

    use super::super::auth::AuthUser;
    use super::*;

    fn session() -> AuthSession {
        AuthSession {
            access_token: "access".into(),
            refresh_token: "refresh".into(),
            expires_in: 3600,
            user: AuthUser {
                id: IdentityId::generate(),
                email: Some("member@example.com".into()),
            },
        }
    }

    struct DirectFake {
        calls: AtomicUsize,
        result: fn() -> Result<AuthSession, AuthError>,
    }

    #[async_trait]
    impl DirectGrant for DirectFake {
        async fn sign_in(&self, _email: &str, _password: &str) -> Result<AuthSession, AuthError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            (self.result)()
        }
    }

    struct FallbackFake {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl FallbackGrant for FallbackFake {
        async fn sign_in(
            &self,
            _email: &str,
            _password: &str,
        ) -> Result<AuthSession, AdminApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(session())
        }
    }

    fn service(result: fn() -> Result<AuthSession, AuthError>) -> SessionService<DirectFake, FallbackFake> {
        SessionService::new(
            DirectFake {
                calls: AtomicUsize::new(0),
                result,
            },
            FallbackFake {
                calls: AtomicUsize::new(0),
            },
        )
    }

    #[tokio::test]
    async fn direct_success_skips_fallback() {
        let svc = service(|| Ok(session()));
        svc.sign_in("member@example.com", "pw").await.unwrap();
        assert_eq!(svc.fallback.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn logins_disabled_uses_fallback() {
        let svc = service(|| {
            Err(AuthError::Rejected {
                code: AuthErrorCode::LoginsDisabled,
                message: "logins disabled".into(),
            })
        });
        svc.sign_in("member@example.com", "pw").await.unwrap();
        assert_eq!(svc.direct.calls.load(Ordering::SeqCst), 1);
        assert_eq!(svc.fallback.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn wrong_password_never_falls_back() {
        let svc = service(|| {
            Err(AuthError::Rejected {
                code: AuthErrorCode::InvalidCredentials,
                message: "invalid login credentials".into(),
            })
        });
        let err = svc.sign_in("member@example.com", "pw").await.unwrap_err();
        assert!(matches!(err, SessionError::InvalidCredentials));
        assert_eq!(svc.fallback.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unknown_rejection_never_falls_back() {
        let svc = service(|| {
            Err(AuthError::Rejected {
                code: AuthErrorCode::Unknown,
                message: "rate limited".into(),
            })
        });
        let err = svc.sign_in("member@example.com", "pw").await.unwrap_err();
        assert!(matches!(err, SessionError::Auth(_)));
        assert_eq!(svc.fallback.calls.load(Ordering::SeqCst), 0);
    }
}
