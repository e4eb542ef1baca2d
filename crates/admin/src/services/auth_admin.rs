//! Service-role client for the hosted auth subsystem.
//!
//! Public signups and logins are administratively disabled on the hosted
//! platform, so the admin binary performs both with the service-role key:
//! user creation via the admin endpoint and password grants on behalf of
//! the mobile backend.
//!
//! Failures from the subsystem carry a structured `error_code`; callers
//! branch on [`AuthErrorCode`], never on message text.

use reqwest::StatusCode;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

use wayside_core::{ContactId, IdentityId};

use crate::config::AuthSubsystemConfig;

/// Structured error codes returned by the auth subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthErrorCode {
    /// Public password logins are disabled.
    LoginsDisabled,
    /// Public signups are disabled.
    SignupsDisabled,
    /// Wrong email or password.
    InvalidCredentials,
    /// A user already exists for this email.
    EmailExists,
    /// Any code this client does not recognize.
    #[serde(other)]
    Unknown,
}

/// Errors from service-role auth calls.
#[derive(Debug, Error)]
pub enum AuthAdminError {
    /// The subsystem rejected the request with a structured code.
    #[error("auth subsystem rejected request ({code:?}): {message}")]
    Rejected {
        code: AuthErrorCode,
        message: String,
    },

    /// Transport-level failure.
    #[error("auth subsystem unreachable: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body did not match the expected shape.
    #[error("unexpected auth subsystem response: {0}")]
    UnexpectedResponse(String),
}

/// A session issued by the auth subsystem.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthSession {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: u64,
    pub user: AuthUser,
}

/// The user object embedded in auth responses.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthUser {
    pub id: IdentityId,
    pub email: Option<String>,
}

#[derive(Deserialize)]
struct AuthErrorBody {
    error_code: Option<AuthErrorCode>,
    #[serde(alias = "msg", alias = "message")]
    msg: Option<String>,
}

/// Service-role client for the hosted auth subsystem.
#[derive(Clone)]
pub struct AuthAdminClient {
    http: reqwest::Client,
    base_url: String,
    service_role_key: secrecy::SecretString,
}

impl AuthAdminClient {
    /// Build a client from configuration.
    #[must_use]
    pub fn new(http: reqwest::Client, config: &AuthSubsystemConfig) -> Self {
        Self {
            http,
            base_url: config.url.trim_end_matches('/').to_owned(),
            service_role_key: config.service_role_key.clone(),
        }
    }

    /// Create a confirmed user, bypassing disabled public signups.
    ///
    /// The contact link travels in `user_metadata.contact_id` so the mobile
    /// backend can resolve the contact on first sign-in.
    ///
    /// # Errors
    ///
    /// Returns `AuthAdminError::Rejected` with `EmailExists` if a user
    /// already exists for the email.
    pub async fn create_user(
        &self,
        email: &str,
        password: &str,
        contact_id: ContactId,
        first_name: &str,
        last_name: &str,
    ) -> Result<AuthUser, AuthAdminError> {
        let body = json!({
            "email": email,
            "password": password,
            "email_confirm": true,
            "user_metadata": {
                "contact_id": contact_id,
                "first_name": first_name,
                "last_name": last_name,
            },
        });

        let response = self
            .http
            .post(format!("{}/admin/users", self.base_url))
            .bearer_auth(self.service_role_key.expose_secret())
            .header("apikey", self.service_role_key.expose_secret())
            .json(&body)
            .send()
            .await?;

        Self::parse(response).await
    }

    /// Password grant on behalf of a user, using service credentials.
    ///
    /// Works while public logins are disabled; this is the fallback target
    /// for the mobile backend's sign-in.
    ///
    /// # Errors
    ///
    /// Returns `AuthAdminError::Rejected` with `InvalidCredentials` on a
    /// wrong password.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AuthAdminError> {
        let response = self
            .http
            .post(format!("{}/token?grant_type=password", self.base_url))
            .header("apikey", self.service_role_key.expose_secret())
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;

        Self::parse(response).await
    }

    async fn parse<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, AuthAdminError> {
        let status = response.status();
        let text = response.text().await?;

        if status.is_success() {
            return serde_json::from_str(&text)
                .map_err(|e| AuthAdminError::UnexpectedResponse(e.to_string()));
        }

        let body: AuthErrorBody = serde_json::from_str(&text).unwrap_or(AuthErrorBody {
            error_code: None,
            msg: None,
        });

        Err(AuthAdminError::Rejected {
            code: body.error_code.unwrap_or(AuthErrorCode::Unknown),
            message: body
                .msg
                .unwrap_or_else(|| default_message(status).to_owned()),
        })
    }
}

const fn default_message(status: StatusCode) -> &'static str {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => "Authentication failed",
        StatusCode::UNPROCESSABLE_ENTITY | StatusCode::BAD_REQUEST => "Invalid request",
        _ => "Auth subsystem error",
    }
}

#[cfg(test)]
mod tests {
    use super::AuthErrorCode;

    #[test]
    fn known_error_codes_deserialize() {
        let code: AuthErrorCode = serde_json::from_str("\"logins_disabled\"").unwrap();
        assert_eq!(code, AuthErrorCode::LoginsDisabled);

        let code: AuthErrorCode = serde_json::from_str("\"invalid_credentials\"").unwrap();
        assert_eq!(code, AuthErrorCode::InvalidCredentials);
    }

    #[test]
    fn unrecognized_error_codes_fall_back_to_unknown() {
        let code: AuthErrorCode = serde_json::from_str("\"mfa_challenge_expired\"").unwrap();
        assert_eq!(code, AuthErrorCode::Unknown);
    }
}
