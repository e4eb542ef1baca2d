//! Anon-key client for the hosted auth subsystem.
//!
//! This binary holds only the public anon key. Password grants work with
//! it under normal operation; when the platform has logins administratively
//! disabled the grant fails with a structured `logins_disabled` code, and
//! [`super::session::SessionService`] falls back to the admin backend.
//!
//! Callers branch on [`AuthErrorCode`], never on message text.

use reqwest::StatusCode;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

use wayside_core::IdentityId;

use crate::config::AuthClientConfig;

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
    /// The access or refresh token is invalid or expired.
    BadJwt,
    /// Any code this client does not recognize.
    #[serde(other)]
    Unknown,
}

/// Errors from anon-key auth calls.
#[derive(Debug, Error)]
pub enum AuthError {
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

/// Anon-key client for the hosted auth subsystem.
#[derive(Clone)]
pub struct AuthClient {
    http: reqwest::Client,
    base_url: String,
    anon_key: secrecy::SecretString,
}

impl AuthClient {
    /// Build a client from configuration.
    #[must_use]
    pub fn new(http: reqwest::Client, config: &AuthClientConfig) -> Self {
        Self {
            http,
            base_url: config.url.trim_end_matches('/').to_owned(),
            anon_key: config.anon_key.clone(),
        }
    }

    /// Direct password grant with the anon key.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Rejected` with `LoginsDisabled` while public
    /// logins are turned off, and `InvalidCredentials` on a wrong password.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        let response = self
            .http
            .post(format!("{}/token?grant_type=password", self.base_url))
            .header("apikey", self.anon_key.expose_secret())
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;

        Self::parse(response).await
    }

    /// Exchange a refresh token for a fresh session.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Rejected` with `BadJwt` on a stale token.
    pub async fn refresh(&self, refresh_token: &str) -> Result<AuthSession, AuthError> {
        let response = self
            .http
            .post(format!("{}/token?grant_type=refresh_token", self.base_url))
            .header("apikey", self.anon_key.expose_secret())
            .json(&json!({ "refresh_token": refresh_token }))
            .send()
            .await?;

        Self::parse(response).await
    }

    /// Resolve the identity behind a bearer access token.
    ///
    /// Used by the request extractor to authenticate every member call.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Rejected` with `BadJwt` on an invalid token.
    pub async fn get_user(&self, access_token: &str) -> Result<AuthUser, AuthError> {
        let response = self
            .http
            .get(format!("{}/user", self.base_url))
            .header("apikey", self.anon_key.expose_secret())
            .bearer_auth(access_token)
            .send()
            .await?;

        Self::parse(response).await
    }

    async fn parse<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, AuthError> {
        let status = response.status();
        let text = response.text().await?;

        if status.is_success() {
            return serde_json::from_str(&text)
                .map_err(|e| AuthError::UnexpectedResponse(e.to_string()));
        }

        let body: AuthErrorBody = serde_json::from_str(&text).unwrap_or(AuthErrorBody {
            error_code: None,
            msg: None,
        });

        Err(AuthError::Rejected {
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
#[allow(clippy::unwrap_used)]
mod tests {
    use super::AuthErrorCode;

    #[test]
    fn logins_disabled_code_deserializes() {
        let code: AuthErrorCode = serde_json::from_str("\"logins_disabled\"").unwrap();
        assert_eq!(code, AuthErrorCode::LoginsDisabled);
    }

    #[test]
    fn unrecognized_error_codes_fall_back_to_unknown() {
        let code: AuthErrorCode = serde_json::from_str("\"otp_expired\"").unwrap();
        assert_eq!(code, AuthErrorCode::Unknown);
    }
}
