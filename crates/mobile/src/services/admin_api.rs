//! Client for the admin backend's privileged API.
//!
//! The admin backend holds the service-role key; this binary does not.
//! Verification issuance, account creation, the sign-in fallback, and
//! payment intents all go through these endpoints, which answer with the
//! `{ success, data? | error? }` envelope.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

use wayside_core::{ContactId, IdentityId};

use super::auth::AuthSession;

/// Errors from privileged admin API calls.
#[derive(Debug, Error)]
pub enum AdminApiError {
    /// The admin backend answered with `success: false`.
    #[error("admin API rejected request: {message}")]
    Rejected {
        status: reqwest::StatusCode,
        message: String,
    },

    /// Transport-level failure.
    #[error("admin API unreachable: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body did not match the envelope.
    #[error("unexpected admin API response: {0}")]
    UnexpectedResponse(String),
}

#[derive(Deserialize)]
struct Envelope<T> {
    success: bool,
    data: Option<T>,
    error: Option<String>,
}

/// Verification issuance result.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationIssued {
    pub contact_id: ContactId,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateUserData {
    user_id: IdentityId,
}

/// Payment intent handle for the app's payment sheet.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntentHandle {
    pub client_secret: String,
    pub payment_intent_id: String,
}

/// Client for the admin backend's privileged API.
#[derive(Clone)]
pub struct AdminApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl AdminApiClient {
    /// Build a client for the given admin base URL.
    #[must_use]
    pub fn new(http: reqwest::Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }

    /// Issue a verification code for a signup by email.
    ///
    /// # Errors
    ///
    /// Returns `AdminApiError::Rejected` with the admin backend's message
    /// (e.g., a duplicate-email conflict).
    pub async fn send_verification(
        &self,
        email: &str,
        first_name: &str,
        last_name: &str,
    ) -> Result<VerificationIssued, AdminApiError> {
        self.post(
            "/api/auth/send-verification",
            &json!({
                "email": email,
                "firstName": first_name,
                "lastName": last_name,
            }),
        )
        .await
    }

    /// Reissue the verification code for a known signup contact.
    ///
    /// # Errors
    ///
    /// Returns `AdminApiError::Rejected` if the contact is unknown.
    pub async fn resend_verification(
        &self,
        contact_id: ContactId,
    ) -> Result<VerificationIssued, AdminApiError> {
        self.post(
            "/api/auth/resend-verification",
            &json!({ "contactId": contact_id }),
        )
        .await
    }

    /// Check a submitted verification code; success consumes it.
    ///
    /// # Errors
    ///
    /// Returns `AdminApiError::Rejected` for a wrong, consumed, or expired
    /// code.
    pub async fn verify_email(
        &self,
        contact_id: ContactId,
        code: &str,
    ) -> Result<(), AdminApiError> {
        #[derive(Deserialize)]
        struct Ignored {}

        self.post::<Ignored>(
            "/api/auth/verify-email",
            &json!({ "contactId": contact_id, "code": code }),
        )
        .await
        .map(|_| ())
    }

    /// Create a confirmed auth user linked to a verified contact.
    ///
    /// # Errors
    ///
    /// Returns `AdminApiError::Rejected` if the subsystem refuses (e.g.,
    /// the email already has an account).
    pub async fn create_user(
        &self,
        email: &str,
        password: &str,
        contact_id: ContactId,
        first_name: &str,
        last_name: &str,
    ) -> Result<IdentityId, AdminApiError> {
        let data: CreateUserData = self
            .post(
                "/api/auth/create-user",
                &json!({
                    "email": email,
                    "password": password,
                    "contactId": contact_id,
                    "firstName": first_name,
                    "lastName": last_name,
                }),
            )
            .await?;
        Ok(data.user_id)
    }

    /// Server-side password grant, used when direct logins are disabled.
    ///
    /// # Errors
    ///
    /// Returns `AdminApiError::Rejected` on a refused grant.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AdminApiError> {
        self.post(
            "/api/auth/sign-in",
            &json!({ "email": email, "password": password }),
        )
        .await
    }

    /// Create a Stripe payment intent for a donation.
    ///
    /// # Errors
    ///
    /// Returns `AdminApiError::Rejected` on an invalid amount or provider
    /// refusal.
    pub async fn create_payment_intent(
        &self,
        amount: Decimal,
        fund_designation: Option<&str>,
        contact_id: ContactId,
    ) -> Result<PaymentIntentHandle, AdminApiError> {
        self.post(
            "/api/donations/create-payment-intent",
            &json!({
                "amount": amount,
                "fundDesignation": fund_designation,
                "contactId": contact_id,
            }),
        )
        .await
    }

    async fn post<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<T, AdminApiError> {
        let response = self
            .http
            .post(format!("{}{path}", self.base_url))
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        let envelope: Envelope<T> = serde_json::from_str(&text)
            .map_err(|e| AdminApiError::UnexpectedResponse(e.to_string()))?;

        if envelope.success {
            envelope.data.ok_or_else(|| {
                AdminApiError::UnexpectedResponse("success envelope without data".into())
            })
        } else {
            Err(AdminApiError::Rejected {
                status,
                message: envelope
                    .error
                    .unwrap_or_else(|| "Admin API error".to_owned()),
            })
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn envelope_with_data_parses() {
        let envelope: Envelope<VerificationIssued> = serde_json::from_str(
            r#"{"success":true,"data":{"contactId":"5e86c55e-4c1a-4f0b-9f64-1f3cf1a8a2f5",
                "expiresAt":"2026-08-25T12:00:00Z"}}"#,
        )
        .unwrap();
        assert!(envelope.success);
        assert!(envelope.data.is_some());
    }

    #[test]
    fn error_envelope_parses() {
        let envelope: Envelope<VerificationIssued> =
            serde_json::from_str(r#"{"success":false,"error":"Invalid verification code"}"#)
                .unwrap();
        assert!(!envelope.success);
        assert_eq!(envelope.error.as_deref(), Some("Invalid verification code"));
    }
}
