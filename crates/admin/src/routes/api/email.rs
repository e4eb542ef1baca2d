//! Unified email delivery endpoint.

use axum::{Json, Router, extract::State, routing::post};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::middleware::RequireStaffAuth;
use crate::state::AppState;

use super::{ApiResponse, ok};

/// Build the email router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/email/send", post(send))
}

/// Request for sending a caller-composed email.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendEmailRequest {
    pub to: String,
    pub subject: String,
    pub html: String,
    pub text: Option<String>,
    /// Informational category (e.g. "newsletter", "receipt"); logged for
    /// delivery auditing.
    pub email_type: Option<String>,
}

/// Delivery confirmation.
#[derive(Debug, Serialize)]
pub struct SendEmailResponse {
    pub sent: bool,
}

/// Send an email composed by the dashboard.
///
/// # Errors
///
/// Returns 502 if SMTP delivery fails.
pub async fn send(
    RequireStaffAuth(admin): RequireStaffAuth,
    State(state): State<AppState>,
    Json(body): Json<SendEmailRequest>,
) -> Result<Json<ApiResponse<SendEmailResponse>>, AppError> {
    tracing::info!(
        staff = %admin.email,
        email_type = body.email_type.as_deref().unwrap_or("general"),
        "Staff email send requested"
    );

    state
        .email()
        .send_raw(&body.to, &body.subject, &body.html, body.text.as_deref())
        .await?;

    Ok(ok(SendEmailResponse { sent: true }))
}
