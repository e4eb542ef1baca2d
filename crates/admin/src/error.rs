//! Unified error handling for the admin binary.
//!
//! API responses follow the `{ success, data? | error? }` envelope; errors
//! render as `{ "success": false, "error": "..." }` with an appropriate
//! status code.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::auth_admin::AuthAdminError;
use crate::services::email::EmailError;
use crate::services::payments::PaymentError;
use crate::services::push::PushError;
use crate::services::verification::VerificationError;

/// Application-level error type for the admin binary.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Auth subsystem admin call failed.
    #[error("Auth subsystem error: {0}")]
    Auth(#[from] AuthAdminError),

    /// Email delivery failed.
    #[error("Email error: {0}")]
    Email(#[from] EmailError),

    /// Payment provider call failed.
    #[error("Payment error: {0}")]
    Payment(#[from] PaymentError),

    /// Push delivery failed.
    #[error("Push error: {0}")]
    Push(#[from] PushError),

    /// Verification flow failed.
    #[error("Verification error: {0}")]
    Verification(#[from] VerificationError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Repository conflicts and not-founds are client errors, not faults.
        if let Self::Database(RepositoryError::Conflict(message)) = &self {
            return error_response(StatusCode::BAD_REQUEST, message);
        }
        if matches!(
            self,
            Self::Database(RepositoryError::NotFound) | Self::NotFound(_)
        ) {
            let message = match &self {
                Self::NotFound(m) => format!("Not found: {m}"),
                _ => "Not found".to_owned(),
            };
            return error_response(StatusCode::NOT_FOUND, &message);
        }

        if matches!(
            self,
            Self::Database(_) | Self::Internal(_) | Self::Auth(_) | Self::Email(_)
        ) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Admin request error"
            );
        }

        let status = match &self {
            Self::Verification(VerificationError::NoEmailAddress) => StatusCode::BAD_REQUEST,
            Self::Database(_) | Self::Internal(_) | Self::Verification(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Payment(PaymentError::InvalidAmount(_)) => StatusCode::BAD_REQUEST,
            Self::Auth(_) | Self::Email(_) | Self::Payment(_) | Self::Push(_) => {
                StatusCode::BAD_GATEWAY
            }
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        };

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Verification(VerificationError::NoEmailAddress) => self.to_string(),
            Self::Database(_) | Self::Internal(_) | Self::Verification(_) => {
                "Internal server error".to_owned()
            }
            Self::Auth(AuthAdminError::Rejected { message, .. }) => message.clone(),
            Self::Auth(_) | Self::Email(_) => "External service error".to_owned(),
            _ => self.to_string(),
        };

        error_response(status, &message)
    }
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(json!({ "success": false, "error": message })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_status_codes() {
        fn status_of(err: AppError) -> StatusCode {
            err.into_response().status()
        }

        assert_eq!(
            status_of(AppError::NotFound("contact".into())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(AppError::Unauthorized("login required".into())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_of(AppError::BadRequest("bad".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(AppError::Internal("boom".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn conflict_maps_to_bad_request() {
        let err = AppError::Database(RepositoryError::Conflict(
            "This email address is already registered.".into(),
        ));
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }
}
