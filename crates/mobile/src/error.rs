//! Unified error handling for the mobile backend.
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
use crate::services::admin_api::AdminApiError;
use crate::services::auth::AuthError;
use crate::services::contacts::ContactResolutionError;
use crate::services::session::SessionError;
use crate::services::signup::SignupError;

/// Application-level error type for the mobile binary.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Auth subsystem call failed.
    #[error("Auth subsystem error: {0}")]
    Auth(#[from] AuthError),

    /// Privileged admin API call failed.
    #[error("Admin API error: {0}")]
    AdminApi(#[from] AdminApiError),

    /// Sign-in failed.
    #[error("Sign-in error: {0}")]
    SignIn(#[from] SessionError),

    /// Signup flow error.
    #[error("Signup error: {0}")]
    Signup(#[from] SignupError),

    /// Contact resolution failed entirely.
    #[error("{0}")]
    Resolution(#[from] ContactResolutionError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Database(RepositoryError::Conflict(_))
            | Self::Signup(
                SignupError::Validation(_)
                | SignupError::InvalidCode { .. }
                | SignupError::AccountCreation { .. },
            )
            | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Database(RepositoryError::NotFound) | Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::SignIn(SessionError::InvalidCredentials) | Self::Unauthorized(_) => {
                StatusCode::UNAUTHORIZED
            }
            Self::Database(_) | Self::Resolution(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Auth(_)
            | Self::AdminApi(_)
            | Self::SignIn(_)
            | Self::Signup(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn message(&self) -> String {
        match self {
            // Storage details never reach the client.
            Self::Database(RepositoryError::Conflict(m)) => m.clone(),
            Self::Database(_) | Self::Resolution(ContactResolutionError::Repository(_)) => {
                "Internal server error".to_owned()
            }
            Self::Auth(AuthError::Rejected { message, .. })
            | Self::AdminApi(AdminApiError::Rejected { message, .. }) => message.clone(),
            Self::Auth(_) | Self::AdminApi(_) => "External service error".to_owned(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Mobile request error"
            );
        }

        (
            status,
            Json(json!({ "success": false, "error": self.message() })),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::signup::{SignupError, ValidationError};

    fn status_of(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn error_status_codes() {
        assert_eq!(
            status_of(AppError::NotFound("event".into())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(AppError::Unauthorized("token required".into())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_of(AppError::SignIn(SessionError::InvalidCredentials)),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_of(AppError::Signup(SignupError::Validation(
                ValidationError::PasswordMismatch
            ))),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(AppError::Resolution(ContactResolutionError::Unresolvable)),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
