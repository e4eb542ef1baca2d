//! Bearer-token authentication for member requests.
//!
//! Every member endpoint extracts [`CurrentMember`]: the access token is
//! validated against the auth subsystem, then the identity is resolved to
//! its contact (provisioning on first touch). Handlers therefore always
//! hold a usable contact id.

use axum::extract::FromRequestParts;
use axum::http::{StatusCode, header, request::Parts};
use axum::response::{IntoResponse, Response};

use wayside_core::{ContactId, Email, IdentityId};

use crate::error::AppError;
use crate::services::auth::AuthError;
use crate::state::AppState;

/// The authenticated member behind a request.
#[derive(Debug, Clone)]
pub struct CurrentMember {
    pub identity: IdentityId,
    pub contact_id: ContactId,
    pub email: Option<Email>,
}

impl FromRequestParts<AppState> for CurrentMember {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)
            .ok_or_else(|| unauthorized("Authentication required"))?;

        let user = match state.auth().get_user(token).await {
            Ok(user) => user,
            Err(AuthError::Rejected { .. }) => {
                return Err(unauthorized("Invalid or expired session"));
            }
            Err(e) => return Err(AppError::Auth(e).into_response()),
        };

        // Tokens can carry emails the validator would reject; resolution
        // falls back to placeholder provisioning in that case.
        let email = user.email.as_deref().and_then(|e| Email::parse(e).ok());

        let contact_id = state
            .resolver()
            .resolve(user.id, email.as_ref())
            .await
            .map_err(|e| AppError::Resolution(e).into_response())?;

        Ok(Self {
            identity: user.id,
            contact_id,
            email,
        })
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

fn unauthorized(message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        axum::Json(serde_json::json!({ "success": false, "error": message })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use axum::http::Request;

    use super::*;

    #[test]
    fn bearer_token_parses_header() {
        let request = Request::builder()
            .header(header::AUTHORIZATION, "Bearer abc.def.ghi")
            .body(())
            .expect("request");
        let (parts, ()) = request.into_parts();
        assert_eq!(bearer_token(&parts), Some("abc.def.ghi"));
    }

    #[test]
    fn missing_or_malformed_header_yields_none() {
        let request = Request::builder()
            .header(header::AUTHORIZATION, "Token abc")
            .body(())
            .expect("request");
        let (parts, ()) = request.into_parts();
        assert_eq!(bearer_token(&parts), None);
    }
}
