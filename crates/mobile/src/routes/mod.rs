//! Route map for the mobile backend.
//!
//! Public (no token):
//! - `POST /api/auth/sign-in` - password grant with disabled-logins fallback
//! - `POST /api/auth/refresh` - refresh-token grant
//! - `POST /api/auth/signup` - details stage, issues the verification code
//! - `POST /api/auth/signup/resend` - reissue the code
//! - `POST /api/auth/signup/verify` - verify, create account, sign in
//! - `GET  /api/sermons` - published sermon catalog
//!
//! Member (bearer token, contact resolved per request):
//! - `GET  /api/profile` / `PUT /api/profile`
//! - `GET  /api/events`, `GET /api/events/{id}`,
//!   `POST /api/events/{id}/register`, `POST /api/events/{id}/check-in`,
//!   `GET  /api/events/history`
//! - `GET  /api/groups`, `POST /api/groups/{id}/join`,
//!   `GET  /api/discipleship-groups`,
//!   `POST /api/discipleship-groups/{id}/join`
//! - `GET  /api/prayer-requests`, `POST /api/prayer-requests`
//! - `GET  /api/giving/history`, `POST /api/giving/payment-intent`
//! - `POST /api/notifications/token`,
//!   `GET/PUT /api/notifications/preferences`

pub mod auth;
pub mod events;
pub mod giving;
pub mod groups;
pub mod notifications;
pub mod prayer;
pub mod profile;
pub mod sermons;

use axum::{Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Success envelope: `{ "success": true, "data": ... }`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

/// Wrap a payload in the success envelope.
pub fn ok<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse {
        success: true,
        data,
    })
}

/// Build the full mobile router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(auth::router())
        .merge(profile::router())
        .merge(events::router())
        .merge(groups::router())
        .merge(prayer::router())
        .merge(giving::router())
        .merge(sermons::router())
        .merge(notifications::router())
}
