//! Privileged JSON API consumed by the mobile backend and the dashboard UI.
//!
//! All responses use the `{ success, data? | error? }` envelope.

pub mod auth;
pub mod donations;
pub mod email;
pub mod mobile_users;
pub mod places;
pub mod settings;

use axum::Json;
use serde::Serialize;

use crate::middleware::auth_rate_limiter;
use crate::state::AppState;

/// Successful response envelope.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

/// Wrap data in the success envelope.
pub fn ok<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse {
        success: true,
        data,
    })
}

/// Build the combined `/api` router.
pub fn router() -> axum::Router<AppState> {
    axum::Router::new()
        .merge(auth::router().layer(auth_rate_limiter()))
        .merge(email::router())
        .merge(donations::router())
        .merge(mobile_users::router())
        .merge(settings::router())
        .merge(places::router())
}
