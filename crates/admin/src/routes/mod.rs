//! HTTP route handlers for the admin binary.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                                   - Liveness check
//! GET  /health/ready                             - Readiness check (DB ping)
//!
//! # Staff auth (session cookie)
//! POST /auth/login                               - Staff login
//! POST /auth/logout                              - Staff logout
//!
//! # Privileged API (rate limited; consumed by the mobile backend)
//! POST /api/auth/send-verification               - Issue signup code
//! POST /api/auth/resend-verification             - Reissue signup code
//! POST /api/auth/verify-email                    - Check submitted code
//! POST /api/auth/create-user                     - Service-role user create
//! POST /api/auth/sign-in                         - Server-side password grant
//! POST /api/email/send                           - Staff-composed email
//! POST /api/donations/create-payment-intent      - Stripe payment intent
//! POST /api/mobile-users/register-push-token     - Device push token
//! GET/POST /api/mobile-users/notification-preferences
//! GET/PUT  /api/settings/{key}                   - JSONB settings store
//! GET  /api/places/autocomplete                  - Address proxy (staff)
//!
//! # Dashboard CRUD (staff session required)
//! /contacts, /members, /groups, /discipleship-groups, /memberships,
//! /events, /prayer-requests, /transactions, /sermons, /mobile-users,
//! /transport-requests, /drivers
//! POST /events/{id}/transport/auto-assign        - Distribute pending rides
//! ```

pub mod api;
pub mod auth;
pub mod contacts;
pub mod events;
pub mod groups;
pub mod members;
pub mod mobile_users;
pub mod prayer;
pub mod sermons;
pub mod transactions;
pub mod transport;

use axum::Router;

use crate::state::AppState;

/// Build the full application router (health endpoints are added in main).
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(api::router())
        .merge(auth::router())
        .merge(contacts::router())
        .merge(members::router())
        .merge(groups::router())
        .merge(events::router())
        .merge(prayer::router())
        .merge(transactions::router())
        .merge(sermons::router())
        .merge(mobile_users::router())
        .merge(transport::router())
}
