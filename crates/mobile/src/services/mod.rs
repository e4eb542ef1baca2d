//! Business logic for the mobile backend.

pub mod admin_api;
pub mod auth;
pub mod contacts;
pub mod session;
pub mod signup;

pub use admin_api::AdminApiClient;
pub use auth::AuthClient;
pub use contacts::{ContactResolver, PgContactDirectory};
pub use session::SessionService;
pub use signup::SignupService;
