//! HTTP middleware: sessions, staff auth, rate limiting.

pub mod auth;
pub mod rate_limit;
pub mod session;

pub use auth::RequireStaffAuth;
pub use rate_limit::auth_rate_limiter;
pub use session::create_session_layer;
