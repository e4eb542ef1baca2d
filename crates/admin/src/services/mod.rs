//! External service clients and workflow services.

pub mod auth_admin;
pub mod email;
pub mod payments;
pub mod places;
pub mod push;
pub mod settings_cache;
pub mod transport;
pub mod verification;

pub use auth_admin::AuthAdminClient;
pub use email::EmailService;
pub use payments::PaymentClient;
pub use places::PlacesClient;
pub use push::PushClient;
pub use settings_cache::SettingsCache;
pub use verification::VerificationService;
