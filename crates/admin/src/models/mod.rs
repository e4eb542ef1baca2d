//! Shared request-scoped models.

use serde::{Deserialize, Serialize};

use wayside_core::AdminUserId;

/// Session keys used by the dashboard auth flow.
pub mod session_keys {
    /// The logged-in staff account.
    pub const CURRENT_ADMIN: &str = "current_admin";
}

/// The staff account stored in the session after login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentAdmin {
    pub id: AdminUserId,
    pub email: String,
    pub display_name: String,
}

impl From<&crate::db::admin_users::AdminUser> for CurrentAdmin {
    fn from(user: &crate::db::admin_users::AdminUser) -> Self {
        Self {
            id: user.id,
            email: user.email.to_string(),
            display_name: user.display_name.clone(),
        }
    }
}
