//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::MobileConfig;
use crate::services::{
    AdminApiClient, AuthClient, ContactResolver, PgContactDirectory, SessionService, SignupService,
};

type Sessions = SessionService<AuthClient, AdminApiClient>;
type Signup = SignupService<AdminApiClient, AuthClient, AdminApiClient>;

/// Application state shared across all handlers. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: MobileConfig,
    pool: PgPool,
    auth: AuthClient,
    admin_api: AdminApiClient,
    sessions: Sessions,
    signup: Signup,
    resolver: ContactResolver<PgContactDirectory>,
}

impl AppState {
    /// Build state from configuration and an established pool.
    #[must_use]
    pub fn new(config: MobileConfig, pool: PgPool) -> Self {
        let http = reqwest::Client::new();

        let auth = AuthClient::new(http.clone(), &config.auth);
        let admin_api = AdminApiClient::new(http, &config.admin_api_url);
        let sessions = SessionService::new(auth.clone(), admin_api.clone());
        let signup = SignupService::new(
            admin_api.clone(),
            SessionService::new(auth.clone(), admin_api.clone()),
        );
        let resolver = ContactResolver::new(PgContactDirectory::new(pool.clone()));

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                auth,
                admin_api,
                sessions,
                signup,
                resolver,
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &MobileConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    #[must_use]
    pub fn auth(&self) -> &AuthClient {
        &self.inner.auth
    }

    #[must_use]
    pub fn admin_api(&self) -> &AdminApiClient {
        &self.inner.admin_api
    }

    #[must_use]
    pub fn sessions(&self) -> &Sessions {
        &self.inner.sessions
    }

    #[must_use]
    pub fn signup(&self) -> &Signup {
        &self.inner.signup
    }

    #[must_use]
    pub fn resolver(&self) -> &ContactResolver<PgContactDirectory> {
        &self.inner.resolver
    }
}
