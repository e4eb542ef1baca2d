//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::AdminConfig;
use crate::services::{
    AuthAdminClient, EmailService, PaymentClient, PlacesClient, PushClient, SettingsCache,
    VerificationService,
};

/// Application state shared across all handlers. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    pool: PgPool,
    auth_admin: AuthAdminClient,
    email: EmailService,
    verification: VerificationService,
    payments: PaymentClient,
    push: PushClient,
    places: PlacesClient,
    settings: SettingsCache,
}

impl AppState {
    /// Build state from configuration and an established pool.
    ///
    /// # Errors
    ///
    /// Returns an error if the SMTP transport cannot be configured.
    pub fn new(
        config: AdminConfig,
        pool: PgPool,
    ) -> Result<Self, crate::services::email::EmailError> {
        let http = reqwest::Client::new();

        let auth_admin = AuthAdminClient::new(http.clone(), &config.auth);
        let email = EmailService::new(&config.email)?;
        let verification = VerificationService::new(pool.clone(), email.clone());
        let payments = PaymentClient::new(http.clone(), &config.stripe);
        let push = PushClient::new(http.clone(), config.expo_push_url.clone());
        let places = PlacesClient::new(http, config.places_api_key.clone());
        let settings = SettingsCache::new(pool.clone());

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                auth_admin,
                email,
                verification,
                payments,
                push,
                places,
                settings,
            }),
        })
    }

    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    #[must_use]
    pub fn auth_admin(&self) -> &AuthAdminClient {
        &self.inner.auth_admin
    }

    #[must_use]
    pub fn email(&self) -> &EmailService {
        &self.inner.email
    }

    #[must_use]
    pub fn verification(&self) -> &VerificationService {
        &self.inner.verification
    }

    #[must_use]
    pub fn payments(&self) -> &PaymentClient {
        &self.inner.payments
    }

    #[must_use]
    pub fn push(&self) -> &PushClient {
        &self.inner.push
    }

    #[must_use]
    pub fn places(&self) -> &PlacesClient {
        &self.inner.places
    }

    #[must_use]
    pub fn settings(&self) -> &SettingsCache {
        &self.inner.settings
    }
}
