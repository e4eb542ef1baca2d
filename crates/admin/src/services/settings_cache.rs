//! Read-through cache over the settings table.
//!
//! Branding and giving configuration are read on nearly every mobile
//! request; a short TTL keeps dashboard edits visible within a minute.

use std::time::Duration;

use moka::future::Cache;
use serde_json::Value as JsonValue;
use sqlx::PgPool;

use crate::db::{RepositoryError, SettingsRepository};

const CACHE_TTL: Duration = Duration::from_secs(60);
const CACHE_CAPACITY: u64 = 256;

/// Cached settings reader with write-through invalidation.
#[derive(Clone)]
pub struct SettingsCache {
    pool: PgPool,
    cache: Cache<String, JsonValue>,
}

impl SettingsCache {
    /// Create a cache over the given pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            cache: Cache::builder()
                .max_capacity(CACHE_CAPACITY)
                .time_to_live(CACHE_TTL)
                .build(),
        }
    }

    /// Get a settings blob, serving from cache when warm.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the backing query fails.
    pub async fn get(&self, key: &str) -> Result<Option<JsonValue>, RepositoryError> {
        if let Some(value) = self.cache.get(key).await {
            return Ok(Some(value));
        }

        let value = SettingsRepository::new(&self.pool).get(key).await?;
        if let Some(ref value) = value {
            self.cache.insert(key.to_owned(), value.clone()).await;
        }
        Ok(value)
    }

    /// Write a settings blob and refresh the cache entry.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the backing query fails.
    pub async fn set(&self, key: &str, value: &JsonValue) -> Result<(), RepositoryError> {
        SettingsRepository::new(&self.pool).set(key, value).await?;
        self.cache.insert(key.to_owned(), value.clone()).await;
        Ok(())
    }
}
