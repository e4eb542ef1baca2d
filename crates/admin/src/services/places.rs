//! Address autocomplete proxy.
//!
//! The dashboard address fields call this through the admin binary so the
//! places API key never ships to a browser.

use secrecy::ExposeSecret;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use thiserror::Error;

const PLACES_API_BASE: &str = "https://maps.googleapis.com/maps/api/place";

/// Errors from the places proxy.
#[derive(Debug, Error)]
pub enum PlacesError {
    /// Transport-level failure.
    #[error("places service unreachable: {0}")]
    Http(#[from] reqwest::Error),

    /// No API key configured; the proxy is disabled.
    #[error("places autocomplete is not configured")]
    NotConfigured,
}

#[derive(Deserialize)]
struct AutocompleteResponse {
    predictions: Vec<JsonValue>,
}

/// Client for address autocomplete lookups.
#[derive(Clone)]
pub struct PlacesClient {
    http: reqwest::Client,
    api_key: Option<secrecy::SecretString>,
}

impl PlacesClient {
    /// Build a client; `api_key = None` disables lookups.
    #[must_use]
    pub fn new(http: reqwest::Client, api_key: Option<secrecy::SecretString>) -> Self {
        Self { http, api_key }
    }

    /// Fetch autocomplete predictions for a partial address.
    ///
    /// # Errors
    ///
    /// Returns `PlacesError::NotConfigured` when no API key is set.
    pub async fn autocomplete(&self, input: &str) -> Result<Vec<JsonValue>, PlacesError> {
        let api_key = self.api_key.as_ref().ok_or(PlacesError::NotConfigured)?;

        let response = self
            .http
            .get(format!("{PLACES_API_BASE}/autocomplete/json"))
            .query(&[
                ("input", input),
                ("types", "address"),
                ("key", api_key.expose_secret()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json::<AutocompleteResponse>()
            .await?;

        Ok(response.predictions)
    }
}
