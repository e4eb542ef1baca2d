//! Expo push notification client.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use thiserror::Error;

/// Expo caps each request at 100 messages.
const MAX_BATCH: usize = 100;

/// Errors from push delivery.
#[derive(Debug, Error)]
pub enum PushError {
    /// Transport-level failure.
    #[error("push service unreachable: {0}")]
    Http(#[from] reqwest::Error),

    /// The push service rejected the batch.
    #[error("push service rejected request: {0}")]
    Rejected(String),
}

/// A single push message.
#[derive(Debug, Clone, Serialize)]
pub struct PushMessage {
    pub to: String,
    pub title: String,
    pub body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<JsonValue>,
}

#[derive(Deserialize)]
struct PushReceipt {
    status: String,
    message: Option<String>,
}

#[derive(Deserialize)]
struct PushResponse {
    data: Vec<PushReceipt>,
}

/// Client for the Expo push API.
#[derive(Clone)]
pub struct PushClient {
    http: reqwest::Client,
    endpoint: String,
}

impl PushClient {
    /// Build a client targeting the configured push endpoint.
    #[must_use]
    pub fn new(http: reqwest::Client, endpoint: String) -> Self {
        Self { http, endpoint }
    }

    /// Send a notification to a set of device tokens.
    ///
    /// Tokens are batched per the provider limit. Per-token rejections
    /// (expired tokens, bad format) are logged and skipped rather than
    /// failing the whole broadcast.
    ///
    /// # Errors
    ///
    /// Returns `PushError` only if a whole batch fails.
    pub async fn send(
        &self,
        tokens: &[String],
        title: &str,
        body: &str,
        data: Option<&JsonValue>,
    ) -> Result<usize, PushError> {
        let mut delivered = 0;

        for batch in tokens.chunks(MAX_BATCH) {
            let messages: Vec<PushMessage> = batch
                .iter()
                .map(|token| PushMessage {
                    to: token.clone(),
                    title: title.to_owned(),
                    body: body.to_owned(),
                    data: data.cloned(),
                })
                .collect();

            let response = self
                .http
                .post(&self.endpoint)
                .json(&messages)
                .send()
                .await?;

            if !response.status().is_success() {
                let status = response.status();
                return Err(PushError::Rejected(format!("status {status}")));
            }

            let receipts: PushResponse = response.json().await?;
            for (receipt, token) in receipts.data.iter().zip(batch) {
                if receipt.status == "ok" {
                    delivered += 1;
                } else {
                    tracing::warn!(
                        token = %token,
                        reason = receipt.message.as_deref().unwrap_or("unknown"),
                        "Push message not accepted"
                    );
                }
            }
        }

        Ok(delivered)
    }
}
