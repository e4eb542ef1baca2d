//! Stripe payment intent client.
//!
//! Stripe's REST API takes form-encoded bodies and amounts in minor
//! currency units.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use secrecy::ExposeSecret;
use serde::Deserialize;
use thiserror::Error;

use crate::config::StripeConfig;

const STRIPE_API_BASE: &str = "https://api.stripe.com/v1";

/// Errors from payment provider calls.
#[derive(Debug, Error)]
pub enum PaymentError {
    /// Transport-level failure.
    #[error("payment provider unreachable: {0}")]
    Http(#[from] reqwest::Error),

    /// Stripe rejected the request.
    #[error("payment provider rejected request: {0}")]
    Rejected(String),

    /// Amount could not be expressed in minor units.
    #[error("invalid donation amount: {0}")]
    InvalidAmount(Decimal),
}

/// A created payment intent, as returned to the mobile client.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    pub client_secret: String,
}

#[derive(Deserialize)]
struct StripeErrorBody {
    error: StripeErrorDetail,
}

#[derive(Deserialize)]
struct StripeErrorDetail {
    message: Option<String>,
}

/// Client for creating Stripe payment intents.
#[derive(Clone)]
pub struct PaymentClient {
    http: reqwest::Client,
    secret_key: secrecy::SecretString,
    pub default_currency: String,
}

impl PaymentClient {
    /// Build a client from configuration.
    #[must_use]
    pub fn new(http: reqwest::Client, config: &StripeConfig) -> Self {
        Self {
            http,
            secret_key: config.secret_key.clone(),
            default_currency: config.default_currency.clone(),
        }
    }

    /// Create a payment intent for a donation.
    ///
    /// `amount` is in major currency units (e.g. dollars) and is converted
    /// to minor units here. Metadata keys surface in the Stripe dashboard
    /// for reconciliation.
    ///
    /// # Errors
    ///
    /// Returns `PaymentError::InvalidAmount` for non-positive amounts or
    /// amounts with sub-cent precision.
    pub async fn create_payment_intent(
        &self,
        amount: Decimal,
        currency: &str,
        fund_designation: Option<&str>,
        contact_id: Option<&str>,
    ) -> Result<PaymentIntent, PaymentError> {
        let minor_units = to_minor_units(amount).ok_or(PaymentError::InvalidAmount(amount))?;

        let mut form: Vec<(String, String)> = vec![
            ("amount".into(), minor_units.to_string()),
            ("currency".into(), currency.to_lowercase()),
            (
                "automatic_payment_methods[enabled]".into(),
                "true".into(),
            ),
        ];
        if let Some(fund) = fund_designation {
            form.push(("metadata[fund_designation]".into(), fund.to_owned()));
        }
        if let Some(contact_id) = contact_id {
            form.push(("metadata[contact_id]".into(), contact_id.to_owned()));
        }

        let response = self
            .http
            .post(format!("{STRIPE_API_BASE}/payment_intents"))
            .bearer_auth(self.secret_key.expose_secret())
            .form(&form)
            .send()
            .await?;

        if response.status().is_success() {
            Ok(response.json::<PaymentIntent>().await?)
        } else {
            let message = response
                .json::<StripeErrorBody>()
                .await
                .ok()
                .and_then(|b| b.error.message)
                .unwrap_or_else(|| "payment intent creation failed".to_owned());
            Err(PaymentError::Rejected(message))
        }
    }
}

/// Convert a major-unit decimal amount to integral minor units.
///
/// Returns `None` for zero, negative, or sub-cent amounts.
fn to_minor_units(amount: Decimal) -> Option<i64> {
    if amount <= Decimal::ZERO {
        return None;
    }
    let scaled = amount * Decimal::from(100);
    if scaled.fract() != Decimal::ZERO {
        return None;
    }
    scaled.to_i64()
}

#[cfg(test)]
mod tests {
    use super::to_minor_units;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    #[test]
    fn whole_and_cent_amounts_convert() {
        assert_eq!(to_minor_units(Decimal::from(25)), Some(2500));
        assert_eq!(
            to_minor_units(Decimal::from_str("19.99").unwrap()),
            Some(1999)
        );
    }

    #[test]
    fn invalid_amounts_are_rejected() {
        assert_eq!(to_minor_units(Decimal::ZERO), None);
        assert_eq!(to_minor_units(Decimal::from(-5)), None);
        assert_eq!(to_minor_units(Decimal::from_str("0.001").unwrap()), None);
    }
}
