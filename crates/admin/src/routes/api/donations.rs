//! Donation payment intent endpoint.

use axum::{Json, Router, extract::State, routing::post};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use wayside_core::{ContactId, PaymentStatus};

use crate::db::transactions::{NewTransaction, TransactionRepository};
use crate::error::AppError;
use crate::state::AppState;

use super::{ApiResponse, ok};

/// Build the donations router.
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/api/donations/create-payment-intent",
        post(create_payment_intent),
    )
}

/// Request for starting a donation.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentIntentRequest {
    /// Amount in major currency units.
    pub amount: Decimal,
    pub currency: Option<String>,
    pub fund_designation: Option<String>,
    pub contact_id: Option<ContactId>,
    #[serde(default)]
    pub is_anonymous: bool,
    #[serde(default)]
    pub is_recurring: bool,
}

/// Response carrying the client secret for the payment sheet.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentIntentResponse {
    pub client_secret: String,
    pub payment_intent_id: String,
}

/// Create a Stripe payment intent and record a pending transaction.
///
/// # Errors
///
/// Returns 400 for invalid amounts and 502 if Stripe rejects the request.
pub async fn create_payment_intent(
    State(state): State<AppState>,
    Json(body): Json<CreatePaymentIntentRequest>,
) -> Result<Json<ApiResponse<CreatePaymentIntentResponse>>, AppError> {
    let currency = body
        .currency
        .unwrap_or_else(|| state.payments().default_currency.clone());

    let contact_ref = body.contact_id.map(|id| id.to_string());
    let intent = state
        .payments()
        .create_payment_intent(
            body.amount,
            &currency,
            body.fund_designation.as_deref(),
            contact_ref.as_deref(),
        )
        .await?;

    TransactionRepository::new(state.pool())
        .create(&NewTransaction {
            contact_id: body.contact_id,
            amount: body.amount,
            currency,
            fund_designation: body.fund_designation,
            payment_method: Some("card".to_owned()),
            payment_status: PaymentStatus::Pending,
            stripe_payment_intent_id: Some(intent.id.clone()),
            is_anonymous: body.is_anonymous,
            is_recurring: body.is_recurring,
            notes: None,
        })
        .await?;

    Ok(ok(CreatePaymentIntentResponse {
        client_secret: intent.client_secret,
        payment_intent_id: intent.id,
    }))
}
