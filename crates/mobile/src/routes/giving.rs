//! Giving history and donation payment intents.

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::{get, post},
};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::db::giving::GivingEntry;
use crate::db::{GivingRepository, Page};
use crate::error::AppError;
use crate::middleware::CurrentMember;
use crate::services::admin_api::PaymentIntentHandle;
use crate::state::AppState;

use super::{ApiResponse, ok};

/// Build the giving router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/giving/history", get(history))
        .route("/api/giving/payment-intent", post(payment_intent))
}

/// Succeeded donations for the member, newest first.
///
/// # Errors
///
/// Returns 500 on a storage failure.
pub async fn history(
    member: CurrentMember,
    State(state): State<AppState>,
    Query(page): Query<Page>,
) -> Result<Json<ApiResponse<Vec<GivingEntry>>>, AppError> {
    let entries = GivingRepository::new(state.pool())
        .history(member.contact_id, page)
        .await?;
    Ok(ok(entries))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntentRequest {
    pub amount: Decimal,
    pub fund_designation: Option<String>,
}

/// Create a payment intent for the app's payment sheet, via the admin
/// backend (the Stripe key never lives in this binary).
///
/// # Errors
///
/// Returns 400 on an invalid amount.
pub async fn payment_intent(
    member: CurrentMember,
    State(state): State<AppState>,
    Json(body): Json<PaymentIntentRequest>,
) -> Result<Json<ApiResponse<PaymentIntentHandle>>, AppError> {
    if body.amount <= Decimal::ZERO {
        return Err(AppError::BadRequest("amount must be positive".into()));
    }

    let handle = state
        .admin_api()
        .create_payment_intent(
            body.amount,
            body.fund_designation.as_deref(),
            member.contact_id,
        )
        .await?;
    Ok(ok(handle))
}
