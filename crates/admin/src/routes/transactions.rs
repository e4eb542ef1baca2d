//! Giving (transaction) review for the dashboard.

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};

use crate::db::transactions::{Transaction, TransactionRepository};
use crate::db::Page;
use crate::error::AppError;
use crate::middleware::RequireStaffAuth;
use crate::state::AppState;

use super::api::{ApiResponse, ok};

/// Build the transactions router.
pub fn router() -> Router<AppState> {
    Router::new().route("/transactions", get(list))
}

/// List transactions, newest first.
///
/// # Errors
///
/// Returns 500 on a query failure.
pub async fn list(
    RequireStaffAuth(_admin): RequireStaffAuth,
    State(state): State<AppState>,
    Query(page): Query<Page>,
) -> Result<Json<ApiResponse<Vec<Transaction>>>, AppError> {
    let transactions = TransactionRepository::new(state.pool()).list(page).await?;
    Ok(ok(transactions))
}
