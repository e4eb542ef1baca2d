//! The member's giving history.
//!
//! Donations are created through the admin backend's payment-intent
//! endpoint; this repository only reads settled history back.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;

use wayside_core::{ContactId, TransactionId};

use super::RepositoryError;

/// A settled donation as shown in the app.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct GivingEntry {
    pub id: TransactionId,
    pub amount: Decimal,
    pub currency: String,
    pub fund_designation: Option<String>,
    pub is_recurring: bool,
    pub transacted_at: DateTime<Utc>,
}

/// Member-facing giving repository.
pub struct GivingRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> GivingRepository<'a> {
    /// Create a new repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Succeeded donations for the member, newest first. Pending and
    /// failed payments never appear in the app.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn history(
        &self,
        contact_id: ContactId,
        page: super::Page,
    ) -> Result<Vec<GivingEntry>, RepositoryError> {
        let page = page.clamped();
        let entries = sqlx::query_as::<_, GivingEntry>(
            "SELECT id, amount, currency, fund_designation, is_recurring, transacted_at
             FROM transactions
             WHERE contact_id = $1 AND payment_status = 'succeeded'
             ORDER BY transacted_at DESC
             LIMIT $2 OFFSET $3",
        )
        .bind(contact_id)
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(self.pool)
        .await?;
        Ok(entries)
    }
}
