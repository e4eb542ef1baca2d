//! Donation transaction repository.
//!
//! A row is written as `pending` when a payment intent is created and
//! flipped to its terminal status by the payment provider callback. Giving
//! history shown in the app only includes succeeded transactions.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value as JsonValue;
use sqlx::PgPool;

use wayside_core::{ContactId, PaymentStatus, TransactionId};

use super::RepositoryError;

/// A donation transaction.
#[derive(Debug, Clone, Serialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub contact_id: Option<ContactId>,
    pub amount: Decimal,
    pub currency: String,
    pub fund_designation: Option<String>,
    pub payment_method: Option<String>,
    pub payment_status: PaymentStatus,
    pub stripe_payment_intent_id: Option<String>,
    pub is_anonymous: bool,
    pub is_recurring: bool,
    pub notes: Option<String>,
    pub metadata: JsonValue,
    pub transacted_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct TransactionRow {
    id: TransactionId,
    contact_id: Option<ContactId>,
    amount: Decimal,
    currency: String,
    fund_designation: Option<String>,
    payment_method: Option<String>,
    payment_status: String,
    stripe_payment_intent_id: Option<String>,
    is_anonymous: bool,
    is_recurring: bool,
    notes: Option<String>,
    metadata: JsonValue,
    transacted_at: DateTime<Utc>,
}

impl TryFrom<TransactionRow> for Transaction {
    type Error = RepositoryError;

    fn try_from(row: TransactionRow) -> Result<Self, Self::Error> {
        let payment_status = row.payment_status.parse::<PaymentStatus>().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid payment status in database: {e}"))
        })?;
        Ok(Self {
            id: row.id,
            contact_id: row.contact_id,
            amount: row.amount,
            currency: row.currency,
            fund_designation: row.fund_designation,
            payment_method: row.payment_method,
            payment_status,
            stripe_payment_intent_id: row.stripe_payment_intent_id,
            is_anonymous: row.is_anonymous,
            is_recurring: row.is_recurring,
            notes: row.notes,
            metadata: row.metadata,
            transacted_at: row.transacted_at,
        })
    }
}

const TRANSACTION_COLUMNS: &str = "id, contact_id, amount, currency, fund_designation, \
                                   payment_method, payment_status, stripe_payment_intent_id, \
                                   is_anonymous, is_recurring, notes, metadata, transacted_at";

/// Fields for recording a new transaction.
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub contact_id: Option<ContactId>,
    pub amount: Decimal,
    pub currency: String,
    pub fund_designation: Option<String>,
    pub payment_method: Option<String>,
    pub payment_status: PaymentStatus,
    pub stripe_payment_intent_id: Option<String>,
    pub is_anonymous: bool,
    pub is_recurring: bool,
    pub notes: Option<String>,
}

/// Repository for donation transactions.
pub struct TransactionRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> TransactionRepository<'a> {
    /// Create a new repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List transactions for the dashboard, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, page: super::Page) -> Result<Vec<Transaction>, RepositoryError> {
        let page = page.clamped();
        let rows = sqlx::query_as::<_, TransactionRow>(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions
             ORDER BY transacted_at DESC LIMIT $1 OFFSET $2"
        ))
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Transaction::try_from).collect()
    }

    /// Giving history for a contact: succeeded transactions, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn giving_history(
        &self,
        contact_id: ContactId,
        page: super::Page,
    ) -> Result<Vec<Transaction>, RepositoryError> {
        let page = page.clamped();
        let rows = sqlx::query_as::<_, TransactionRow>(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions
             WHERE contact_id = $1 AND payment_status = 'succeeded'
             ORDER BY transacted_at DESC LIMIT $2 OFFSET $3"
        ))
        .bind(contact_id)
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Transaction::try_from).collect()
    }

    /// Record a transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create(&self, new: &NewTransaction) -> Result<Transaction, RepositoryError> {
        let row = sqlx::query_as::<_, TransactionRow>(&format!(
            "INSERT INTO transactions
                 (id, contact_id, amount, currency, fund_designation, payment_method,
                  payment_status, stripe_payment_intent_id, is_anonymous, is_recurring, notes)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
             RETURNING {TRANSACTION_COLUMNS}"
        ))
        .bind(TransactionId::generate())
        .bind(new.contact_id)
        .bind(new.amount)
        .bind(&new.currency)
        .bind(new.fund_designation.as_deref())
        .bind(new.payment_method.as_deref())
        .bind(new.payment_status.as_str())
        .bind(new.stripe_payment_intent_id.as_deref())
        .bind(new.is_anonymous)
        .bind(new.is_recurring)
        .bind(new.notes.as_deref())
        .fetch_one(self.pool)
        .await?;

        Transaction::try_from(row)
    }

    /// Update the status of a transaction by its payment intent ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no transaction carries that
    /// payment intent.
    pub async fn update_status_by_intent(
        &self,
        payment_intent_id: &str,
        status: PaymentStatus,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE transactions SET payment_status = $2 WHERE stripe_payment_intent_id = $1",
        )
        .bind(payment_intent_id)
        .bind(status.as_str())
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
