//! Transaction repository.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use mercata_core::{PaymentMethod, TransactionId, TransactionStatus};

use super::RepositoryError;
use crate::models::Transaction;

const TRANSACTION_COLUMNS: &str = "id, order_number, amount, currency, method, status, \
     reference, refunded_amount, refund_reason, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct TransactionRow {
    id: i32,
    order_number: String,
    amount: Decimal,
    currency: String,
    method: PaymentMethod,
    status: TransactionStatus,
    reference: Option<String>,
    refunded_amount: Decimal,
    refund_reason: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<TransactionRow> for Transaction {
    fn from(row: TransactionRow) -> Self {
        Self {
            id: TransactionId::new(row.id),
            order_number: row.order_number,
            amount: row.amount,
            currency: row.currency,
            method: row.method,
            status: row.status,
            reference: row.reference,
            refunded_amount: row.refunded_amount,
            refund_reason: row.refund_reason,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Fields for recording a transaction.
#[derive(Debug)]
pub struct NewTransaction<'a> {
    pub order_number: &'a str,
    pub amount: Decimal,
    pub currency: &'a str,
    pub method: PaymentMethod,
    pub status: TransactionStatus,
    pub reference: Option<&'a str>,
}

/// Filters for the transaction listing.
#[derive(Debug, Default)]
pub struct TransactionListFilter {
    pub order_number: Option<String>,
    pub status: Option<TransactionStatus>,
    pub method: Option<PaymentMethod>,
}

/// Repository for transaction database operations.
pub struct TransactionRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> TransactionRepository<'a> {
    /// Create a new transaction repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Record a transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(
        &self,
        new_transaction: NewTransaction<'_>,
    ) -> Result<Transaction, RepositoryError> {
        let row = sqlx::query_as::<_, TransactionRow>(&format!(
            "INSERT INTO transactions (order_number, amount, currency, method, status, reference)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {TRANSACTION_COLUMNS}"
        ))
        .bind(new_transaction.order_number)
        .bind(new_transaction.amount)
        .bind(new_transaction.currency)
        .bind(new_transaction.method)
        .bind(new_transaction.status)
        .bind(new_transaction.reference)
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }

    /// Get a transaction by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(
        &self,
        id: TransactionId,
    ) -> Result<Option<Transaction>, RepositoryError> {
        let row = sqlx::query_as::<_, TransactionRow>(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// List transactions with filters and pagination, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        filter: &TransactionListFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Transaction>, RepositoryError> {
        let rows = sqlx::query_as::<_, TransactionRow>(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions
             WHERE ($1::text IS NULL OR order_number = $1)
               AND ($2::transaction_status IS NULL OR status = $2)
               AND ($3::payment_method IS NULL OR method = $3)
             ORDER BY created_at DESC
             LIMIT $4 OFFSET $5"
        ))
        .bind(&filter.order_number)
        .bind(filter.status)
        .bind(filter.method)
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Apply a refund, accumulating `refunded_amount` and flipping the
    /// status to `refunded` once fully refunded.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the transaction doesn't exist.
    pub async fn apply_refund(
        &self,
        id: TransactionId,
        refund_amount: Decimal,
        reason: Option<&str>,
        fully_refunded: bool,
    ) -> Result<Transaction, RepositoryError> {
        let status = if fully_refunded {
            TransactionStatus::Refunded
        } else {
            TransactionStatus::Completed
        };

        let row = sqlx::query_as::<_, TransactionRow>(&format!(
            "UPDATE transactions
             SET refunded_amount = refunded_amount + $1, refund_reason = $2, status = $3,
                 updated_at = now()
             WHERE id = $4
             RETURNING {TRANSACTION_COLUMNS}"
        ))
        .bind(refund_amount)
        .bind(reason)
        .bind(status)
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Ok(row.into())
    }

    /// Void a transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the transaction doesn't exist.
    pub async fn void(&self, id: TransactionId) -> Result<Transaction, RepositoryError> {
        let row = sqlx::query_as::<_, TransactionRow>(&format!(
            "UPDATE transactions SET status = $1, updated_at = now()
             WHERE id = $2
             RETURNING {TRANSACTION_COLUMNS}"
        ))
        .bind(TransactionStatus::Voided)
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Ok(row.into())
    }

    /// Whether an order with the given number exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn order_exists(&self, order_number: &str) -> Result<bool, RepositoryError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE order_number = $1")
                .bind(order_number)
                .fetch_one(self.pool)
                .await?;

        Ok(count > 0)
    }
}
