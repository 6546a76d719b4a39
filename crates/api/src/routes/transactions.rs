//! Transaction route handlers (admin only).
//!
//! Transactions are records of payments tied to orders by order number;
//! nothing here talks to a payment gateway.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::instrument;

use mercata_core::{PaymentMethod, TransactionId, TransactionStatus};

use crate::db::TransactionRepository;
use crate::db::transactions::{NewTransaction, TransactionListFilter};
use crate::error::AppError;
use crate::middleware::RequireAdmin;
use crate::models::Transaction;
use crate::response::{ApiResponse, Created};
use crate::state::AppState;

use super::Pagination;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(show))
        .route("/{id}/refund", post(refund))
        .route("/{id}/void", post(void))
}

#[derive(Debug, Deserialize)]
pub struct TransactionListQuery {
    pub order_number: Option<String>,
    pub status: Option<TransactionStatus>,
    pub method: Option<PaymentMethod>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct CreateTransactionPayload {
    pub order_number: String,
    pub amount: Decimal,
    #[serde(default = "default_currency")]
    pub currency: String,
    pub method: PaymentMethod,
    #[serde(default)]
    pub completed: bool,
    pub reference: Option<String>,
}

fn default_currency() -> String {
    "USD".to_string()
}

#[derive(Debug, Deserialize)]
pub struct RefundPayload {
    /// Refund amount; a full refund of the remaining balance when absent.
    pub amount: Option<Decimal>,
    pub reason: Option<String>,
}

#[instrument(skip_all)]
async fn list(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(query): Query<TransactionListQuery>,
) -> Result<ApiResponse<Vec<Transaction>>, AppError> {
    let (limit, offset) = Pagination {
        page: query.page,
        per_page: query.per_page,
    }
    .limit_offset();
    let filter = TransactionListFilter {
        order_number: query.order_number,
        status: query.status,
        method: query.method,
    };

    let transactions = TransactionRepository::new(state.pool())
        .list(&filter, limit, offset)
        .await?;

    Ok(ApiResponse::ok("transactions", transactions))
}

#[instrument(skip_all)]
async fn show(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<TransactionId>,
) -> Result<ApiResponse<Transaction>, AppError> {
    let transaction = TransactionRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("transaction {id}")))?;

    Ok(ApiResponse::ok("transaction", transaction))
}

/// Record a payment against an order.
#[instrument(skip_all)]
async fn create(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Json(payload): Json<CreateTransactionPayload>,
) -> Result<Created<Transaction>, AppError> {
    if payload.amount <= Decimal::ZERO {
        return Err(AppError::Validation("amount must be positive".to_owned()));
    }

    let repo = TransactionRepository::new(state.pool());
    if !repo.order_exists(&payload.order_number).await? {
        return Err(AppError::Validation(format!(
            "no order with number {}",
            payload.order_number
        )));
    }

    let status = if payload.completed {
        TransactionStatus::Completed
    } else {
        TransactionStatus::Pending
    };

    let transaction = repo
        .create(NewTransaction {
            order_number: payload.order_number.trim(),
            amount: payload.amount,
            currency: payload.currency.trim(),
            method: payload.method,
            status,
            reference: payload.reference.as_deref(),
        })
        .await?;

    Ok(Created::new("transaction recorded", transaction))
}

/// Refund a completed transaction, partially or in full. Partial refunds
/// accumulate; refunding past the original amount is rejected.
#[instrument(skip_all)]
async fn refund(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<TransactionId>,
    Json(payload): Json<RefundPayload>,
) -> Result<ApiResponse<Transaction>, AppError> {
    let repo = TransactionRepository::new(state.pool());
    let transaction = repo
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("transaction {id}")))?;

    if !matches!(transaction.status, TransactionStatus::Completed) {
        return Err(AppError::Conflict(format!(
            "only completed transactions can be refunded (status: {:?})",
            transaction.status
        )));
    }

    let remaining = transaction.refundable();
    let amount = payload.amount.unwrap_or(remaining);

    if amount <= Decimal::ZERO {
        return Err(AppError::Validation(
            "refund amount must be positive".to_owned(),
        ));
    }
    if amount > remaining {
        return Err(AppError::Validation(format!(
            "refund amount {amount} exceeds refundable balance {remaining}"
        )));
    }

    let fully_refunded = amount == remaining;
    let updated = repo
        .apply_refund(id, amount, payload.reason.as_deref(), fully_refunded)
        .await?;

    Ok(ApiResponse::ok("refund applied", updated))
}

/// Void a pending transaction.
#[instrument(skip_all)]
async fn void(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<TransactionId>,
) -> Result<ApiResponse<Transaction>, AppError> {
    let repo = TransactionRepository::new(state.pool());
    let transaction = repo
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("transaction {id}")))?;

    if !matches!(transaction.status, TransactionStatus::Pending) {
        return Err(AppError::Conflict(format!(
            "only pending transactions can be voided (status: {:?})",
            transaction.status
        )));
    }

    let updated = repo.void(id).await?;

    Ok(ApiResponse::ok("transaction voided", updated))
}
