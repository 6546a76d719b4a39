//! Transaction domain type.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use mercata_core::{PaymentMethod, TransactionId, TransactionStatus};

/// A payment record tied to an order by its denormalized order number.
#[derive(Debug, Clone, Serialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub order_number: String,
    pub amount: Decimal,
    pub currency: String,
    pub method: PaymentMethod,
    pub status: TransactionStatus,
    /// Gateway-assigned reference, if the payment went through a gateway.
    pub reference: Option<String>,
    /// Accumulated refunds; equals `amount` once fully refunded.
    pub refunded_amount: Decimal,
    pub refund_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    /// Amount still available to refund.
    #[must_use]
    pub fn refundable(&self) -> Decimal {
        self.amount - self.refunded_amount
    }
}
