//! Order domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use mercata_core::{OrderId, OrderItemId, OrderStatus, ProductId, UserId};

/// Shipping address snapshot denormalized onto an order.
#[derive(Debug, Clone, Serialize)]
pub struct ShippingAddress {
    pub recipient: String,
    pub line1: String,
    pub line2: Option<String>,
    pub city: String,
    pub region: String,
    pub postal_code: String,
    pub country: String,
    pub phone: Option<String>,
}

/// A customer order (domain type).
#[derive(Debug, Clone, Serialize)]
pub struct Order {
    pub id: OrderId,
    /// Human-facing order number, e.g. `MC-4F7A21B9`.
    pub order_number: String,
    pub user_id: UserId,
    pub status: OrderStatus,
    pub subtotal: Decimal,
    pub discount_total: Decimal,
    pub tax_total: Decimal,
    pub total: Decimal,
    /// Promo code applied at checkout, if any (snapshot of the code string).
    pub promo_code: Option<String>,
    pub promo_discount: Decimal,
    pub shipping_address: ShippingAddress,
    pub notes: Option<String>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub cancel_reason: Option<String>,
    pub items: Vec<OrderItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A single order line, with the product snapshot taken at order time.
#[derive(Debug, Clone, Serialize)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub product_id: ProductId,
    pub product_name: String,
    pub sku: String,
    pub unit_price: Decimal,
    pub quantity: i32,
    pub discount_percent: Decimal,
    pub tax_percent: Decimal,
    pub line_total: Decimal,
}

/// One entry in an order's tracking history append-log.
#[derive(Debug, Clone, Serialize)]
pub struct TrackingEvent {
    pub status: OrderStatus,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}
