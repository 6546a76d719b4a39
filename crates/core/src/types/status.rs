//! Status enums shared across the API and CLI.
//!
//! Each enum maps to a `PostgreSQL` enum type of the same name (created by
//! the API crate's migrations) via `sqlx::Type` when the `postgres` feature
//! is enabled.

use serde::{Deserialize, Serialize};

/// User role determining API privileges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "user_role", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Full access to catalog, orders, transactions, and user management.
    Admin,
    /// Regular shopper account.
    #[default]
    User,
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Admin => write!(f, "admin"),
            Self::User => write!(f, "user"),
        }
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "user" => Ok(Self::User),
            _ => Err(format!("invalid user role: {s}")),
        }
    }
}

/// Product stock status, derived from the stock level on every save.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "stock_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    #[default]
    InStock,
    LowStock,
    OutOfStock,
}

impl StockStatus {
    /// Derive the stock status from the tracked quantity.
    ///
    /// Products that do not track quantity are always in stock. A tracked
    /// product with zero stock is out of stock regardless of any previous
    /// status; at or below the threshold it is low stock.
    #[must_use]
    pub const fn derive(track_quantity: bool, stock: i32, low_stock_threshold: i32) -> Self {
        if !track_quantity {
            return Self::InStock;
        }
        if stock <= 0 {
            Self::OutOfStock
        } else if stock <= low_stock_threshold {
            Self::LowStock
        } else {
            Self::InStock
        }
    }
}

/// Order lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "order_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Whether a transition from `self` to `next` is allowed.
    ///
    /// Forward-only flow with cancellation permitted before shipping:
    /// pending -> processing | cancelled, processing -> shipped | cancelled,
    /// shipped -> delivered. Delivered and cancelled are terminal.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Processing | Self::Cancelled)
                | (Self::Processing, Self::Shipped | Self::Cancelled)
                | (Self::Shipped, Self::Delivered)
        )
    }

    /// Whether the order can still be cancelled from this status.
    #[must_use]
    pub const fn cancellable(self) -> bool {
        matches!(self, Self::Pending | Self::Processing)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        };
        write!(f, "{s}")
    }
}

/// Payment transaction status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "transaction_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    #[default]
    Pending,
    Completed,
    Failed,
    Refunded,
    Voided,
}

/// Payment method recorded on a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "payment_method", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Card,
    Paypal,
    BankTransfer,
    CashOnDelivery,
}

/// How a promo code discounts an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "discount_kind", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum DiscountKind {
    /// Percentage of the order subtotal (0-100).
    Percentage,
    /// Fixed amount off the order subtotal.
    Fixed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stock_status_untracked_is_in_stock() {
        assert_eq!(StockStatus::derive(false, 0, 5), StockStatus::InStock);
    }

    #[test]
    fn test_stock_status_zero_stock() {
        assert_eq!(StockStatus::derive(true, 0, 5), StockStatus::OutOfStock);
    }

    #[test]
    fn test_stock_status_negative_stock() {
        assert_eq!(StockStatus::derive(true, -3, 5), StockStatus::OutOfStock);
    }

    #[test]
    fn test_stock_status_at_threshold() {
        assert_eq!(StockStatus::derive(true, 5, 5), StockStatus::LowStock);
    }

    #[test]
    fn test_stock_status_above_threshold() {
        assert_eq!(StockStatus::derive(true, 6, 5), StockStatus::InStock);
    }

    #[test]
    fn test_order_transitions_forward() {
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Processing));
        assert!(OrderStatus::Processing.can_transition_to(OrderStatus::Shipped));
        assert!(OrderStatus::Shipped.can_transition_to(OrderStatus::Delivered));
    }

    #[test]
    fn test_order_transitions_cancel() {
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Cancelled));
        assert!(OrderStatus::Processing.can_transition_to(OrderStatus::Cancelled));
        assert!(!OrderStatus::Shipped.can_transition_to(OrderStatus::Cancelled));
    }

    #[test]
    fn test_order_transitions_rejected() {
        assert!(!OrderStatus::Pending.can_transition_to(OrderStatus::Shipped));
        assert!(!OrderStatus::Delivered.can_transition_to(OrderStatus::Processing));
        assert!(!OrderStatus::Cancelled.can_transition_to(OrderStatus::Pending));
        assert!(!OrderStatus::Pending.can_transition_to(OrderStatus::Pending));
    }

    #[test]
    fn test_cancellable() {
        assert!(OrderStatus::Pending.cancellable());
        assert!(OrderStatus::Processing.cancellable());
        assert!(!OrderStatus::Shipped.cancellable());
        assert!(!OrderStatus::Delivered.cancellable());
        assert!(!OrderStatus::Cancelled.cancellable());
    }

    #[test]
    fn test_role_parse_roundtrip() {
        let role: UserRole = "admin".parse().expect("valid role");
        assert_eq!(role, UserRole::Admin);
        assert_eq!(role.to_string(), "admin");
        assert!("owner".parse::<UserRole>().is_err());
    }
}
