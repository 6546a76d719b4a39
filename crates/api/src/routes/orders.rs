//! Order route handlers.
//!
//! Placing an order resolves unit prices from the catalog when the client
//! does not supply them, applies per-line discount and tax percentages, and
//! optionally an order-level promo code. The shipping address comes from the
//! payload, falling back to the user's default address.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::instrument;
use uuid::Uuid;

use mercata_core::{LineAmounts, OrderId, OrderStatus, ProductId, UserId};

use crate::db::orders::{NewOrder, NewOrderItem, OrderListFilter};
use crate::db::{AddressRepository, OrderRepository, ProductRepository, PromoCodeRepository};
use crate::error::AppError;
use crate::middleware::{RequireAdmin, RequireAuth};
use crate::models::{Order, ShippingAddress, TrackingEvent, User};
use crate::response::{ApiResponse, Created};
use crate::services::pricing::OrderTotals;
use crate::state::AppState;

use super::Pagination;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(show))
        .route("/{id}/tracking", get(tracking))
        .route("/{id}/status", post(update_status))
        .route("/{id}/cancel", post(cancel))
}

// =============================================================================
// Payload / Query Types
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct OrderItemPayload {
    pub product_id: ProductId,
    pub quantity: u32,
    /// Unit price override; resolved from the catalog when absent.
    pub unit_price: Option<Decimal>,
    #[serde(default)]
    pub discount_percent: Decimal,
    #[serde(default)]
    pub tax_percent: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct ShippingAddressPayload {
    pub recipient: String,
    pub line1: String,
    pub line2: Option<String>,
    pub city: String,
    #[serde(default)]
    pub region: String,
    pub postal_code: String,
    pub country: String,
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateOrderPayload {
    pub items: Vec<OrderItemPayload>,
    /// Explicit shipping address; the user's default is used when absent.
    pub shipping_address: Option<ShippingAddressPayload>,
    pub promo_code: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct OrderListQuery {
    pub status: Option<OrderStatus>,
    pub user_id: Option<UserId>,
    pub search: Option<String>,
    pub created_after: Option<DateTime<Utc>>,
    pub created_before: Option<DateTime<Utc>>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct StatusPayload {
    pub status: OrderStatus,
    pub note: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CancelPayload {
    pub reason: Option<String>,
}

// =============================================================================
// Handlers
// =============================================================================

/// Place an order.
#[instrument(skip_all)]
async fn create(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Json(payload): Json<CreateOrderPayload>,
) -> Result<Created<Order>, AppError> {
    if payload.items.is_empty() {
        return Err(AppError::Validation(
            "order must contain at least one item".to_owned(),
        ));
    }

    // Price every line, resolving unit prices from the catalog.
    let products = ProductRepository::new(state.pool());
    let mut items = Vec::with_capacity(payload.items.len());
    let mut lines = Vec::with_capacity(payload.items.len());

    for item in &payload.items {
        validate_item(item)?;

        let product = products
            .get_by_id(item.product_id)
            .await?
            .filter(|p| p.active)
            .ok_or_else(|| {
                AppError::Validation(format!(
                    "product {} does not exist or is inactive",
                    item.product_id
                ))
            })?;

        let unit_price = item.unit_price.unwrap_or(product.price);
        let amounts = LineAmounts::compute(
            unit_price,
            item.quantity,
            item.discount_percent,
            item.tax_percent,
        );

        lines.push(amounts);
        items.push(NewOrderItem {
            product_id: product.id,
            product_name: product.name.clone(),
            sku: product.sku.clone(),
            unit_price,
            quantity: i32::try_from(item.quantity)
                .map_err(|_| AppError::Validation("quantity too large".to_owned()))?,
            discount_percent: item.discount_percent,
            tax_percent: item.tax_percent,
            line_total: amounts.total,
        });
    }

    // Promo code: validated against the discounted, pre-tax subtotal.
    let pre_promo = OrderTotals::from_lines(&lines, Decimal::ZERO);
    let promo = match &payload.promo_code {
        Some(code) => {
            let promo = PromoCodeRepository::new(state.pool())
                .get_by_code(code)
                .await?
                .ok_or_else(|| AppError::Validation(format!("unknown promo code {code}")))?;
            let discount = promo
                .discount_for(pre_promo.discounted_subtotal(), Utc::now())
                .map_err(|e| AppError::Validation(e.to_string()))?;
            Some((promo, discount))
        }
        None => None,
    };
    let promo_discount = promo.as_ref().map_or(Decimal::ZERO, |(_, d)| *d);
    let totals = OrderTotals::from_lines(&lines, promo_discount);

    // Shipping address: payload, else the user's default.
    let shipping_address =
        resolve_shipping_address(&state, &user, payload.shipping_address).await?;

    let order = OrderRepository::new(state.pool())
        .create(NewOrder {
            order_number: generate_order_number(),
            user_id: user.id,
            subtotal: totals.subtotal,
            discount_total: totals.discount_total,
            tax_total: totals.tax_total,
            total: totals.total,
            promo_code: promo.as_ref().map(|(p, _)| p.code.clone()),
            promo_discount,
            shipping_address,
            notes: payload.notes,
            items,
        })
        .await?;

    if let Some((promo, _)) = promo {
        PromoCodeRepository::new(state.pool())
            .increment_usage(promo.id)
            .await?;
    }

    state
        .notifications()
        .order_placed(user.phone.as_ref(), &order.order_number, order.total);

    Ok(Created::new("order placed", order))
}

/// Own orders; admins see all (optionally filtered).
#[instrument(skip_all)]
async fn list(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Query(query): Query<OrderListQuery>,
) -> Result<ApiResponse<Vec<Order>>, AppError> {
    let (limit, offset) = Pagination {
        page: query.page,
        per_page: query.per_page,
    }
    .limit_offset();

    let filter = if user.is_admin() {
        OrderListFilter {
            user_id: query.user_id,
            status: query.status,
            search: query.search,
            created_after: query.created_after,
            created_before: query.created_before,
        }
    } else {
        OrderListFilter {
            user_id: Some(user.id),
            status: query.status,
            ..OrderListFilter::default()
        }
    };

    let orders = OrderRepository::new(state.pool())
        .list(&filter, limit, offset)
        .await?;

    Ok(ApiResponse::ok("orders", orders))
}

/// One order, visible to its owner or any admin.
#[instrument(skip_all)]
async fn show(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
) -> Result<ApiResponse<Order>, AppError> {
    let order = fetch_visible(&state, &user, id).await?;
    Ok(ApiResponse::ok("order", order))
}

/// Tracking history, oldest first.
#[instrument(skip_all)]
async fn tracking(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
) -> Result<ApiResponse<Vec<TrackingEvent>>, AppError> {
    // Visibility check first; the history itself carries no owner info.
    fetch_visible(&state, &user, id).await?;

    let history = OrderRepository::new(state.pool())
        .tracking_history(id)
        .await?;

    Ok(ApiResponse::ok("tracking history", history))
}

/// Transition an order's status (admin only).
#[instrument(skip_all)]
async fn update_status(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
    Json(payload): Json<StatusPayload>,
) -> Result<ApiResponse<Order>, AppError> {
    let repo = OrderRepository::new(state.pool());
    let order = repo
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {id}")))?;

    if !order.status.can_transition_to(payload.status) {
        return Err(AppError::Conflict(format!(
            "cannot transition order from {} to {}",
            order.status, payload.status
        )));
    }

    let updated = repo
        .update_status(id, payload.status, payload.note.as_deref())
        .await?;

    notify_status(&state, &updated);

    Ok(ApiResponse::ok("order status updated", updated))
}

/// Cancel an order: owners while pending, admins while cancellable.
#[instrument(skip_all)]
async fn cancel(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
    Json(payload): Json<CancelPayload>,
) -> Result<ApiResponse<Order>, AppError> {
    let repo = OrderRepository::new(state.pool());
    let order = fetch_visible(&state, &user, id).await?;

    let allowed = if user.is_admin() {
        order.status.cancellable()
    } else {
        order.status == OrderStatus::Pending
    };
    if !allowed {
        return Err(AppError::Conflict(format!(
            "order in status {} can no longer be cancelled",
            order.status
        )));
    }

    let cancelled = repo.cancel(id, payload.reason.as_deref()).await?;

    notify_status(&state, &cancelled);

    Ok(ApiResponse::ok("order cancelled", cancelled))
}

// =============================================================================
// Helpers
// =============================================================================

/// Load an order, rejecting users who neither own it nor are admins.
async fn fetch_visible(state: &AppState, user: &User, id: OrderId) -> Result<Order, AppError> {
    let order = OrderRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {id}")))?;

    if order.user_id != user.id && !user.is_admin() {
        return Err(AppError::Forbidden("not your order".to_owned()));
    }

    Ok(order)
}

/// Generate a human-facing order number like `MC-4F7A21B9`.
fn generate_order_number() -> String {
    let id = Uuid::new_v4().simple().to_string();
    let suffix = id.get(..8).unwrap_or("00000000");
    format!("MC-{}", suffix.to_uppercase())
}

fn validate_item(item: &OrderItemPayload) -> Result<(), AppError> {
    if item.quantity == 0 {
        return Err(AppError::Validation(
            "quantity must be at least 1".to_owned(),
        ));
    }
    for (field, value) in [
        ("discount_percent", item.discount_percent),
        ("tax_percent", item.tax_percent),
    ] {
        if value < Decimal::ZERO || value > Decimal::from(100) {
            return Err(AppError::Validation(format!(
                "{field} must be between 0 and 100"
            )));
        }
    }
    if item.unit_price.is_some_and(|p| p < Decimal::ZERO) {
        return Err(AppError::Validation(
            "unit_price cannot be negative".to_owned(),
        ));
    }
    Ok(())
}

/// Explicit payload address, else the user's default address.
async fn resolve_shipping_address(
    state: &AppState,
    user: &User,
    explicit: Option<ShippingAddressPayload>,
) -> Result<ShippingAddress, AppError> {
    if let Some(addr) = explicit {
        for (field, value) in [
            ("recipient", &addr.recipient),
            ("line1", &addr.line1),
            ("city", &addr.city),
            ("postal_code", &addr.postal_code),
            ("country", &addr.country),
        ] {
            if value.trim().is_empty() {
                return Err(AppError::Validation(format!(
                    "shipping {field} cannot be empty"
                )));
            }
        }
        return Ok(ShippingAddress {
            recipient: addr.recipient,
            line1: addr.line1,
            line2: addr.line2,
            city: addr.city,
            region: addr.region,
            postal_code: addr.postal_code,
            country: addr.country,
            phone: addr.phone,
        });
    }

    // Fall back to the default address; no address at all is a validation error.
    let default = AddressRepository::new(state.pool())
        .get_default(user.id)
        .await?
        .ok_or_else(|| {
            AppError::Validation(
                "no shipping address supplied and no default address on file".to_owned(),
            )
        })?;

    Ok(ShippingAddress {
        recipient: default.recipient,
        line1: default.line1,
        line2: default.line2,
        city: default.city,
        region: default.region,
        postal_code: default.postal_code,
        country: default.country,
        phone: default.phone,
    })
}

fn notify_status(state: &AppState, order: &Order) {
    let phone = order.shipping_address.phone.as_deref();
    let parsed = phone.and_then(|p| mercata_core::Phone::parse(p).ok());
    state
        .notifications()
        .order_status_changed(parsed.as_ref(), &order.order_number, order.status);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_number_shape() {
        let number = generate_order_number();
        assert!(number.starts_with("MC-"));
        assert_eq!(number.len(), 11);
        assert!(
            number
                .trim_start_matches("MC-")
                .chars()
                .all(|c| c.is_ascii_hexdigit())
        );
    }

    #[test]
    fn test_order_numbers_are_unique_enough() {
        let a = generate_order_number();
        let b = generate_order_number();
        assert_ne!(a, b);
    }

    #[test]
    fn test_validate_item_zero_quantity() {
        let item = OrderItemPayload {
            product_id: ProductId::new(1),
            quantity: 0,
            unit_price: None,
            discount_percent: Decimal::ZERO,
            tax_percent: Decimal::ZERO,
        };
        assert!(validate_item(&item).is_err());
    }

    #[test]
    fn test_validate_item_discount_out_of_range() {
        let item = OrderItemPayload {
            product_id: ProductId::new(1),
            quantity: 1,
            unit_price: None,
            discount_percent: Decimal::from(101),
            tax_percent: Decimal::ZERO,
        };
        assert!(validate_item(&item).is_err());
    }

    #[test]
    fn test_validate_item_ok_at_boundaries() {
        let item = OrderItemPayload {
            product_id: ProductId::new(1),
            quantity: 1,
            unit_price: Some(Decimal::ZERO),
            discount_percent: Decimal::from(100),
            tax_percent: Decimal::ZERO,
        };
        assert!(validate_item(&item).is_ok());
    }
}
