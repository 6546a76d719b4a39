//! Order repository.
//!
//! Pricing happens in the service layer; this module persists fully-computed
//! orders. Order + items + the initial tracking event are written in one
//! transaction so a failed insert never leaves a partial order behind.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use mercata_core::{OrderId, OrderItemId, OrderStatus, ProductId, UserId};

use super::RepositoryError;
use crate::models::{Order, OrderItem, ShippingAddress, TrackingEvent};

const ORDER_COLUMNS: &str = "id, order_number, user_id, status, subtotal, discount_total, \
     tax_total, total, promo_code, promo_discount, ship_recipient, ship_line1, ship_line2, \
     ship_city, ship_region, ship_postal_code, ship_country, ship_phone, notes, \
     cancelled_at, cancel_reason, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: i32,
    order_number: String,
    user_id: i32,
    status: OrderStatus,
    subtotal: Decimal,
    discount_total: Decimal,
    tax_total: Decimal,
    total: Decimal,
    promo_code: Option<String>,
    promo_discount: Decimal,
    ship_recipient: String,
    ship_line1: String,
    ship_line2: Option<String>,
    ship_city: String,
    ship_region: String,
    ship_postal_code: String,
    ship_country: String,
    ship_phone: Option<String>,
    notes: Option<String>,
    cancelled_at: Option<DateTime<Utc>>,
    cancel_reason: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl OrderRow {
    fn into_order(self, items: Vec<OrderItem>) -> Order {
        Order {
            id: OrderId::new(self.id),
            order_number: self.order_number,
            user_id: UserId::new(self.user_id),
            status: self.status,
            subtotal: self.subtotal,
            discount_total: self.discount_total,
            tax_total: self.tax_total,
            total: self.total,
            promo_code: self.promo_code,
            promo_discount: self.promo_discount,
            shipping_address: ShippingAddress {
                recipient: self.ship_recipient,
                line1: self.ship_line1,
                line2: self.ship_line2,
                city: self.ship_city,
                region: self.ship_region,
                postal_code: self.ship_postal_code,
                country: self.ship_country,
                phone: self.ship_phone,
            },
            notes: self.notes,
            cancelled_at: self.cancelled_at,
            cancel_reason: self.cancel_reason,
            items,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct OrderItemRow {
    id: i32,
    product_id: i32,
    product_name: String,
    sku: String,
    unit_price: Decimal,
    quantity: i32,
    discount_percent: Decimal,
    tax_percent: Decimal,
    line_total: Decimal,
}

impl From<OrderItemRow> for OrderItem {
    fn from(row: OrderItemRow) -> Self {
        Self {
            id: OrderItemId::new(row.id),
            product_id: ProductId::new(row.product_id),
            product_name: row.product_name,
            sku: row.sku,
            unit_price: row.unit_price,
            quantity: row.quantity,
            discount_percent: row.discount_percent,
            tax_percent: row.tax_percent,
            line_total: row.line_total,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct TrackingRow {
    status: OrderStatus,
    note: Option<String>,
    created_at: DateTime<Utc>,
}

/// A fully-priced line item ready for persistence.
#[derive(Debug)]
pub struct NewOrderItem {
    pub product_id: ProductId,
    pub product_name: String,
    pub sku: String,
    pub unit_price: Decimal,
    pub quantity: i32,
    pub discount_percent: Decimal,
    pub tax_percent: Decimal,
    pub line_total: Decimal,
}

/// A fully-priced order ready for persistence.
#[derive(Debug)]
pub struct NewOrder {
    pub order_number: String,
    pub user_id: UserId,
    pub subtotal: Decimal,
    pub discount_total: Decimal,
    pub tax_total: Decimal,
    pub total: Decimal,
    pub promo_code: Option<String>,
    pub promo_discount: Decimal,
    pub shipping_address: ShippingAddress,
    pub notes: Option<String>,
    pub items: Vec<NewOrderItem>,
}

/// Filters for the admin order listing.
#[derive(Debug, Default)]
pub struct OrderListFilter {
    pub user_id: Option<UserId>,
    pub status: Option<OrderStatus>,
    /// Case-insensitive match against the order number.
    pub search: Option<String>,
    pub created_after: Option<DateTime<Utc>>,
    pub created_before: Option<DateTime<Utc>>,
}

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Persist an order with its items and the initial tracking event.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` on an order-number collision.
    pub async fn create(&self, new_order: NewOrder) -> Result<Order, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let order_id: i32 = sqlx::query_scalar(
            "INSERT INTO orders
                 (order_number, user_id, subtotal, discount_total, tax_total, total,
                  promo_code, promo_discount, ship_recipient, ship_line1, ship_line2,
                  ship_city, ship_region, ship_postal_code, ship_country, ship_phone, notes)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
             RETURNING id",
        )
        .bind(&new_order.order_number)
        .bind(new_order.user_id)
        .bind(new_order.subtotal)
        .bind(new_order.discount_total)
        .bind(new_order.tax_total)
        .bind(new_order.total)
        .bind(&new_order.promo_code)
        .bind(new_order.promo_discount)
        .bind(&new_order.shipping_address.recipient)
        .bind(&new_order.shipping_address.line1)
        .bind(&new_order.shipping_address.line2)
        .bind(&new_order.shipping_address.city)
        .bind(&new_order.shipping_address.region)
        .bind(&new_order.shipping_address.postal_code)
        .bind(&new_order.shipping_address.country)
        .bind(&new_order.shipping_address.phone)
        .bind(&new_order.notes)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| RepositoryError::from_sqlx(e, "order number already exists"))?;

        for item in &new_order.items {
            sqlx::query(
                "INSERT INTO order_items
                     (order_id, product_id, product_name, sku, unit_price, quantity,
                      discount_percent, tax_percent, line_total)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
            )
            .bind(order_id)
            .bind(item.product_id)
            .bind(&item.product_name)
            .bind(&item.sku)
            .bind(item.unit_price)
            .bind(item.quantity)
            .bind(item.discount_percent)
            .bind(item.tax_percent)
            .bind(item.line_total)
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query("INSERT INTO order_tracking (order_id, status, note) VALUES ($1, $2, $3)")
            .bind(order_id)
            .bind(OrderStatus::Pending)
            .bind("order placed")
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        self.get_by_id(OrderId::new(order_id))
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// Get an order with its items.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        let Some(row) = row else { return Ok(None) };
        let items = self.items_for(id).await?;
        Ok(Some(row.into_order(items)))
    }

    /// List orders with filters and pagination, newest first. Items are
    /// loaded per order; listings are paginated so the fan-out stays small.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        filter: &OrderListFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Order>, RepositoryError> {
        let pattern = filter.search.as_ref().map(|s| format!("%{s}%"));

        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders
             WHERE ($1::integer IS NULL OR user_id = $1)
               AND ($2::order_status IS NULL OR status = $2)
               AND ($3::text IS NULL OR order_number ILIKE $3)
               AND ($4::timestamptz IS NULL OR created_at >= $4)
               AND ($5::timestamptz IS NULL OR created_at < $5)
             ORDER BY created_at DESC
             LIMIT $6 OFFSET $7"
        ))
        .bind(filter.user_id)
        .bind(filter.status)
        .bind(pattern)
        .bind(filter.created_after)
        .bind(filter.created_before)
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool)
        .await?;

        let mut orders = Vec::with_capacity(rows.len());
        for row in rows {
            let items = self.items_for(OrderId::new(row.id)).await?;
            orders.push(row.into_order(items));
        }
        Ok(orders)
    }

    /// Transition an order's status and append a tracking event.
    ///
    /// The transition itself must already be validated against
    /// `OrderStatus::can_transition_to`; this method only persists it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order doesn't exist.
    pub async fn update_status(
        &self,
        id: OrderId,
        status: OrderStatus,
        note: Option<&str>,
    ) -> Result<Order, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "UPDATE orders SET status = $1, updated_at = now() WHERE id = $2",
        )
        .bind(status)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        sqlx::query("INSERT INTO order_tracking (order_id, status, note) VALUES ($1, $2, $3)")
            .bind(id)
            .bind(status)
            .bind(note)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        self.get_by_id(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Cancel an order, recording the reason and appending a tracking event.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order doesn't exist.
    pub async fn cancel(
        &self,
        id: OrderId,
        reason: Option<&str>,
    ) -> Result<Order, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "UPDATE orders
             SET status = $1, cancelled_at = now(), cancel_reason = $2, updated_at = now()
             WHERE id = $3",
        )
        .bind(OrderStatus::Cancelled)
        .bind(reason)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        sqlx::query("INSERT INTO order_tracking (order_id, status, note) VALUES ($1, $2, $3)")
            .bind(id)
            .bind(OrderStatus::Cancelled)
            .bind(reason)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        self.get_by_id(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Tracking history for an order, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn tracking_history(
        &self,
        id: OrderId,
    ) -> Result<Vec<TrackingEvent>, RepositoryError> {
        let rows = sqlx::query_as::<_, TrackingRow>(
            "SELECT status, note, created_at FROM order_tracking
             WHERE order_id = $1
             ORDER BY created_at ASC, id ASC",
        )
        .bind(id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| TrackingEvent {
                status: row.status,
                note: row.note,
                created_at: row.created_at,
            })
            .collect())
    }

    async fn items_for(&self, id: OrderId) -> Result<Vec<OrderItem>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderItemRow>(
            "SELECT id, product_id, product_name, sku, unit_price, quantity,
                    discount_percent, tax_percent, line_total
             FROM order_items WHERE order_id = $1 ORDER BY id",
        )
        .bind(id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
