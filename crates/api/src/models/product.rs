//! Product domain type.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use mercata_core::{BrandId, CategoryId, ProductId, Slug, StockStatus};

/// A catalog product (domain type).
///
/// `stock_status` is derived from `stock` against `low_stock_threshold` on
/// every save; it is stored so listings can filter on it without recomputing.
#[derive(Debug, Clone, Serialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub slug: Slug,
    pub sku: String,
    pub description: String,
    pub price: Decimal,
    pub compare_at_price: Option<Decimal>,
    pub brand_id: Option<BrandId>,
    pub category_ids: Vec<CategoryId>,
    pub stock: i32,
    pub track_quantity: bool,
    pub low_stock_threshold: i32,
    pub stock_status: StockStatus,
    pub featured: bool,
    pub featured_order: i32,
    pub featured_until: Option<DateTime<Utc>>,
    pub active: bool,
    pub image_urls: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Whether this product belongs in the public featured listing at `now`.
    ///
    /// The featured flag must be set and the optional expiry must not have
    /// passed. An expiry exactly equal to `now` counts as expired.
    #[must_use]
    pub fn is_featured_at(&self, now: DateTime<Utc>) -> bool {
        self.featured && self.featured_until.is_none_or(|until| until > now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn product(featured: bool, featured_until: Option<DateTime<Utc>>) -> Product {
        Product {
            id: ProductId::new(1),
            name: "Gooseneck Kettle".to_string(),
            slug: Slug::generate("Gooseneck Kettle"),
            sku: "KET-001".to_string(),
            description: String::new(),
            price: Decimal::new(5900, 2),
            compare_at_price: None,
            brand_id: None,
            category_ids: vec![],
            stock: 10,
            track_quantity: true,
            low_stock_threshold: 5,
            stock_status: StockStatus::InStock,
            featured,
            featured_order: 0,
            featured_until,
            active: true,
            image_urls: vec![],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_featured_without_expiry() {
        let now = Utc::now();
        assert!(product(true, None).is_featured_at(now));
    }

    #[test]
    fn test_featured_future_expiry() {
        let now = Utc::now();
        assert!(product(true, Some(now + Duration::hours(1))).is_featured_at(now));
    }

    #[test]
    fn test_featured_past_expiry_excluded() {
        let now = Utc::now();
        assert!(!product(true, Some(now - Duration::hours(1))).is_featured_at(now));
    }

    #[test]
    fn test_not_featured_flag_wins() {
        let now = Utc::now();
        assert!(!product(false, Some(now + Duration::hours(1))).is_featured_at(now));
    }
}
