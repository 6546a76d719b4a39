//! Product repository.
//!
//! Stock status is derived in Rust (`StockStatus::derive`) and written on
//! every create/update/stock change, so a tracked product with zero stock is
//! `out_of_stock` after save regardless of its prior status.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use mercata_core::{BrandId, CategoryId, ProductId, Slug, StockStatus};

use super::RepositoryError;
use crate::models::Product;

const PRODUCT_COLUMNS: &str = "p.id, p.name, p.slug, p.sku, p.description, p.price, \
     p.compare_at_price, p.brand_id, p.stock, p.track_quantity, p.low_stock_threshold, \
     p.stock_status, p.featured, p.featured_order, p.featured_until, p.active, \
     p.image_urls, p.created_at, p.updated_at, \
     ARRAY(SELECT pc.category_id FROM product_categories pc \
           WHERE pc.product_id = p.id ORDER BY pc.category_id) AS category_ids";

/// Internal row type for product queries.
#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: i32,
    name: String,
    slug: String,
    sku: String,
    description: String,
    price: Decimal,
    compare_at_price: Option<Decimal>,
    brand_id: Option<i32>,
    stock: i32,
    track_quantity: bool,
    low_stock_threshold: i32,
    stock_status: StockStatus,
    featured: bool,
    featured_order: i32,
    featured_until: Option<DateTime<Utc>>,
    active: bool,
    image_urls: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    category_ids: Vec<i32>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: ProductId::new(row.id),
            name: row.name,
            slug: Slug::from_trusted(row.slug),
            sku: row.sku,
            description: row.description,
            price: row.price,
            compare_at_price: row.compare_at_price,
            brand_id: row.brand_id.map(BrandId::new),
            category_ids: row.category_ids.into_iter().map(CategoryId::new).collect(),
            stock: row.stock,
            track_quantity: row.track_quantity,
            low_stock_threshold: row.low_stock_threshold,
            stock_status: row.stock_status,
            featured: row.featured,
            featured_order: row.featured_order,
            featured_until: row.featured_until,
            active: row.active,
            image_urls: row.image_urls,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Fields for creating or updating a product.
#[derive(Debug)]
pub struct ProductInput<'a> {
    pub name: &'a str,
    pub slug: &'a Slug,
    pub sku: &'a str,
    pub description: &'a str,
    pub price: Decimal,
    pub compare_at_price: Option<Decimal>,
    pub brand_id: Option<BrandId>,
    pub category_ids: &'a [CategoryId],
    pub stock: i32,
    pub track_quantity: bool,
    pub low_stock_threshold: i32,
    pub image_urls: &'a [String],
}

/// Filters for the public product listing.
#[derive(Debug, Default)]
pub struct ProductListFilter {
    pub category_id: Option<CategoryId>,
    pub brand_id: Option<BrandId>,
    pub stock_status: Option<StockStatus>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    /// Case-insensitive match against name or SKU.
    pub search: Option<String>,
    /// Include inactive products (admin listings only).
    pub include_inactive: bool,
}

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List products with filters and pagination, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        filter: &ProductListFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Product>, RepositoryError> {
        let pattern = filter.search.as_ref().map(|s| format!("%{s}%"));

        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products p
             WHERE ($1 OR p.active)
               AND ($2::integer IS NULL OR EXISTS (
                    SELECT 1 FROM product_categories pc
                    WHERE pc.product_id = p.id AND pc.category_id = $2))
               AND ($3::integer IS NULL OR p.brand_id = $3)
               AND ($4::stock_status IS NULL OR p.stock_status = $4)
               AND ($5::numeric IS NULL OR p.price >= $5)
               AND ($6::numeric IS NULL OR p.price <= $6)
               AND ($7::text IS NULL OR p.name ILIKE $7 OR p.sku ILIKE $7)
             ORDER BY p.created_at DESC
             LIMIT $8 OFFSET $9"
        ))
        .bind(filter.include_inactive)
        .bind(filter.category_id)
        .bind(filter.brand_id)
        .bind(filter.stock_status)
        .bind(filter.min_price)
        .bind(filter.max_price)
        .bind(pattern)
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// List products for the public featured slot.
    ///
    /// A product qualifies when the featured flag is set and the optional
    /// `featured_until` has not passed, ordered by `featured_order` then
    /// newest.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_featured(&self, limit: i64) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products p
             WHERE p.active AND p.featured
               AND (p.featured_until IS NULL OR p.featured_until > now())
             ORDER BY p.featured_order, p.created_at DESC
             LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Get a product by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products p WHERE p.id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Get a product by its slug.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_slug(&self, slug: &str) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products p WHERE p.slug = $1"
        ))
        .bind(slug)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Create a product and its category links.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the SKU or slug already exists.
    pub async fn create(&self, input: ProductInput<'_>) -> Result<Product, RepositoryError> {
        let stock_status =
            StockStatus::derive(input.track_quantity, input.stock, input.low_stock_threshold);

        let mut tx = self.pool.begin().await?;

        let product_id: i32 = sqlx::query_scalar(
            "INSERT INTO products
                 (name, slug, sku, description, price, compare_at_price, brand_id,
                  stock, track_quantity, low_stock_threshold, stock_status, image_urls)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
             RETURNING id",
        )
        .bind(input.name)
        .bind(input.slug)
        .bind(input.sku)
        .bind(input.description)
        .bind(input.price)
        .bind(input.compare_at_price)
        .bind(input.brand_id)
        .bind(input.stock)
        .bind(input.track_quantity)
        .bind(input.low_stock_threshold)
        .bind(stock_status)
        .bind(input.image_urls)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| RepositoryError::from_sqlx(e, "product sku or slug already exists"))?;

        link_categories(&mut tx, product_id, input.category_ids).await?;

        tx.commit().await?;

        self.get_by_id(ProductId::new(product_id))
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// Update a product and replace its category links.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    /// Returns `RepositoryError::Conflict` if the new SKU or slug collides.
    pub async fn update(
        &self,
        id: ProductId,
        input: ProductInput<'_>,
    ) -> Result<Product, RepositoryError> {
        let stock_status =
            StockStatus::derive(input.track_quantity, input.stock, input.low_stock_threshold);

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "UPDATE products
             SET name = $1, slug = $2, sku = $3, description = $4, price = $5,
                 compare_at_price = $6, brand_id = $7, stock = $8, track_quantity = $9,
                 low_stock_threshold = $10, stock_status = $11, image_urls = $12,
                 updated_at = now()
             WHERE id = $13",
        )
        .bind(input.name)
        .bind(input.slug)
        .bind(input.sku)
        .bind(input.description)
        .bind(input.price)
        .bind(input.compare_at_price)
        .bind(input.brand_id)
        .bind(input.stock)
        .bind(input.track_quantity)
        .bind(input.low_stock_threshold)
        .bind(stock_status)
        .bind(input.image_urls)
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(|e| RepositoryError::from_sqlx(e, "product sku or slug already exists"))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        sqlx::query("DELETE FROM product_categories WHERE product_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        link_categories(&mut tx, id.as_i32(), input.category_ids).await?;

        tx.commit().await?;

        self.get_by_id(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Set the stock level, re-deriving the stock status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    pub async fn set_stock(&self, id: ProductId, stock: i32) -> Result<Product, RepositoryError> {
        // Fetch tracking settings first so the derived status matches them.
        let row: Option<(bool, i32)> = sqlx::query_as(
            "SELECT track_quantity, low_stock_threshold FROM products WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        let (track_quantity, threshold) = row.ok_or(RepositoryError::NotFound)?;
        let stock_status = StockStatus::derive(track_quantity, stock, threshold);

        sqlx::query(
            "UPDATE products SET stock = $1, stock_status = $2, updated_at = now()
             WHERE id = $3",
        )
        .bind(stock)
        .bind(stock_status)
        .bind(id)
        .execute(self.pool)
        .await?;

        self.get_by_id(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Update the featured flag, ordering, and expiry window.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    pub async fn set_featured(
        &self,
        id: ProductId,
        featured: bool,
        featured_order: i32,
        featured_until: Option<DateTime<Utc>>,
    ) -> Result<Product, RepositoryError> {
        let result = sqlx::query(
            "UPDATE products
             SET featured = $1, featured_order = $2, featured_until = $3, updated_at = now()
             WHERE id = $4",
        )
        .bind(featured)
        .bind(featured_order)
        .bind(featured_until)
        .bind(id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        self.get_by_id(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Soft-delete a product by clearing its active flag.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    pub async fn soft_delete(&self, id: ProductId) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE products SET active = FALSE, updated_at = now() WHERE id = $1",
        )
        .bind(id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}

/// Insert category links for a product.
async fn link_categories(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    product_id: i32,
    category_ids: &[CategoryId],
) -> Result<(), RepositoryError> {
    for category_id in category_ids {
        sqlx::query(
            "INSERT INTO product_categories (product_id, category_id)
             VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(product_id)
        .bind(category_id)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}
