//! Product route handlers.
//!
//! Creating or updating a product validates that the SKU is unused (surfaced
//! as a conflict by the repository), that every referenced category exists
//! and is active, and that the brand (if any) exists and is active.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::instrument;

use mercata_core::{BrandId, CategoryId, ProductId, Slug, StockStatus};

use crate::db::products::{ProductInput, ProductListFilter};
use crate::db::{BrandRepository, CategoryRepository, ProductRepository};
use crate::error::AppError;
use crate::middleware::{OptionalAuth, RequireAdmin};
use crate::models::{Product, User};
use crate::response::{ApiResponse, Created};
use crate::state::AppState;

use super::Pagination;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/featured", get(featured))
        .route("/{key}", get(show).put(update).delete(remove))
        .route("/{key}/stock", post(set_stock))
        .route("/{key}/feature", post(set_featured))
}

// =============================================================================
// Payload / Query Types
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct ProductListQuery {
    pub category: Option<CategoryId>,
    pub brand: Option<BrandId>,
    pub stock_status: Option<StockStatus>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub search: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct ProductPayload {
    pub name: String,
    pub slug: Option<String>,
    pub sku: String,
    #[serde(default)]
    pub description: String,
    pub price: Decimal,
    pub compare_at_price: Option<Decimal>,
    pub brand_id: Option<BrandId>,
    #[serde(default)]
    pub category_ids: Vec<CategoryId>,
    #[serde(default)]
    pub stock: i32,
    #[serde(default = "default_track_quantity")]
    pub track_quantity: bool,
    #[serde(default = "default_low_stock_threshold")]
    pub low_stock_threshold: i32,
    #[serde(default)]
    pub image_urls: Vec<String>,
}

const fn default_track_quantity() -> bool {
    true
}

const fn default_low_stock_threshold() -> i32 {
    5
}

#[derive(Debug, Deserialize)]
pub struct StockPayload {
    pub stock: i32,
}

#[derive(Debug, Deserialize)]
pub struct FeaturePayload {
    pub featured: bool,
    #[serde(default)]
    pub featured_order: i32,
    pub featured_until: Option<DateTime<Utc>>,
}

// =============================================================================
// Handlers
// =============================================================================

/// Product listing with filters. Admins also see inactive products.
#[instrument(skip_all)]
async fn list(
    OptionalAuth(auth): OptionalAuth,
    State(state): State<AppState>,
    Query(query): Query<ProductListQuery>,
) -> Result<ApiResponse<Vec<Product>>, AppError> {
    let (limit, offset) = Pagination {
        page: query.page,
        per_page: query.per_page,
    }
    .limit_offset();
    let filter = ProductListFilter {
        category_id: query.category,
        brand_id: query.brand,
        stock_status: query.stock_status,
        min_price: query.min_price,
        max_price: query.max_price,
        search: query.search,
        include_inactive: auth.as_ref().is_some_and(User::is_admin),
    };

    let products = ProductRepository::new(state.pool())
        .list(&filter, limit, offset)
        .await?;

    Ok(ApiResponse::ok("products", products))
}

/// Public featured listing: flag set and expiry (if any) in the future.
#[instrument(skip_all)]
async fn featured(
    State(state): State<AppState>,
) -> Result<ApiResponse<Vec<Product>>, AppError> {
    let products = ProductRepository::new(state.pool())
        .list_featured(12)
        .await?;

    Ok(ApiResponse::ok("featured products", products))
}

/// Product by numeric id or slug.
#[instrument(skip_all)]
async fn show(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<ApiResponse<Product>, AppError> {
    let product = resolve(&state, &key).await?;
    Ok(ApiResponse::ok("product", product))
}

#[instrument(skip_all)]
async fn create(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Json(payload): Json<ProductPayload>,
) -> Result<Created<Product>, AppError> {
    let slug = validate_payload(&state, &payload).await?;

    let product = ProductRepository::new(state.pool())
        .create(ProductInput {
            name: payload.name.trim(),
            slug: &slug,
            sku: payload.sku.trim(),
            description: payload.description.trim(),
            price: payload.price,
            compare_at_price: payload.compare_at_price,
            brand_id: payload.brand_id,
            category_ids: &payload.category_ids,
            stock: payload.stock,
            track_quantity: payload.track_quantity,
            low_stock_threshold: payload.low_stock_threshold,
            image_urls: &payload.image_urls,
        })
        .await?;

    Ok(Created::new("product created", product))
}

#[instrument(skip_all)]
async fn update(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(payload): Json<ProductPayload>,
) -> Result<ApiResponse<Product>, AppError> {
    let existing = resolve(&state, &key).await?;
    let slug = validate_payload(&state, &payload).await?;

    let product = ProductRepository::new(state.pool())
        .update(
            existing.id,
            ProductInput {
                name: payload.name.trim(),
                slug: &slug,
                sku: payload.sku.trim(),
                description: payload.description.trim(),
                price: payload.price,
                compare_at_price: payload.compare_at_price,
                brand_id: payload.brand_id,
                category_ids: &payload.category_ids,
                stock: payload.stock,
                track_quantity: payload.track_quantity,
                low_stock_threshold: payload.low_stock_threshold,
                image_urls: &payload.image_urls,
            },
        )
        .await?;

    Ok(ApiResponse::ok("product updated", product))
}

/// Soft delete: the product disappears from public listings but order
/// snapshots keep referencing it.
#[instrument(skip_all)]
async fn remove(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<ApiResponse<()>, AppError> {
    let existing = resolve(&state, &key).await?;
    ProductRepository::new(state.pool())
        .soft_delete(existing.id)
        .await?;

    Ok(ApiResponse::message("product deleted"))
}

/// Set the stock level; the stock status is re-derived on save.
#[instrument(skip_all)]
async fn set_stock(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(payload): Json<StockPayload>,
) -> Result<ApiResponse<Product>, AppError> {
    if payload.stock < 0 {
        return Err(AppError::Validation("stock cannot be negative".to_owned()));
    }

    let existing = resolve(&state, &key).await?;
    let product = ProductRepository::new(state.pool())
        .set_stock(existing.id, payload.stock)
        .await?;

    Ok(ApiResponse::ok("stock updated", product))
}

/// Feature or unfeature a product, with optional ordering and expiry.
#[instrument(skip_all)]
async fn set_featured(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(payload): Json<FeaturePayload>,
) -> Result<ApiResponse<Product>, AppError> {
    if payload.featured
        && payload.featured_until.is_some_and(|until| until <= Utc::now())
    {
        return Err(AppError::Validation(
            "featured_until must be in the future".to_owned(),
        ));
    }

    let existing = resolve(&state, &key).await?;
    let product = ProductRepository::new(state.pool())
        .set_featured(
            existing.id,
            payload.featured,
            payload.featured_order,
            payload.featured_until,
        )
        .await?;

    Ok(ApiResponse::ok("product feature updated", product))
}

// =============================================================================
// Helpers
// =============================================================================

/// Resolve a path key as a numeric id first, then as a slug.
async fn resolve(state: &AppState, key: &str) -> Result<Product, AppError> {
    let repo = ProductRepository::new(state.pool());

    let product = if let Ok(id) = key.parse::<ProductId>() {
        repo.get_by_id(id).await?
    } else {
        repo.get_by_slug(key).await?
    };

    product.ok_or_else(|| AppError::NotFound(format!("product {key}")))
}

/// Validate the payload and produce the slug to store.
async fn validate_payload(state: &AppState, payload: &ProductPayload) -> Result<Slug, AppError> {
    if payload.name.trim().is_empty() {
        return Err(AppError::Validation("name cannot be empty".to_owned()));
    }
    if payload.sku.trim().is_empty() {
        return Err(AppError::Validation("sku cannot be empty".to_owned()));
    }
    if payload.price < Decimal::ZERO {
        return Err(AppError::Validation("price cannot be negative".to_owned()));
    }
    if payload.stock < 0 {
        return Err(AppError::Validation("stock cannot be negative".to_owned()));
    }

    if let Some(brand_id) = payload.brand_id
        && !BrandRepository::new(state.pool()).exists_active(brand_id).await?
    {
        return Err(AppError::Validation(format!(
            "brand {brand_id} does not exist or is inactive"
        )));
    }

    if !CategoryRepository::new(state.pool())
        .all_exist_active(&payload.category_ids)
        .await?
    {
        return Err(AppError::Validation(
            "one or more categories do not exist or are inactive".to_owned(),
        ));
    }

    Ok(payload
        .slug
        .as_deref()
        .map_or_else(|| Slug::generate(&payload.name), Slug::generate))
}
