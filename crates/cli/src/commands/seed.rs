//! Seed the database with sample catalog data.
//!
//! # Usage
//!
//! ```bash
//! mercata-cli seed
//! ```
//!
//! Inserts a small brand/category/product fixture for local development.
//! Seeding is idempotent-ish: it refuses to run when products already exist.

use rust_decimal::Decimal;

use mercata_core::Slug;

use mercata_api::db::brands::BrandInput;
use mercata_api::db::categories::CategoryInput;
use mercata_api::db::products::ProductInput;
use mercata_api::db::{BrandRepository, CategoryRepository, ProductRepository, create_pool};

use super::CommandError;

/// Seed sample data.
pub async fn run() -> Result<(), CommandError> {
    let database_url = super::database_url()?;
    let pool = create_pool(&database_url)
        .await
        .map_err(CommandError::Database)?;

    let products = ProductRepository::new(&pool);
    let existing = products
        .list(&mercata_api::db::products::ProductListFilter::default(), 1, 0)
        .await
        .map_err(|e| CommandError::InvalidInput(e.to_string()))?;
    if !existing.is_empty() {
        return Err(CommandError::InvalidInput(
            "database already contains products, refusing to seed".to_owned(),
        ));
    }

    let brands = BrandRepository::new(&pool);
    let categories = CategoryRepository::new(&pool);

    tracing::info!("Seeding brands...");
    let acme = brands
        .create(BrandInput {
            name: "Acme Roasters",
            slug: &Slug::generate("Acme Roasters"),
            description: "Small-batch coffee equipment",
            logo_url: None,
        })
        .await
        .map_err(|e| CommandError::InvalidInput(e.to_string()))?;

    tracing::info!("Seeding categories...");
    let drinks = categories
        .create(CategoryInput {
            name: "Coffee",
            slug: &Slug::generate("Coffee"),
            description: "",
            parent_id: None,
            sort_order: 0,
        })
        .await
        .map_err(|e| CommandError::InvalidInput(e.to_string()))?;

    let gear = categories
        .create(CategoryInput {
            name: "Brewing Gear",
            slug: &Slug::generate("Brewing Gear"),
            description: "",
            parent_id: Some(drinks.id),
            sort_order: 1,
        })
        .await
        .map_err(|e| CommandError::InvalidInput(e.to_string()))?;

    tracing::info!("Seeding products...");
    for (name, sku, price_cents, stock) in [
        ("House Blend 1kg", "COF-HB-1KG", 1850_i64, 120),
        ("Single Origin Ethiopia 250g", "COF-ETH-250", 1400, 45),
        ("Gooseneck Kettle", "GEAR-KET-01", 5900, 8),
    ] {
        products
            .create(ProductInput {
                name,
                slug: &Slug::generate(name),
                sku,
                description: "",
                price: Decimal::new(price_cents, 2),
                compare_at_price: None,
                brand_id: Some(acme.id),
                category_ids: &[drinks.id, gear.id],
                stock,
                track_quantity: true,
                low_stock_threshold: 10,
                image_urls: &[],
            })
            .await
            .map_err(|e| CommandError::InvalidInput(e.to_string()))?;
    }

    tracing::info!("Seed complete!");
    Ok(())
}
