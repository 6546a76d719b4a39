//! Brand repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use mercata_core::{BrandId, Slug};

use super::RepositoryError;
use crate::models::Brand;

const BRAND_COLUMNS: &str =
    "id, name, slug, description, logo_url, active, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct BrandRow {
    id: i32,
    name: String,
    slug: String,
    description: String,
    logo_url: Option<String>,
    active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<BrandRow> for Brand {
    fn from(row: BrandRow) -> Self {
        Self {
            id: BrandId::new(row.id),
            name: row.name,
            slug: Slug::from_trusted(row.slug),
            description: row.description,
            logo_url: row.logo_url,
            active: row.active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Fields for creating or updating a brand.
#[derive(Debug)]
pub struct BrandInput<'a> {
    pub name: &'a str,
    pub slug: &'a Slug,
    pub description: &'a str,
    pub logo_url: Option<&'a str>,
}

/// Repository for brand database operations.
pub struct BrandRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> BrandRepository<'a> {
    /// Create a new brand repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List brands, optionally restricted to active ones.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, only_active: bool) -> Result<Vec<Brand>, RepositoryError> {
        let rows = sqlx::query_as::<_, BrandRow>(&format!(
            "SELECT {BRAND_COLUMNS} FROM brands
             WHERE (NOT $1) OR active
             ORDER BY name"
        ))
        .bind(only_active)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Get a brand by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: BrandId) -> Result<Option<Brand>, RepositoryError> {
        let row = sqlx::query_as::<_, BrandRow>(&format!(
            "SELECT {BRAND_COLUMNS} FROM brands WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Whether the brand exists and is active.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn exists_active(&self, id: BrandId) -> Result<bool, RepositoryError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM brands WHERE id = $1 AND active")
                .bind(id)
                .fetch_one(self.pool)
                .await?;

        Ok(count > 0)
    }

    /// Create a new brand.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the slug already exists.
    pub async fn create(&self, input: BrandInput<'_>) -> Result<Brand, RepositoryError> {
        let row = sqlx::query_as::<_, BrandRow>(&format!(
            "INSERT INTO brands (name, slug, description, logo_url)
             VALUES ($1, $2, $3, $4)
             RETURNING {BRAND_COLUMNS}"
        ))
        .bind(input.name)
        .bind(input.slug)
        .bind(input.description)
        .bind(input.logo_url)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_sqlx(e, "brand slug already exists"))?;

        Ok(row.into())
    }

    /// Update a brand.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the brand doesn't exist.
    /// Returns `RepositoryError::Conflict` if the new slug already exists.
    pub async fn update(
        &self,
        id: BrandId,
        input: BrandInput<'_>,
    ) -> Result<Brand, RepositoryError> {
        let row = sqlx::query_as::<_, BrandRow>(&format!(
            "UPDATE brands
             SET name = $1, slug = $2, description = $3, logo_url = $4, updated_at = now()
             WHERE id = $5
             RETURNING {BRAND_COLUMNS}"
        ))
        .bind(input.name)
        .bind(input.slug)
        .bind(input.description)
        .bind(input.logo_url)
        .bind(id)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| RepositoryError::from_sqlx(e, "brand slug already exists"))?
        .ok_or(RepositoryError::NotFound)?;

        Ok(row.into())
    }

    /// Activate or deactivate a brand.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the brand doesn't exist.
    pub async fn set_active(&self, id: BrandId, active: bool) -> Result<Brand, RepositoryError> {
        let row = sqlx::query_as::<_, BrandRow>(&format!(
            "UPDATE brands SET active = $1, updated_at = now()
             WHERE id = $2
             RETURNING {BRAND_COLUMNS}"
        ))
        .bind(active)
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Ok(row.into())
    }

    /// Number of products referencing the brand.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn product_count(&self, id: BrandId) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE brand_id = $1")
            .bind(id)
            .fetch_one(self.pool)
            .await?;

        Ok(count)
    }

    /// Delete a brand. Callers must have checked `product_count` first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the brand doesn't exist.
    pub async fn delete(&self, id: BrandId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM brands WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
