//! Category repository, including the deactivation cascade.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use mercata_core::{CategoryId, Slug};

use super::RepositoryError;
use crate::models::Category;

const CATEGORY_COLUMNS: &str =
    "id, name, slug, description, parent_id, active, sort_order, created_at, updated_at";

/// Internal row type for category queries.
#[derive(Debug, sqlx::FromRow)]
struct CategoryRow {
    id: i32,
    name: String,
    slug: String,
    description: String,
    parent_id: Option<i32>,
    active: bool,
    sort_order: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Self {
            id: CategoryId::new(row.id),
            name: row.name,
            slug: Slug::from_trusted(row.slug),
            description: row.description,
            parent_id: row.parent_id.map(CategoryId::new),
            active: row.active,
            sort_order: row.sort_order,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Fields for creating or updating a category.
#[derive(Debug)]
pub struct CategoryInput<'a> {
    pub name: &'a str,
    pub slug: &'a Slug,
    pub description: &'a str,
    pub parent_id: Option<CategoryId>,
    pub sort_order: i32,
}

/// Repository for category database operations.
pub struct CategoryRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CategoryRepository<'a> {
    /// Create a new category repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List categories, optionally restricted to active ones.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, only_active: bool) -> Result<Vec<Category>, RepositoryError> {
        let rows = sqlx::query_as::<_, CategoryRow>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories
             WHERE (NOT $1) OR active
             ORDER BY sort_order, name"
        ))
        .bind(only_active)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Get a category by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: CategoryId) -> Result<Option<Category>, RepositoryError> {
        let row = sqlx::query_as::<_, CategoryRow>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Get a category by its slug.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_slug(&self, slug: &str) -> Result<Option<Category>, RepositoryError> {
        let row = sqlx::query_as::<_, CategoryRow>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories WHERE slug = $1"
        ))
        .bind(slug)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Whether all of the given category ids exist and are active.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn all_exist_active(&self, ids: &[CategoryId]) -> Result<bool, RepositoryError> {
        if ids.is_empty() {
            return Ok(true);
        }
        let raw: Vec<i32> = ids.iter().map(CategoryId::as_i32).collect();
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM categories WHERE id = ANY($1) AND active",
        )
        .bind(&raw)
        .fetch_one(self.pool)
        .await?;

        Ok(count == i64::try_from(raw.len()).unwrap_or(i64::MAX))
    }

    /// Create a new category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the slug already exists.
    pub async fn create(&self, input: CategoryInput<'_>) -> Result<Category, RepositoryError> {
        let row = sqlx::query_as::<_, CategoryRow>(&format!(
            "INSERT INTO categories (name, slug, description, parent_id, sort_order)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {CATEGORY_COLUMNS}"
        ))
        .bind(input.name)
        .bind(input.slug)
        .bind(input.description)
        .bind(input.parent_id)
        .bind(input.sort_order)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_sqlx(e, "category slug already exists"))?;

        Ok(row.into())
    }

    /// Update a category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the category doesn't exist.
    /// Returns `RepositoryError::Conflict` if the new slug already exists.
    pub async fn update(
        &self,
        id: CategoryId,
        input: CategoryInput<'_>,
    ) -> Result<Category, RepositoryError> {
        let row = sqlx::query_as::<_, CategoryRow>(&format!(
            "UPDATE categories
             SET name = $1, slug = $2, description = $3, parent_id = $4, sort_order = $5,
                 updated_at = now()
             WHERE id = $6
             RETURNING {CATEGORY_COLUMNS}"
        ))
        .bind(input.name)
        .bind(input.slug)
        .bind(input.description)
        .bind(input.parent_id)
        .bind(input.sort_order)
        .bind(id)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| RepositoryError::from_sqlx(e, "category slug already exists"))?
        .ok_or(RepositoryError::NotFound)?;

        Ok(row.into())
    }

    /// Reactivate a single category (no cascade; children stay as they are).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the category doesn't exist.
    pub async fn activate(&self, id: CategoryId) -> Result<Category, RepositoryError> {
        let row = sqlx::query_as::<_, CategoryRow>(&format!(
            "UPDATE categories SET active = TRUE, updated_at = now()
             WHERE id = $1
             RETURNING {CATEGORY_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Ok(row.into())
    }

    /// Deactivate a category and, transitively, all of its descendants.
    ///
    /// Walks the tree level by level. A visited set guards against a
    /// malformed parent cycle in the data; a node already visited is
    /// skipped rather than looped over. Returns the number of categories
    /// deactivated.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the root category doesn't exist.
    pub async fn deactivate_cascade(&self, id: CategoryId) -> Result<u64, RepositoryError> {
        let result = sqlx::query(
            "UPDATE categories SET active = FALSE, updated_at = now() WHERE id = $1",
        )
        .bind(id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        let mut deactivated: u64 = 1;
        let mut visited: HashSet<i32> = HashSet::from([id.as_i32()]);
        let mut frontier: Vec<i32> = vec![id.as_i32()];

        while !frontier.is_empty() {
            let children: Vec<i32> =
                sqlx::query_scalar("SELECT id FROM categories WHERE parent_id = ANY($1)")
                    .bind(&frontier)
                    .fetch_all(self.pool)
                    .await?;

            frontier = children
                .into_iter()
                .filter(|child| visited.insert(*child))
                .collect();

            if frontier.is_empty() {
                break;
            }

            let result = sqlx::query(
                "UPDATE categories SET active = FALSE, updated_at = now()
                 WHERE id = ANY($1) AND active",
            )
            .bind(&frontier)
            .execute(self.pool)
            .await?;
            deactivated += result.rows_affected();
        }

        Ok(deactivated)
    }

    /// Whether the category has child categories.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn has_children(&self, id: CategoryId) -> Result<bool, RepositoryError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM categories WHERE parent_id = $1")
                .bind(id)
                .fetch_one(self.pool)
                .await?;

        Ok(count > 0)
    }

    /// Whether any products are linked to the category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn has_products(&self, id: CategoryId) -> Result<bool, RepositoryError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM product_categories WHERE category_id = $1",
        )
        .bind(id)
        .fetch_one(self.pool)
        .await?;

        Ok(count > 0)
    }

    /// Delete a category. Callers must have checked for children/products.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the category doesn't exist.
    pub async fn delete(&self, id: CategoryId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
