//! Promo code repository.
//!
//! Codes are stored uppercase; lookups uppercase their input before
//! comparing. Window/usage validation lives on the domain type
//! (`PromoCode::discount_for`).

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use mercata_core::{DiscountKind, PromoCodeId};

use super::RepositoryError;
use crate::models::PromoCode;

const PROMO_COLUMNS: &str = "id, code, kind, value, min_order_amount, usage_limit, \
     used_count, starts_at, expires_at, active, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct PromoCodeRow {
    id: i32,
    code: String,
    kind: DiscountKind,
    value: Decimal,
    min_order_amount: Option<Decimal>,
    usage_limit: Option<i32>,
    used_count: i32,
    starts_at: Option<DateTime<Utc>>,
    expires_at: Option<DateTime<Utc>>,
    active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<PromoCodeRow> for PromoCode {
    fn from(row: PromoCodeRow) -> Self {
        Self {
            id: PromoCodeId::new(row.id),
            code: row.code,
            kind: row.kind,
            value: row.value,
            min_order_amount: row.min_order_amount,
            usage_limit: row.usage_limit,
            used_count: row.used_count,
            starts_at: row.starts_at,
            expires_at: row.expires_at,
            active: row.active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Fields for creating or updating a promo code.
#[derive(Debug)]
pub struct PromoCodeInput<'a> {
    /// Uppercased by the repository before storage.
    pub code: &'a str,
    pub kind: DiscountKind,
    pub value: Decimal,
    pub min_order_amount: Option<Decimal>,
    pub usage_limit: Option<i32>,
    pub starts_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    pub active: bool,
}

/// Repository for promo code database operations.
pub struct PromoCodeRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PromoCodeRepository<'a> {
    /// Create a new promo code repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all promo codes, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, limit: i64, offset: i64) -> Result<Vec<PromoCode>, RepositoryError> {
        let rows = sqlx::query_as::<_, PromoCodeRow>(&format!(
            "SELECT {PROMO_COLUMNS} FROM promo_codes
             ORDER BY created_at DESC
             LIMIT $1 OFFSET $2"
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Get a promo code by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: PromoCodeId) -> Result<Option<PromoCode>, RepositoryError> {
        let row = sqlx::query_as::<_, PromoCodeRow>(&format!(
            "SELECT {PROMO_COLUMNS} FROM promo_codes WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Look up a promo code by its code string (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_code(&self, code: &str) -> Result<Option<PromoCode>, RepositoryError> {
        let row = sqlx::query_as::<_, PromoCodeRow>(&format!(
            "SELECT {PROMO_COLUMNS} FROM promo_codes WHERE code = $1"
        ))
        .bind(code.to_uppercase())
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Create a promo code.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the code already exists.
    pub async fn create(&self, input: PromoCodeInput<'_>) -> Result<PromoCode, RepositoryError> {
        let row = sqlx::query_as::<_, PromoCodeRow>(&format!(
            "INSERT INTO promo_codes
                 (code, kind, value, min_order_amount, usage_limit, starts_at, expires_at, active)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {PROMO_COLUMNS}"
        ))
        .bind(input.code.to_uppercase())
        .bind(input.kind)
        .bind(input.value)
        .bind(input.min_order_amount)
        .bind(input.usage_limit)
        .bind(input.starts_at)
        .bind(input.expires_at)
        .bind(input.active)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_sqlx(e, "promo code already exists"))?;

        Ok(row.into())
    }

    /// Update a promo code.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the code doesn't exist.
    /// Returns `RepositoryError::Conflict` if the new code string collides.
    pub async fn update(
        &self,
        id: PromoCodeId,
        input: PromoCodeInput<'_>,
    ) -> Result<PromoCode, RepositoryError> {
        let row = sqlx::query_as::<_, PromoCodeRow>(&format!(
            "UPDATE promo_codes
             SET code = $1, kind = $2, value = $3, min_order_amount = $4, usage_limit = $5,
                 starts_at = $6, expires_at = $7, active = $8, updated_at = now()
             WHERE id = $9
             RETURNING {PROMO_COLUMNS}"
        ))
        .bind(input.code.to_uppercase())
        .bind(input.kind)
        .bind(input.value)
        .bind(input.min_order_amount)
        .bind(input.usage_limit)
        .bind(input.starts_at)
        .bind(input.expires_at)
        .bind(input.active)
        .bind(id)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| RepositoryError::from_sqlx(e, "promo code already exists"))?
        .ok_or(RepositoryError::NotFound)?;

        Ok(row.into())
    }

    /// Increment the usage counter after a successful order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the code doesn't exist.
    pub async fn increment_usage(&self, id: PromoCodeId) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE promo_codes SET used_count = used_count + 1, updated_at = now()
             WHERE id = $1",
        )
        .bind(id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Delete a promo code.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the code doesn't exist.
    pub async fn delete(&self, id: PromoCodeId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM promo_codes WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
