//! Address repository.
//!
//! The single-default invariant is application-enforced: setting a default
//! unsets every other default for the user first. Both statements run inside
//! one transaction so a concurrent reader never observes two defaults.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use mercata_core::{AddressId, UserId};

use super::RepositoryError;
use crate::models::Address;

const ADDRESS_COLUMNS: &str = "id, user_id, label, recipient, line1, line2, city, region, \
                               postal_code, country, phone, is_default, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct AddressRow {
    id: i32,
    user_id: i32,
    label: String,
    recipient: String,
    line1: String,
    line2: Option<String>,
    city: String,
    region: String,
    postal_code: String,
    country: String,
    phone: Option<String>,
    is_default: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<AddressRow> for Address {
    fn from(row: AddressRow) -> Self {
        Self {
            id: AddressId::new(row.id),
            user_id: UserId::new(row.user_id),
            label: row.label,
            recipient: row.recipient,
            line1: row.line1,
            line2: row.line2,
            city: row.city,
            region: row.region,
            postal_code: row.postal_code,
            country: row.country,
            phone: row.phone,
            is_default: row.is_default,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Fields for creating or updating an address.
#[derive(Debug)]
pub struct AddressInput<'a> {
    pub label: &'a str,
    pub recipient: &'a str,
    pub line1: &'a str,
    pub line2: Option<&'a str>,
    pub city: &'a str,
    pub region: &'a str,
    pub postal_code: &'a str,
    pub country: &'a str,
    pub phone: Option<&'a str>,
}

/// Repository for address database operations.
pub struct AddressRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AddressRepository<'a> {
    /// Create a new address repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List a user's addresses, default first, then newest.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Address>, RepositoryError> {
        let rows = sqlx::query_as::<_, AddressRow>(&format!(
            "SELECT {ADDRESS_COLUMNS} FROM addresses
             WHERE user_id = $1
             ORDER BY is_default DESC, created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Get one address, scoped to its owner.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_for_user(
        &self,
        id: AddressId,
        user_id: UserId,
    ) -> Result<Option<Address>, RepositoryError> {
        let row = sqlx::query_as::<_, AddressRow>(&format!(
            "SELECT {ADDRESS_COLUMNS} FROM addresses WHERE id = $1 AND user_id = $2"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Get a user's default address, if any.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_default(&self, user_id: UserId) -> Result<Option<Address>, RepositoryError> {
        let row = sqlx::query_as::<_, AddressRow>(&format!(
            "SELECT {ADDRESS_COLUMNS} FROM addresses
             WHERE user_id = $1 AND is_default
             LIMIT 1"
        ))
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Create an address. The user's first address becomes the default.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create(
        &self,
        user_id: UserId,
        input: AddressInput<'_>,
    ) -> Result<Address, RepositoryError> {
        let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM addresses WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(self.pool)
            .await?;
        let is_default = existing == 0;

        let row = sqlx::query_as::<_, AddressRow>(&format!(
            "INSERT INTO addresses
                 (user_id, label, recipient, line1, line2, city, region, postal_code,
                  country, phone, is_default)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
             RETURNING {ADDRESS_COLUMNS}"
        ))
        .bind(user_id)
        .bind(input.label)
        .bind(input.recipient)
        .bind(input.line1)
        .bind(input.line2)
        .bind(input.city)
        .bind(input.region)
        .bind(input.postal_code)
        .bind(input.country)
        .bind(input.phone)
        .bind(is_default)
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }

    /// Update an address, scoped to its owner.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the address doesn't exist or
    /// belongs to another user.
    pub async fn update(
        &self,
        id: AddressId,
        user_id: UserId,
        input: AddressInput<'_>,
    ) -> Result<Address, RepositoryError> {
        let row = sqlx::query_as::<_, AddressRow>(&format!(
            "UPDATE addresses
             SET label = $1, recipient = $2, line1 = $3, line2 = $4, city = $5,
                 region = $6, postal_code = $7, country = $8, phone = $9, updated_at = now()
             WHERE id = $10 AND user_id = $11
             RETURNING {ADDRESS_COLUMNS}"
        ))
        .bind(input.label)
        .bind(input.recipient)
        .bind(input.line1)
        .bind(input.line2)
        .bind(input.city)
        .bind(input.region)
        .bind(input.postal_code)
        .bind(input.country)
        .bind(input.phone)
        .bind(id)
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Ok(row.into())
    }

    /// Make an address the user's default via unset-then-set.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the address doesn't exist or
    /// belongs to another user.
    pub async fn set_default(
        &self,
        id: AddressId,
        user_id: UserId,
    ) -> Result<Address, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("UPDATE addresses SET is_default = FALSE WHERE user_id = $1 AND is_default")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        let row = sqlx::query_as::<_, AddressRow>(&format!(
            "UPDATE addresses SET is_default = TRUE, updated_at = now()
             WHERE id = $1 AND user_id = $2
             RETURNING {ADDRESS_COLUMNS}"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        tx.commit().await?;

        Ok(row.into())
    }

    /// Delete an address. Deleting the default promotes the newest remaining
    /// address to default.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the address doesn't exist or
    /// belongs to another user.
    pub async fn delete(&self, id: AddressId, user_id: UserId) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let was_default: Option<bool> = sqlx::query_scalar(
            "DELETE FROM addresses WHERE id = $1 AND user_id = $2 RETURNING is_default",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;

        let was_default = was_default.ok_or(RepositoryError::NotFound)?;

        if was_default {
            sqlx::query(
                "UPDATE addresses SET is_default = TRUE
                 WHERE id = (SELECT id FROM addresses WHERE user_id = $1
                             ORDER BY created_at DESC LIMIT 1)",
            )
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(())
    }
}
