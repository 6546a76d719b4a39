//! Address domain type.

use chrono::{DateTime, Utc};
use serde::Serialize;

use mercata_core::{AddressId, UserId};

/// A saved shipping address (domain type).
///
/// At most one address per user carries `is_default = true`; the repository
/// enforces this with an unset-then-set pair inside a transaction.
#[derive(Debug, Clone, Serialize)]
pub struct Address {
    pub id: AddressId,
    pub user_id: UserId,
    pub label: String,
    pub recipient: String,
    pub line1: String,
    pub line2: Option<String>,
    pub city: String,
    pub region: String,
    pub postal_code: String,
    pub country: String,
    pub phone: Option<String>,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
