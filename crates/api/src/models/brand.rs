//! Brand domain type.

use chrono::{DateTime, Utc};
use serde::Serialize;

use mercata_core::{BrandId, Slug};

/// A product brand (domain type).
#[derive(Debug, Clone, Serialize)]
pub struct Brand {
    pub id: BrandId,
    pub name: String,
    pub slug: Slug,
    pub description: String,
    pub logo_url: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
