//! User domain types.
//!
//! The password hash never leaves the database layer; handlers that need it
//! use `UserRepository::get_password_hash` directly.

use chrono::{DateTime, Utc};
use serde::Serialize;

use mercata_core::{Email, Phone, UserId, UserRole};

/// A user account (domain type).
#[derive(Debug, Clone, Serialize)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Email address (unique, lowercased).
    pub email: Email,
    /// Phone number for SMS notifications, if provided.
    pub phone: Option<Phone>,
    /// Display name.
    pub name: String,
    /// Role/permission level.
    pub role: UserRole,
    /// Whether the account can log in.
    pub active: bool,
    /// Whether the email was verified via OTP.
    pub email_verified: bool,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
    /// When the account was last updated.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Whether this user holds the admin role.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self.role, UserRole::Admin)
    }
}
