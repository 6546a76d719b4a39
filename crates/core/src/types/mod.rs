//! Core types for Mercata.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod money;
pub mod phone;
pub mod slug;
pub mod status;

pub use email::{Email, EmailError};
pub use id::*;
pub use money::{CurrencyCode, LineAmounts, Money};
pub use phone::{Phone, PhoneError};
pub use slug::Slug;
pub use status::*;
