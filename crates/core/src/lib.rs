//! Mercata Core - Shared types library.
//!
//! This crate provides common types used across all Mercata components:
//! - `api` - The HTTP JSON API server
//! - `cli` - Command-line tools for migrations and management
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no database access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, money, contact details,
//!   slugs, and the status enums shared between the API and the CLI

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
