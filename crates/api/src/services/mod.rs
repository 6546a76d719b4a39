//! Business services.
//!
//! - [`auth`] - Registration (email OTP), login throttling, bearer tokens
//! - [`email`] - SMTP delivery of verification and reset codes
//! - [`sms`] - Outbound SMS gateway client
//! - [`storage`] - Object storage uploads
//! - [`notify`] - Fire-and-forget order/login notifications
//! - [`pricing`] - Order total computation

pub mod auth;
pub mod email;
pub mod notify;
pub mod pricing;
pub mod sms;
pub mod storage;
