//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] mercata_core::EmailError),

    /// Invalid phone format.
    #[error("invalid phone: {0}")]
    InvalidPhone(#[from] mercata_core::PhoneError),

    /// Password too weak or invalid.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// Invalid credentials (wrong password or user not found).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Bearer token missing, malformed, or expired.
    #[error("invalid token")]
    InvalidToken,

    /// The account exists but is deactivated.
    #[error("account disabled")]
    AccountDisabled,

    /// Too many failed login attempts for this identifier.
    #[error("locked out, retry in {retry_after_secs}s")]
    LockedOut { retry_after_secs: u64 },

    /// Submitted verification/reset code does not match.
    #[error("verification code mismatch")]
    CodeMismatch,

    /// No pending code, or the code's window has passed.
    #[error("verification code expired")]
    CodeExpired,

    /// User already exists.
    #[error("user already exists")]
    UserAlreadyExists,

    /// User not found.
    #[error("user not found")]
    UserNotFound,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,

    /// Token signing error.
    #[error("token encoding error")]
    TokenEncoding,
}
