//! Unified error handling for the API.
//!
//! Domain code surfaces typed errors; this module maps them onto the fixed
//! taxonomy (validation, authentication, authorization, not-found, conflict,
//! rate-limit, server error) and serializes the uniform JSON error body.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::auth::AuthError;
use crate::services::storage::StorageError;

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Request payload failed validation.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Missing or invalid credentials.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated but not allowed.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Uniqueness or state conflict.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Too many attempts; retry later.
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(RepositoryError),

    /// Object storage operation failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Body of an error response.
#[derive(Debug, Serialize)]
struct ErrorBody {
    success: bool,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<Vec<String>>,
}

impl AppError {
    const fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            Self::Database(_) | Self::Storage(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Server-side failures go to Sentry; client errors are expected traffic.
        if matches!(self, Self::Database(_) | Self::Storage(_) | Self::Internal(_)) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "API request error"
            );
        }

        let status = self.status();

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Database(_) | Self::Internal(_) => "Internal server error".to_string(),
            Self::Storage(_) => "Storage service error".to_string(),
            other => other.to_string(),
        };

        let body = ErrorBody {
            success: false,
            message,
            errors: None,
        };

        (status, Json(body)).into_response()
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        // Known database shapes map straight into the taxonomy; everything
        // else is a server error.
        match err {
            RepositoryError::NotFound => Self::NotFound("resource not found".to_owned()),
            RepositoryError::Conflict(msg) => Self::Conflict(msg),
            other => Self::Database(other),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidEmail(e) => Self::Validation(e.to_string()),
            AuthError::InvalidPhone(e) => Self::Validation(e.to_string()),
            AuthError::WeakPassword(msg) => Self::Validation(msg),
            AuthError::InvalidCredentials | AuthError::InvalidToken => {
                Self::Unauthorized("invalid credentials".to_owned())
            }
            AuthError::AccountDisabled => {
                Self::Forbidden("account is deactivated".to_owned())
            }
            AuthError::LockedOut { retry_after_secs } => Self::RateLimited(format!(
                "too many failed attempts, retry in {retry_after_secs}s"
            )),
            AuthError::CodeMismatch | AuthError::CodeExpired => {
                Self::Validation("verification code is invalid or expired".to_owned())
            }
            AuthError::UserAlreadyExists => Self::Conflict("email already registered".to_owned()),
            AuthError::UserNotFound => Self::NotFound("user not found".to_owned()),
            AuthError::Repository(e) => Self::from(e),
            AuthError::PasswordHash | AuthError::TokenEncoding => {
                Self::Internal("credential processing failed".to_owned())
            }
        }
    }
}

/// Set the Sentry user context from a user ID.
pub fn set_sentry_user(user_id: i32, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("order MC-1234".to_string());
        assert_eq!(err.to_string(), "Not found: order MC-1234");

        let err = AppError::Validation("quantity must be positive".to_string());
        assert_eq!(
            err.to_string(),
            "Validation failed: quantity must be positive"
        );
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            get_status(AppError::Validation("x".into())),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            get_status(AppError::Unauthorized("x".into())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::Forbidden("x".into())),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            get_status(AppError::NotFound("x".into())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Conflict("x".into())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(AppError::RateLimited("x".into())),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            get_status(AppError::Internal("x".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_repository_error_mapping() {
        assert_eq!(
            get_status(AppError::from(RepositoryError::NotFound)),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::from(RepositoryError::Conflict(
                "sku already exists".into()
            ))),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_internal_errors_hide_details() {
        let response = AppError::Internal("pool exhausted".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        // Body is generic; the detail only reaches logs/Sentry.
    }
}
