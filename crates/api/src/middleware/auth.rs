//! Authentication extractors.
//!
//! Handlers opt into authentication by taking one of these extractors.
//! Tokens arrive as `Authorization: Bearer <jwt>`; the extractor decodes
//! the claims and loads the current user, enforcing the active flag.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};

use crate::error::AppError;
use crate::models::User;
use crate::services::auth::AuthService;
use crate::state::AppState;

/// Extractor that requires a valid bearer token.
///
/// # Example
///
/// ```rust,ignore
/// async fn me(RequireAuth(user): RequireAuth) -> impl IntoResponse {
///     Json(user)
/// }
/// ```
pub struct RequireAuth(pub User);

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);
        let token = bearer_token(parts)
            .ok_or_else(|| AppError::Unauthorized("missing bearer token".to_owned()))?;

        let auth = AuthService::new(state.pool(), state.auth_stores(), &state.config().jwt);
        let user = auth.current_user(&token).await?;

        crate::error::set_sentry_user(user.id.as_i32(), Some(user.email.as_str()));

        Ok(Self(user))
    }
}

/// Extractor that requires a valid bearer token for an admin user.
pub struct RequireAdmin(pub User);

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let RequireAuth(user) = RequireAuth::from_request_parts(parts, state).await?;

        if !user.is_admin() {
            return Err(AppError::Forbidden("admin access required".to_owned()));
        }

        Ok(Self(user))
    }
}

/// Extractor that optionally resolves the current user.
///
/// Unlike `RequireAuth`, a missing or invalid token yields `None` instead
/// of rejecting the request.
pub struct OptionalAuth(pub Option<User>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = match RequireAuth::from_request_parts(parts, state).await {
            Ok(RequireAuth(user)) => Some(user),
            Err(_) => None,
        };

        Ok(Self(user))
    }
}

/// Pull the token out of the `Authorization: Bearer ...` header.
fn bearer_token(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts_with_auth(value: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/api/products");
        if let Some(v) = value {
            builder = builder.header(header::AUTHORIZATION, v);
        }
        let (parts, ()) = builder.body(()).expect("valid request").into_parts();
        parts
    }

    #[test]
    fn test_bearer_token_extracted() {
        let parts = parts_with_auth(Some("Bearer abc.def.ghi"));
        assert_eq!(bearer_token(&parts).as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn test_bearer_token_missing_header() {
        let parts = parts_with_auth(None);
        assert!(bearer_token(&parts).is_none());
    }

    #[test]
    fn test_bearer_token_wrong_scheme() {
        let parts = parts_with_auth(Some("Basic dXNlcjpwYXNz"));
        assert!(bearer_token(&parts).is_none());
    }

    #[test]
    fn test_bearer_token_empty_value() {
        let parts = parts_with_auth(Some("Bearer "));
        assert!(bearer_token(&parts).is_none());
    }
}
