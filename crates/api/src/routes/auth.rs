//! Authentication route handlers.
//!
//! Registration parks the account in the in-memory OTP store and emails the
//! code; the account only reaches the database once the code is confirmed.
//! Code delivery is fire-and-forget so delivery hiccups never fail the
//! request itself.

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use mercata_core::Phone;

use crate::db::UserRepository;
use crate::error::AppError;
use crate::middleware::RequireAuth;
use crate::models::User;
use crate::response::ApiResponse;
use crate::services::auth::AuthService;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/verify", post(verify))
        .route("/resend-code", post(resend_code))
        .route("/login", post(login))
        .route("/forgot-password", post(forgot_password))
        .route("/reset-password", post(reset_password))
        .route("/me", get(me).patch(update_me))
}

// =============================================================================
// Payload Types
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct RegisterPayload {
    pub email: String,
    pub name: String,
    pub phone: Option<String>,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct VerifyPayload {
    pub email: String,
    pub code: String,
}

#[derive(Debug, Deserialize)]
pub struct EmailPayload {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginPayload {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordPayload {
    pub email: String,
    pub code: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfilePayload {
    pub name: String,
    pub phone: Option<String>,
}

/// Token + user payload returned by login and verify.
#[derive(Debug, Serialize)]
pub struct AuthData {
    pub token: String,
    pub user: User,
}

// =============================================================================
// Handlers
// =============================================================================

/// Start OTP registration and email the code.
#[instrument(skip_all, fields(email = %payload.email))]
async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterPayload>,
) -> Result<ApiResponse<()>, AppError> {
    let auth = auth_service(&state);
    let started = auth
        .start_registration(
            &payload.email,
            &payload.name,
            payload.phone.as_deref(),
            &payload.password,
        )
        .await?;

    send_code_email(&state, started.email.as_str(), &started.code, false);

    Ok(ApiResponse::message(
        "verification code sent, check your email",
    ))
}

/// Confirm the OTP code and create the account.
#[instrument(skip_all, fields(email = %payload.email))]
async fn verify(
    State(state): State<AppState>,
    Json(payload): Json<VerifyPayload>,
) -> Result<ApiResponse<AuthData>, AppError> {
    let auth = auth_service(&state);
    let (user, token) = auth
        .verify_registration(&payload.email, &payload.code)
        .await?;

    Ok(ApiResponse::ok("account created", AuthData { token, user }))
}

/// Re-issue the OTP code for a pending registration.
#[instrument(skip_all, fields(email = %payload.email))]
async fn resend_code(
    State(state): State<AppState>,
    Json(payload): Json<EmailPayload>,
) -> Result<ApiResponse<()>, AppError> {
    let auth = auth_service(&state);
    let started = auth.resend_code(&payload.email)?;

    send_code_email(&state, started.email.as_str(), &started.code, false);

    Ok(ApiResponse::message("verification code re-sent"))
}

/// Login with email and password.
#[instrument(skip_all, fields(email = %payload.email))]
async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> Result<ApiResponse<AuthData>, AppError> {
    let auth = auth_service(&state);
    let (user, token) = auth.login(&payload.email, &payload.password).await?;

    state
        .notifications()
        .login_alert(user.phone.as_ref(), &user.name);

    Ok(ApiResponse::ok("login successful", AuthData { token, user }))
}

/// Email a password reset code. Answers identically whether or not the
/// email exists, so accounts cannot be enumerated.
#[instrument(skip_all, fields(email = %payload.email))]
async fn forgot_password(
    State(state): State<AppState>,
    Json(payload): Json<EmailPayload>,
) -> Result<ApiResponse<()>, AppError> {
    let auth = auth_service(&state);
    if let Some(started) = auth.forgot_password(&payload.email).await? {
        send_code_email(&state, started.email.as_str(), &started.code, true);
    }

    Ok(ApiResponse::message(
        "if that email is registered, a reset code is on its way",
    ))
}

/// Reset the password with the emailed code.
#[instrument(skip_all, fields(email = %payload.email))]
async fn reset_password(
    State(state): State<AppState>,
    Json(payload): Json<ResetPasswordPayload>,
) -> Result<ApiResponse<()>, AppError> {
    let auth = auth_service(&state);
    auth.reset_password(&payload.email, &payload.code, &payload.password)
        .await?;

    Ok(ApiResponse::message("password updated"))
}

/// Current user from the bearer token.
async fn me(RequireAuth(user): RequireAuth) -> ApiResponse<User> {
    ApiResponse::ok("current user", user)
}

/// Update the current user's name/phone.
#[instrument(skip_all)]
async fn update_me(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Json(payload): Json<UpdateProfilePayload>,
) -> Result<ApiResponse<User>, AppError> {
    let name = payload.name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("name cannot be empty".to_owned()));
    }
    let phone = payload
        .phone
        .as_deref()
        .map(Phone::parse)
        .transpose()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let updated = UserRepository::new(state.pool())
        .update_profile(user.id, name, phone.as_ref())
        .await?;

    Ok(ApiResponse::ok("profile updated", updated))
}

// =============================================================================
// Helpers
// =============================================================================

fn auth_service(state: &AppState) -> AuthService<'_> {
    AuthService::new(state.pool(), state.auth_stores(), &state.config().jwt)
}

/// Email a verification or reset code without blocking the request.
fn send_code_email(state: &AppState, to: &str, code: &str, is_reset: bool) {
    let email = state.email().clone();
    let to = to.to_owned();
    let code = code.to_owned();

    tokio::spawn(async move {
        let result = if is_reset {
            email.send_password_reset(&to, &code).await
        } else {
            email.send_verification_code(&to, &code).await
        };
        if let Err(e) = result {
            tracing::warn!(error = %e, to = %to, "code email failed");
        }
    });
}
