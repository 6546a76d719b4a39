//! Authentication service.
//!
//! Registration runs through an email OTP: the submitted account is parked
//! in an in-memory TTL store until the code is confirmed, and only then
//! written to the database. Logins are throttled per email with a fixed
//! lockout window. Successful auth yields a bearer JWT.

mod error;
mod store;

pub use error::AuthError;
pub use store::{
    AuthStores, LOCKOUT_WINDOW, MAX_LOGIN_ATTEMPTS, PENDING_TTL, PendingRegistration,
};

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use mercata_core::{Email, Phone, UserId, UserRole};

use crate::config::JwtConfig;
use crate::db::RepositoryError;
use crate::db::users::{NewUser, UserRepository};
use crate::models::User;

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// How long a password reset code stays valid.
const RESET_CODE_TTL_MINUTES: i64 = 15;

/// Bearer token claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: i32,
    /// Role at issue time.
    pub role: UserRole,
    /// Issued-at (unix seconds).
    pub iat: i64,
    /// Expiry (unix seconds).
    pub exp: i64,
}

/// A validated identity plus the one-time code to email it.
#[derive(Debug)]
pub struct IssuedCode {
    pub email: Email,
    pub code: String,
}

/// Authentication service.
///
/// Handles OTP registration, throttled login, password reset, and bearer
/// token issue/verify.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
    stores: &'a AuthStores,
    jwt: &'a JwtConfig,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, stores: &'a AuthStores, jwt: &'a JwtConfig) -> Self {
        Self {
            users: UserRepository::new(pool),
            stores,
            jwt,
        }
    }

    // =========================================================================
    // Registration (email OTP)
    // =========================================================================

    /// Validate a registration and park it pending OTP confirmation.
    ///
    /// Re-registering the same email overwrites the pending entry with a
    /// fresh code. The caller is responsible for emailing the returned code.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserAlreadyExists` if the email is already
    /// registered, or a validation error for a bad email/phone/password.
    pub async fn start_registration(
        &self,
        email: &str,
        name: &str,
        phone: Option<&str>,
        password: &str,
    ) -> Result<IssuedCode, AuthError> {
        let email = Email::parse(email)?;
        let phone = phone.map(Phone::parse).transpose()?;
        validate_password(password)?;

        if self.users.get_by_email(&email).await?.is_some() {
            return Err(AuthError::UserAlreadyExists);
        }

        let password_hash = hash_password(password)?;
        let code = generate_otp_code();

        self.stores.put_pending(
            email.as_str(),
            PendingRegistration {
                name: name.trim().to_owned(),
                phone,
                password_hash,
                code: code.clone(),
            },
        );

        Ok(IssuedCode { email, code })
    }

    /// Confirm a pending registration with its OTP code and create the user.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::CodeExpired` if no pending registration is live,
    /// `AuthError::CodeMismatch` for a wrong code, and
    /// `AuthError::UserAlreadyExists` if the account was created concurrently.
    pub async fn verify_registration(
        &self,
        email: &str,
        code: &str,
    ) -> Result<(User, String), AuthError> {
        let email = Email::parse(email)?;
        let pending = self
            .stores
            .get_pending(email.as_str())
            .ok_or(AuthError::CodeExpired)?;

        if pending.code != code.trim() {
            return Err(AuthError::CodeMismatch);
        }

        let user = self
            .users
            .create(NewUser {
                email: &email,
                phone: pending.phone.as_ref(),
                name: &pending.name,
                password_hash: &pending.password_hash,
                role: UserRole::User,
                email_verified: true,
            })
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })?;

        self.stores.remove_pending(email.as_str());

        let token = self.issue_token(&user)?;
        Ok((user, token))
    }

    /// Re-issue the OTP code for a pending registration with a fresh TTL.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::CodeExpired` if no pending registration is live.
    pub fn resend_code(&self, email: &str) -> Result<IssuedCode, AuthError> {
        let email = Email::parse(email)?;
        let mut pending = self
            .stores
            .get_pending(email.as_str())
            .ok_or(AuthError::CodeExpired)?;

        pending.code = generate_otp_code();
        let code = pending.code.clone();
        self.stores.put_pending(email.as_str(), pending);

        Ok(IssuedCode { email, code })
    }

    // =========================================================================
    // Login
    // =========================================================================

    /// Login with email and password, throttled per identifier.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::LockedOut` while the lockout window is open,
    /// `AuthError::InvalidCredentials` for a wrong email/password, and
    /// `AuthError::AccountDisabled` for deactivated accounts.
    pub async fn login(&self, email: &str, password: &str) -> Result<(User, String), AuthError> {
        let email = Email::parse(email)?;

        if let Some(retry_after_secs) = self.stores.lockout_remaining(email.as_str()) {
            return Err(AuthError::LockedOut { retry_after_secs });
        }

        let Some((user, password_hash)) = self.users.get_password_hash(&email).await? else {
            // Count unknown-email attempts too so the identifier can't be probed.
            self.stores.record_failure(email.as_str());
            return Err(AuthError::InvalidCredentials);
        };

        if verify_password(password, &password_hash).is_err() {
            if let Some(retry_after_secs) = self.stores.record_failure(email.as_str()) {
                return Err(AuthError::LockedOut { retry_after_secs });
            }
            return Err(AuthError::InvalidCredentials);
        }

        if !user.active {
            return Err(AuthError::AccountDisabled);
        }

        self.stores.reset_attempts(email.as_str());

        let token = self.issue_token(&user)?;
        Ok((user, token))
    }

    // =========================================================================
    // Password reset
    // =========================================================================

    /// Begin a password reset: store a short-lived code on the user row.
    ///
    /// Returns `None` when the email is unknown so the route can answer
    /// identically either way.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Repository` if the database operation fails.
    pub async fn forgot_password(
        &self,
        email: &str,
    ) -> Result<Option<IssuedCode>, AuthError> {
        let email = Email::parse(email)?;

        let Some(user) = self.users.get_by_email(&email).await? else {
            return Ok(None);
        };

        let code = generate_otp_code();
        let expires_at = Utc::now() + Duration::minutes(RESET_CODE_TTL_MINUTES);
        self.users.set_reset_code(user.id, &code, expires_at).await?;

        Ok(Some(IssuedCode { email, code }))
    }

    /// Complete a password reset.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::CodeExpired`/`AuthError::CodeMismatch` for a
    /// stale or wrong code, or a validation error for a weak password.
    pub async fn reset_password(
        &self,
        email: &str,
        code: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        let email = Email::parse(email)?;
        validate_password(new_password)?;

        let (user_id, stored_code, expires_at) = self
            .users
            .get_reset_code(&email)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let stored_code = stored_code.ok_or(AuthError::CodeExpired)?;
        if expires_at.is_none_or(|expiry| expiry < Utc::now()) {
            return Err(AuthError::CodeExpired);
        }
        if stored_code != code.trim() {
            return Err(AuthError::CodeMismatch);
        }

        let password_hash = hash_password(new_password)?;
        self.users.update_password(user_id, &password_hash).await?;
        self.stores.reset_attempts(email.as_str());

        Ok(())
    }

    // =========================================================================
    // Bearer tokens
    // =========================================================================

    /// Issue a signed bearer token for a user.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::TokenEncoding` if signing fails.
    pub fn issue_token(&self, user: &User) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id.as_i32(),
            role: user.role,
            iat: now.timestamp(),
            exp: (now + Duration::hours(self.jwt.ttl_hours)).timestamp(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt.secret.expose_secret().as_bytes()),
        )
        .map_err(|_| AuthError::TokenEncoding)
    }

    /// Decode and validate a bearer token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` for a malformed or expired token.
    pub fn verify_token(&self, token: &str) -> Result<Claims, AuthError> {
        decode_claims(token, self.jwt)
    }

    /// Load the user a token belongs to, enforcing the active flag.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` for a bad token and
    /// `AuthError::AccountDisabled` for a deactivated account.
    pub async fn current_user(&self, token: &str) -> Result<User, AuthError> {
        let claims = self.verify_token(token)?;
        let user = self
            .users
            .get_by_id(UserId::new(claims.sub))
            .await?
            .ok_or(AuthError::InvalidToken)?;

        if !user.active {
            return Err(AuthError::AccountDisabled);
        }

        Ok(user)
    }
}

/// Decode and validate claims against the configured secret.
pub fn decode_claims(token: &str, jwt: &JwtConfig) -> Result<Claims, AuthError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt.secret.expose_secret().as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AuthError::InvalidToken)
}

// =============================================================================
// Password helpers
// =============================================================================

/// Validate password strength requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(AuthError::WeakPassword(
            "password must contain at least one digit".to_owned(),
        ));
    }
    Ok(())
}

/// Hash a password with argon2id and a random salt.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against its stored hash.
pub fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed = PasswordHash::new(hash).map_err(|_| AuthError::PasswordHash)?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| AuthError::InvalidCredentials)
}

/// Generate a 6-digit OTP code.
#[must_use]
pub fn generate_otp_code() -> String {
    use rand::Rng;
    let code: u32 = rand::rng().random_range(100_000..1_000_000);
    code.to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_otp_code_format() {
        let code = generate_otp_code();
        assert_eq!(code.len(), 6);
        assert!(code.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_validate_password_too_short() {
        assert!(matches!(
            validate_password("a1"),
            Err(AuthError::WeakPassword(_))
        ));
    }

    #[test]
    fn test_validate_password_needs_digit() {
        assert!(matches!(
            validate_password("allletters"),
            Err(AuthError::WeakPassword(_))
        ));
    }

    #[test]
    fn test_validate_password_ok() {
        assert!(validate_password("correct horse 9").is_ok());
    }

    #[test]
    fn test_hash_and_verify_password() {
        let hash = hash_password("hunter2hunter2").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("hunter2hunter2", &hash).is_ok());
        assert!(matches!(
            verify_password("wrong-password", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_hashes_are_salted() {
        let a = hash_password("hunter2hunter2").unwrap();
        let b = hash_password("hunter2hunter2").unwrap();
        assert_ne!(a, b);
    }
}
