//! In-memory TTL stores for pending registrations and login attempts.
//!
//! Both stores are process-local: they reset on restart and are not shared
//! across horizontally scaled instances. Entries expire via moka's
//! time-to-live; no background sweeper is needed.

use std::time::{Duration, SystemTime};

use moka::sync::Cache;

use mercata_core::Phone;

/// How long a pending registration (and its OTP code) stays valid.
pub const PENDING_TTL: Duration = Duration::from_secs(10 * 60);

/// Failed logins allowed before the lockout engages.
pub const MAX_LOGIN_ATTEMPTS: u32 = 5;

/// How long a locked identifier stays locked.
pub const LOCKOUT_WINDOW: Duration = Duration::from_secs(15 * 60);

/// A registration awaiting email OTP verification.
#[derive(Debug, Clone)]
pub struct PendingRegistration {
    pub name: String,
    pub phone: Option<Phone>,
    pub password_hash: String,
    pub code: String,
}

/// Failed-attempt state for one identifier.
#[derive(Debug, Clone, Default)]
struct AttemptState {
    count: u32,
    locked_until: Option<SystemTime>,
}

/// The process-local stores backing registration and login throttling.
///
/// Cheap to clone (moka caches are internally shared).
#[derive(Clone)]
pub struct AuthStores {
    pending: Cache<String, PendingRegistration>,
    attempts: Cache<String, AttemptState>,
}

impl Default for AuthStores {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthStores {
    /// Create the stores with their standard TTLs.
    #[must_use]
    pub fn new() -> Self {
        Self {
            pending: Cache::builder()
                .max_capacity(10_000)
                .time_to_live(PENDING_TTL)
                .build(),
            attempts: Cache::builder()
                .max_capacity(100_000)
                .time_to_live(LOCKOUT_WINDOW)
                .build(),
        }
    }

    // =========================================================================
    // Pending registrations
    // =========================================================================

    /// Store (or overwrite) a pending registration keyed by email.
    ///
    /// Re-registering refreshes the TTL along with the code.
    pub fn put_pending(&self, email: &str, pending: PendingRegistration) {
        self.pending.insert(email.to_owned(), pending);
    }

    /// Look up the pending registration for an email, if still live.
    #[must_use]
    pub fn get_pending(&self, email: &str) -> Option<PendingRegistration> {
        self.pending.get(email)
    }

    /// Drop a pending registration (after successful verification).
    pub fn remove_pending(&self, email: &str) {
        self.pending.invalidate(email);
    }

    // =========================================================================
    // Login attempt throttling
    // =========================================================================

    /// Seconds remaining on the lockout for this identifier, if locked.
    #[must_use]
    pub fn lockout_remaining(&self, identifier: &str) -> Option<u64> {
        let state = self.attempts.get(identifier)?;
        let locked_until = state.locked_until?;
        locked_until
            .duration_since(SystemTime::now())
            .ok()
            .map(|d| d.as_secs().max(1))
    }

    /// Record a failed login. Returns the lockout duration in seconds when
    /// this failure crossed the attempt limit.
    pub fn record_failure(&self, identifier: &str) -> Option<u64> {
        let mut state = self.attempts.get(identifier).unwrap_or_default();
        state.count += 1;

        let lockout = if state.count >= MAX_LOGIN_ATTEMPTS {
            state.locked_until = Some(SystemTime::now() + LOCKOUT_WINDOW);
            Some(LOCKOUT_WINDOW.as_secs())
        } else {
            None
        };

        self.attempts.insert(identifier.to_owned(), state);
        lockout
    }

    /// Clear the attempt counter (after a successful login or reset).
    pub fn reset_attempts(&self, identifier: &str) {
        self.attempts.invalidate(identifier);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pending(code: &str) -> PendingRegistration {
        PendingRegistration {
            name: "Test".to_string(),
            phone: None,
            password_hash: "$argon2id$stub".to_string(),
            code: code.to_string(),
        }
    }

    #[test]
    fn test_pending_roundtrip() {
        let stores = AuthStores::new();
        stores.put_pending("a@example.com", pending("123456"));

        let got = stores.get_pending("a@example.com").expect("present");
        assert_eq!(got.code, "123456");

        stores.remove_pending("a@example.com");
        assert!(stores.get_pending("a@example.com").is_none());
    }

    #[test]
    fn test_pending_overwrite_replaces_code() {
        let stores = AuthStores::new();
        stores.put_pending("a@example.com", pending("111111"));
        stores.put_pending("a@example.com", pending("222222"));

        let got = stores.get_pending("a@example.com").expect("present");
        assert_eq!(got.code, "222222");
    }

    #[test]
    fn test_attempts_below_limit_do_not_lock() {
        let stores = AuthStores::new();
        for _ in 0..(MAX_LOGIN_ATTEMPTS - 1) {
            assert!(stores.record_failure("a@example.com").is_none());
        }
        assert!(stores.lockout_remaining("a@example.com").is_none());
    }

    #[test]
    fn test_attempts_at_limit_lock() {
        let stores = AuthStores::new();
        let mut locked = None;
        for _ in 0..MAX_LOGIN_ATTEMPTS {
            locked = stores.record_failure("a@example.com");
        }
        assert_eq!(locked, Some(LOCKOUT_WINDOW.as_secs()));

        let remaining = stores
            .lockout_remaining("a@example.com")
            .expect("locked out");
        assert!(remaining > 0 && remaining <= LOCKOUT_WINDOW.as_secs());
    }

    #[test]
    fn test_reset_clears_lock() {
        let stores = AuthStores::new();
        for _ in 0..MAX_LOGIN_ATTEMPTS {
            stores.record_failure("a@example.com");
        }
        stores.reset_attempts("a@example.com");
        assert!(stores.lockout_remaining("a@example.com").is_none());
        assert!(stores.record_failure("a@example.com").is_none());
    }

    #[test]
    fn test_attempts_are_per_identifier() {
        let stores = AuthStores::new();
        for _ in 0..MAX_LOGIN_ATTEMPTS {
            stores.record_failure("a@example.com");
        }
        assert!(stores.lockout_remaining("b@example.com").is_none());
    }
}
