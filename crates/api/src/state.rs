//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::ApiConfig;
use crate::services::auth::AuthStores;
use crate::services::email::EmailService;
use crate::services::notify::NotificationService;
use crate::services::sms::SmsService;
use crate::services::storage::StorageService;

/// Error creating application state.
#[derive(Debug, thiserror::Error)]
pub enum AppStateError {
    #[error("SMTP configuration error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ApiConfig,
    pool: PgPool,
    email: EmailService,
    notifications: NotificationService,
    storage: StorageService,
    auth_stores: AuthStores,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the SMTP transport cannot be configured.
    pub async fn new(config: ApiConfig, pool: PgPool) -> Result<Self, AppStateError> {
        let email = EmailService::new(&config.email)?;
        let sms = config.sms().map(SmsService::new);
        let notifications = NotificationService::new(sms);
        let storage = StorageService::new(&config.storage).await;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                email,
                notifications,
                storage,
                auth_stores: AuthStores::new(),
            }),
        })
    }

    /// Get a reference to the API configuration.
    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the email service.
    #[must_use]
    pub fn email(&self) -> &EmailService {
        &self.inner.email
    }

    /// Get a reference to the notification dispatcher.
    #[must_use]
    pub fn notifications(&self) -> &NotificationService {
        &self.inner.notifications
    }

    /// Get a reference to the object storage service.
    #[must_use]
    pub fn storage(&self) -> &StorageService {
        &self.inner.storage
    }

    /// Get a reference to the in-memory auth stores.
    #[must_use]
    pub fn auth_stores(&self) -> &AuthStores {
        &self.inner.auth_stores
    }
}
