//! SMS gateway client.
//!
//! Posts JSON to a configurable HTTP gateway. Used for order and login
//! notifications, always fire-and-forget via [`crate::services::notify`].

use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument};

use mercata_core::Phone;

use crate::config::SmsConfig;

/// Errors that can occur when sending an SMS.
#[derive(Debug, Error)]
pub enum SmsError {
    /// The HTTP request failed.
    #[error("request error: {0}")]
    Request(String),

    /// The gateway's response could not be parsed.
    #[error("response error: {0}")]
    Response(String),

    /// The gateway rejected the message.
    #[error("gateway error: {0}")]
    Gateway(String),
}

#[derive(Debug, Serialize)]
struct SendSmsRequest<'a> {
    to: &'a str,
    from: &'a str,
    body: &'a str,
}

#[derive(Debug, Deserialize)]
struct SendSmsResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message_id: Option<String>,
}

/// SMS gateway client.
#[derive(Clone)]
pub struct SmsService {
    client: Client,
    api_url: String,
    api_key: SecretString,
    sender: String,
}

impl std::fmt::Debug for SmsService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmsService")
            .field("api_url", &self.api_url)
            .field("api_key", &"[REDACTED]")
            .field("sender", &self.sender)
            .finish_non_exhaustive()
    }
}

impl SmsService {
    /// Create a new SMS client.
    #[must_use]
    pub fn new(config: &SmsConfig) -> Self {
        Self {
            client: Client::new(),
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
            sender: config.sender.clone(),
        }
    }

    /// Send a text message.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the gateway rejects the message.
    #[instrument(skip(self, body), fields(to = %to))]
    pub async fn send(&self, to: &Phone, body: &str) -> Result<(), SmsError> {
        let message = SendSmsRequest {
            to: to.as_str(),
            from: &self.sender,
            body,
        };

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(self.api_key.expose_secret())
            .json(&message)
            .send()
            .await
            .map_err(|e| SmsError::Request(e.to_string()))?;

        let result: SendSmsResponse = response
            .json()
            .await
            .map_err(|e| SmsError::Response(e.to_string()))?;

        if !result.ok {
            return Err(SmsError::Gateway(
                result.error.unwrap_or_else(|| "Unknown error".to_string()),
            ));
        }

        debug!(message_id = ?result.message_id, "SMS accepted by gateway");
        Ok(())
    }
}
