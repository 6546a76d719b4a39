//! Object storage service for file uploads.
//!
//! Stores objects in an S3-compatible bucket and hands back publicly
//! retrievable URLs. The API never serves file bytes itself.

use aws_sdk_s3::Client;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::primitives::ByteStream;
use chrono::{Datelike, Utc};
use thiserror::Error;
use tracing::instrument;
use uuid::Uuid;

use crate::config::StorageConfig;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The upload to the bucket failed.
    #[error("upload failed: {0}")]
    Upload(String),
}

/// Object storage client for uploads.
#[derive(Clone)]
pub struct StorageService {
    client: Client,
    bucket: String,
    public_url: String,
}

impl std::fmt::Debug for StorageService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageService")
            .field("bucket", &self.bucket)
            .field("public_url", &self.public_url)
            .finish_non_exhaustive()
    }
}

impl StorageService {
    /// Create a storage service from configuration.
    ///
    /// Credentials come from the standard AWS environment/profile chain.
    pub async fn new(config: &StorageConfig) -> Self {
        let sdk_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .load()
            .await;

        let mut builder = aws_sdk_s3::config::Builder::from(&sdk_config);
        if let Some(endpoint) = &config.endpoint {
            // S3-compatible stores (MinIO, R2) want path-style addressing.
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        Self {
            client: Client::from_conf(builder.build()),
            bucket: config.bucket.clone(),
            public_url: config.public_url.clone(),
        }
    }

    /// Upload one object and return its public URL.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Upload` if the put fails.
    #[instrument(skip(self, bytes), fields(key = %key, size = bytes.len()))]
    pub async fn upload(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, StorageError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(|e| StorageError::Upload(e.to_string()))?;

        Ok(self.url_for(key))
    }

    /// Public URL for a stored object key.
    #[must_use]
    pub fn url_for(&self, key: &str) -> String {
        join_public_url(&self.public_url, key)
    }
}

/// Build a date-prefixed, collision-free object key.
///
/// Keys look like `uploads/2026/08/7f3a....webp`; the extension comes from
/// the content type so the original filename never leaks into storage.
#[must_use]
pub fn object_key(content_type: &str) -> String {
    let now = Utc::now();
    let ext = extension_for(content_type);
    format!(
        "uploads/{:04}/{:02}/{}.{ext}",
        now.year(),
        now.month(),
        Uuid::new_v4()
    )
}

/// File extension for an allowed image content type.
#[must_use]
pub fn extension_for(content_type: &str) -> &'static str {
    match content_type {
        "image/png" => "png",
        "image/webp" => "webp",
        "image/gif" => "gif",
        // Default covers image/jpeg and anything the route already filtered.
        _ => "jpg",
    }
}

/// Join a public base URL and an object key without doubled slashes.
fn join_public_url(base: &str, key: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_public_url_trims_slash() {
        assert_eq!(
            join_public_url("https://cdn.example.com/", "uploads/a.png"),
            "https://cdn.example.com/uploads/a.png"
        );
        assert_eq!(
            join_public_url("https://cdn.example.com", "uploads/a.png"),
            "https://cdn.example.com/uploads/a.png"
        );
    }

    #[test]
    fn test_object_key_shape() {
        let key = object_key("image/png");
        assert!(key.starts_with("uploads/"));
        assert!(key.ends_with(".png"));
        // uploads/YYYY/MM/<uuid>.png
        assert_eq!(key.split('/').count(), 4);
    }

    #[test]
    fn test_extension_mapping() {
        assert_eq!(extension_for("image/png"), "png");
        assert_eq!(extension_for("image/webp"), "webp");
        assert_eq!(extension_for("image/gif"), "gif");
        assert_eq!(extension_for("image/jpeg"), "jpg");
    }
}
