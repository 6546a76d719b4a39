//! File upload route handlers (admin only).
//!
//! Accepts a multipart form of image files, stores each in the object
//! storage bucket, and returns the public URL per file. The API never
//! serves the bytes itself.

use axum::{
    Router,
    extract::{DefaultBodyLimit, Multipart, State},
    routing::post,
};
use serde::Serialize;
use tracing::instrument;

use crate::error::AppError;
use crate::middleware::RequireAdmin;
use crate::response::ApiResponse;
use crate::services::storage::object_key;
use crate::state::AppState;

/// Content types accepted for upload.
const ALLOWED_CONTENT_TYPES: &[&str] = &["image/png", "image/jpeg", "image/webp", "image/gif"];

/// Per-file size limit.
const MAX_FILE_BYTES: usize = 5 * 1024 * 1024;

/// Maximum number of files per request.
const MAX_FILES: usize = 10;

pub fn routes() -> Router<AppState> {
    // Axum's default 2 MiB body cap is below the per-file limit; allow the
    // full batch plus multipart framing overhead.
    Router::new()
        .route("/", post(upload))
        .layer(DefaultBodyLimit::max(MAX_FILES * MAX_FILE_BYTES + 1024 * 1024))
}

/// One stored file in the response payload.
#[derive(Debug, Serialize)]
pub struct UploadedFile {
    /// Original filename as submitted, if any.
    pub filename: Option<String>,
    /// Object key in the bucket.
    pub key: String,
    /// Publicly retrievable URL.
    pub url: String,
    pub size: usize,
    pub content_type: String,
}

#[instrument(skip_all)]
async fn upload(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<ApiResponse<Vec<UploadedFile>>, AppError> {
    let mut uploaded = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("malformed multipart body: {e}")))?
    {
        if uploaded.len() >= MAX_FILES {
            return Err(AppError::Validation(format!(
                "at most {MAX_FILES} files per upload"
            )));
        }

        let content_type = field
            .content_type()
            .map(str::to_owned)
            .ok_or_else(|| AppError::Validation("file field missing content type".to_owned()))?;

        if !ALLOWED_CONTENT_TYPES.contains(&content_type.as_str()) {
            return Err(AppError::Validation(format!(
                "unsupported content type {content_type}; allowed: {}",
                ALLOWED_CONTENT_TYPES.join(", ")
            )));
        }

        let filename = field.file_name().map(str::to_owned);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("failed reading file: {e}")))?;

        if bytes.is_empty() {
            return Err(AppError::Validation("empty file".to_owned()));
        }
        if bytes.len() > MAX_FILE_BYTES {
            return Err(AppError::Validation(format!(
                "file exceeds the {} MiB limit",
                MAX_FILE_BYTES / (1024 * 1024)
            )));
        }

        let key = object_key(&content_type);
        let size = bytes.len();
        let url = state
            .storage()
            .upload(&key, bytes.to_vec(), &content_type)
            .await?;

        uploaded.push(UploadedFile {
            filename,
            key,
            url,
            size,
            content_type,
        });
    }

    if uploaded.is_empty() {
        return Err(AppError::Validation("no files in upload".to_owned()));
    }

    Ok(ApiResponse::ok("files uploaded", uploaded))
}
