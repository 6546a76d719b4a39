//! Uniform JSON response envelope.
//!
//! Every endpoint answers with the same shape:
//! `{"success": true, "message": ..., "data": ...}` on success and
//! `{"success": false, "message": ..., "errors": [...]}` on failure
//! (the failure side is produced by [`crate::error::AppError`]).

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// A successful API response.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    /// 200 OK with a payload.
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    /// 200 OK with no payload.
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// A successful API response carrying 201 Created.
#[derive(Debug, Serialize)]
#[serde(transparent)]
pub struct Created<T: Serialize>(pub ApiResponse<T>);

impl<T: Serialize> Created<T> {
    /// 201 Created with a payload.
    pub fn new(message: impl Into<String>, data: T) -> Self {
        Self(ApiResponse::ok(message, data))
    }
}

impl<T: Serialize> IntoResponse for Created<T> {
    fn into_response(self) -> Response {
        (StatusCode::CREATED, Json(self.0)).into_response()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_with_data() {
        let resp = ApiResponse::ok("fetched", serde_json::json!({"id": 1}));
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["message"], "fetched");
        assert_eq!(json["data"]["id"], 1);
    }

    #[test]
    fn test_envelope_without_data_omits_field() {
        let resp = ApiResponse::message("done");
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["success"], true);
        assert!(json.get("data").is_none());
    }

    #[test]
    fn test_created_status() {
        let resp = Created::new("created", serde_json::json!({"id": 2}));
        let response = resp.into_response();
        assert_eq!(response.status(), StatusCode::CREATED);
    }
}
