//! Promo code route handlers.
//!
//! Admin CRUD plus a public validate endpoint that quotes the discount a
//! code would grant for a given subtotal.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use mercata_core::{DiscountKind, PromoCodeId};

use crate::db::PromoCodeRepository;
use crate::db::promo_codes::PromoCodeInput;
use crate::error::AppError;
use crate::middleware::RequireAdmin;
use crate::models::PromoCode;
use crate::response::{ApiResponse, Created};
use crate::state::AppState;

use super::Pagination;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/validate", post(validate))
        .route("/{id}", get(show).put(update).delete(remove))
}

#[derive(Debug, Deserialize)]
pub struct PromoCodePayload {
    pub code: String,
    pub kind: DiscountKind,
    pub value: Decimal,
    pub min_order_amount: Option<Decimal>,
    pub usage_limit: Option<i32>,
    pub starts_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default = "default_active")]
    pub active: bool,
}

const fn default_active() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct ValidatePayload {
    pub code: String,
    pub subtotal: Decimal,
}

#[derive(Debug, Serialize)]
pub struct ValidateResult {
    pub code: String,
    pub discount: Decimal,
}

#[instrument(skip_all)]
async fn list(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(query): Query<Pagination>,
) -> Result<ApiResponse<Vec<PromoCode>>, AppError> {
    let (limit, offset) = query.limit_offset();
    let codes = PromoCodeRepository::new(state.pool())
        .list(limit, offset)
        .await?;

    Ok(ApiResponse::ok("promo codes", codes))
}

#[instrument(skip_all)]
async fn show(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<PromoCodeId>,
) -> Result<ApiResponse<PromoCode>, AppError> {
    let code = PromoCodeRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("promo code {id}")))?;

    Ok(ApiResponse::ok("promo code", code))
}

#[instrument(skip_all)]
async fn create(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Json(payload): Json<PromoCodePayload>,
) -> Result<Created<PromoCode>, AppError> {
    validate_payload(&payload)?;

    let code = PromoCodeRepository::new(state.pool())
        .create(as_input(&payload))
        .await?;

    Ok(Created::new("promo code created", code))
}

#[instrument(skip_all)]
async fn update(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<PromoCodeId>,
    Json(payload): Json<PromoCodePayload>,
) -> Result<ApiResponse<PromoCode>, AppError> {
    validate_payload(&payload)?;

    let code = PromoCodeRepository::new(state.pool())
        .update(id, as_input(&payload))
        .await?;

    Ok(ApiResponse::ok("promo code updated", code))
}

#[instrument(skip_all)]
async fn remove(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<PromoCodeId>,
) -> Result<ApiResponse<()>, AppError> {
    PromoCodeRepository::new(state.pool()).delete(id).await?;

    Ok(ApiResponse::message("promo code deleted"))
}

/// Quote the discount a code would grant for a subtotal (public).
#[instrument(skip_all)]
async fn validate(
    State(state): State<AppState>,
    Json(payload): Json<ValidatePayload>,
) -> Result<ApiResponse<ValidateResult>, AppError> {
    let promo = PromoCodeRepository::new(state.pool())
        .get_by_code(&payload.code)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("promo code {}", payload.code)))?;

    let discount = promo
        .discount_for(payload.subtotal, Utc::now())
        .map_err(|e| AppError::Validation(e.to_string()))?;

    Ok(ApiResponse::ok(
        "promo code valid",
        ValidateResult {
            code: promo.code,
            discount,
        },
    ))
}

// =============================================================================
// Helpers
// =============================================================================

fn validate_payload(payload: &PromoCodePayload) -> Result<(), AppError> {
    if payload.code.trim().is_empty() {
        return Err(AppError::Validation("code cannot be empty".to_owned()));
    }
    if payload.value <= Decimal::ZERO {
        return Err(AppError::Validation("value must be positive".to_owned()));
    }
    if payload.kind == DiscountKind::Percentage && payload.value > Decimal::from(100) {
        return Err(AppError::Validation(
            "percentage value cannot exceed 100".to_owned(),
        ));
    }
    if let (Some(starts), Some(expires)) = (payload.starts_at, payload.expires_at)
        && starts >= expires
    {
        return Err(AppError::Validation(
            "starts_at must be before expires_at".to_owned(),
        ));
    }
    if payload.usage_limit.is_some_and(|limit| limit <= 0) {
        return Err(AppError::Validation(
            "usage_limit must be positive".to_owned(),
        ));
    }
    Ok(())
}

fn as_input(payload: &PromoCodePayload) -> PromoCodeInput<'_> {
    PromoCodeInput {
        code: payload.code.trim(),
        kind: payload.kind,
        value: payload.value,
        min_order_amount: payload.min_order_amount,
        usage_limit: payload.usage_limit,
        starts_at: payload.starts_at,
        expires_at: payload.expires_at,
        active: payload.active,
    }
}
