//! Address route handlers (all authenticated, scoped to the current user).

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post, put},
};
use serde::Deserialize;
use tracing::instrument;

use mercata_core::AddressId;

use crate::db::AddressRepository;
use crate::db::addresses::AddressInput;
use crate::error::AppError;
use crate::middleware::RequireAuth;
use crate::models::Address;
use crate::response::{ApiResponse, Created};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", put(update).delete(remove))
        .route("/{id}/default", post(set_default))
}

#[derive(Debug, Deserialize)]
pub struct AddressPayload {
    #[serde(default)]
    pub label: String,
    pub recipient: String,
    pub line1: String,
    pub line2: Option<String>,
    pub city: String,
    #[serde(default)]
    pub region: String,
    pub postal_code: String,
    pub country: String,
    pub phone: Option<String>,
}

impl AddressPayload {
    fn validate(&self) -> Result<(), AppError> {
        for (field, value) in [
            ("recipient", &self.recipient),
            ("line1", &self.line1),
            ("city", &self.city),
            ("postal_code", &self.postal_code),
            ("country", &self.country),
        ] {
            if value.trim().is_empty() {
                return Err(AppError::Validation(format!("{field} cannot be empty")));
            }
        }
        Ok(())
    }

    fn as_input(&self) -> AddressInput<'_> {
        AddressInput {
            label: self.label.trim(),
            recipient: self.recipient.trim(),
            line1: self.line1.trim(),
            line2: self.line2.as_deref(),
            city: self.city.trim(),
            region: self.region.trim(),
            postal_code: self.postal_code.trim(),
            country: self.country.trim(),
            phone: self.phone.as_deref(),
        }
    }
}

#[instrument(skip_all)]
async fn list(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
) -> Result<ApiResponse<Vec<Address>>, AppError> {
    let addresses = AddressRepository::new(state.pool())
        .list_for_user(user.id)
        .await?;

    Ok(ApiResponse::ok("addresses", addresses))
}

#[instrument(skip_all)]
async fn create(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Json(payload): Json<AddressPayload>,
) -> Result<Created<Address>, AppError> {
    payload.validate()?;

    let address = AddressRepository::new(state.pool())
        .create(user.id, payload.as_input())
        .await?;

    Ok(Created::new("address created", address))
}

#[instrument(skip_all)]
async fn update(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<AddressId>,
    Json(payload): Json<AddressPayload>,
) -> Result<ApiResponse<Address>, AppError> {
    payload.validate()?;

    let address = AddressRepository::new(state.pool())
        .update(id, user.id, payload.as_input())
        .await?;

    Ok(ApiResponse::ok("address updated", address))
}

/// Make this address the default, unsetting every other default first.
#[instrument(skip_all)]
async fn set_default(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<AddressId>,
) -> Result<ApiResponse<Address>, AppError> {
    let address = AddressRepository::new(state.pool())
        .set_default(id, user.id)
        .await?;

    Ok(ApiResponse::ok("default address updated", address))
}

#[instrument(skip_all)]
async fn remove(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<AddressId>,
) -> Result<ApiResponse<()>, AppError> {
    AddressRepository::new(state.pool())
        .delete(id, user.id)
        .await?;

    Ok(ApiResponse::message("address deleted"))
}
