//! Brand route handlers.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use serde::Deserialize;
use tracing::instrument;

use mercata_core::{BrandId, Slug};

use crate::db::BrandRepository;
use crate::db::brands::BrandInput;
use crate::error::AppError;
use crate::middleware::{OptionalAuth, RequireAdmin};
use crate::models::Brand;
use crate::response::{ApiResponse, Created};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(show).put(update).delete(remove))
        .route("/{id}/activate", post(activate))
        .route("/{id}/deactivate", post(deactivate))
}

#[derive(Debug, Deserialize)]
pub struct BrandPayload {
    pub name: String,
    pub slug: Option<String>,
    #[serde(default)]
    pub description: String,
    pub logo_url: Option<String>,
}

#[instrument(skip_all)]
async fn list(
    OptionalAuth(auth): OptionalAuth,
    State(state): State<AppState>,
) -> Result<ApiResponse<Vec<Brand>>, AppError> {
    let only_active = !auth.as_ref().is_some_and(crate::models::User::is_admin);
    let brands = BrandRepository::new(state.pool()).list(only_active).await?;

    Ok(ApiResponse::ok("brands", brands))
}

#[instrument(skip_all)]
async fn show(
    State(state): State<AppState>,
    Path(id): Path<BrandId>,
) -> Result<ApiResponse<Brand>, AppError> {
    let brand = BrandRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("brand {id}")))?;

    Ok(ApiResponse::ok("brand", brand))
}

#[instrument(skip_all)]
async fn create(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Json(payload): Json<BrandPayload>,
) -> Result<Created<Brand>, AppError> {
    let slug = validate_payload(&payload)?;
    let brand = BrandRepository::new(state.pool())
        .create(BrandInput {
            name: payload.name.trim(),
            slug: &slug,
            description: payload.description.trim(),
            logo_url: payload.logo_url.as_deref(),
        })
        .await?;

    Ok(Created::new("brand created", brand))
}

#[instrument(skip_all)]
async fn update(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<BrandId>,
    Json(payload): Json<BrandPayload>,
) -> Result<ApiResponse<Brand>, AppError> {
    let slug = validate_payload(&payload)?;
    let brand = BrandRepository::new(state.pool())
        .update(
            id,
            BrandInput {
                name: payload.name.trim(),
                slug: &slug,
                description: payload.description.trim(),
                logo_url: payload.logo_url.as_deref(),
            },
        )
        .await?;

    Ok(ApiResponse::ok("brand updated", brand))
}

#[instrument(skip_all)]
async fn activate(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<BrandId>,
) -> Result<ApiResponse<Brand>, AppError> {
    let brand = BrandRepository::new(state.pool())
        .set_active(id, true)
        .await?;

    Ok(ApiResponse::ok("brand activated", brand))
}

#[instrument(skip_all)]
async fn deactivate(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<BrandId>,
) -> Result<ApiResponse<Brand>, AppError> {
    let brand = BrandRepository::new(state.pool())
        .set_active(id, false)
        .await?;

    Ok(ApiResponse::ok("brand deactivated", brand))
}

#[instrument(skip_all)]
async fn remove(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<BrandId>,
) -> Result<ApiResponse<()>, AppError> {
    let repo = BrandRepository::new(state.pool());

    let products = repo.product_count(id).await?;
    if products > 0 {
        return Err(AppError::Conflict(format!(
            "brand is referenced by {products} products"
        )));
    }

    repo.delete(id).await?;

    Ok(ApiResponse::message("brand deleted"))
}

fn validate_payload(payload: &BrandPayload) -> Result<Slug, AppError> {
    if payload.name.trim().is_empty() {
        return Err(AppError::Validation("name cannot be empty".to_owned()));
    }

    Ok(payload
        .slug
        .as_deref()
        .map_or_else(|| Slug::generate(&payload.name), Slug::generate))
}
