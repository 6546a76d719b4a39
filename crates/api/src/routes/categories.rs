//! Category route handlers.
//!
//! Public listings return the active tree; admin endpoints manage the full
//! set. Deactivation cascades to all descendants.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use mercata_core::{CategoryId, Slug};

use crate::db::CategoryRepository;
use crate::db::categories::CategoryInput;
use crate::error::AppError;
use crate::middleware::{OptionalAuth, RequireAdmin};
use crate::models::{Category, CategoryTreeNode, category::build_tree};
use crate::response::{ApiResponse, Created};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{key}", get(show).put(update).delete(remove))
        .route("/{key}/activate", post(activate))
        .route("/{key}/deactivate", post(deactivate))
}

#[derive(Debug, Deserialize)]
pub struct CategoryPayload {
    pub name: String,
    pub slug: Option<String>,
    #[serde(default)]
    pub description: String,
    pub parent_id: Option<CategoryId>,
    #[serde(default)]
    pub sort_order: i32,
}

#[derive(Debug, Serialize)]
pub struct CascadeResult {
    pub category: Category,
    pub deactivated: u64,
}

/// Category tree. Admins see inactive categories too.
#[instrument(skip_all)]
async fn list(
    OptionalAuth(auth): OptionalAuth,
    State(state): State<AppState>,
) -> Result<ApiResponse<Vec<CategoryTreeNode>>, AppError> {
    let only_active = !auth.as_ref().is_some_and(crate::models::User::is_admin);
    let categories = CategoryRepository::new(state.pool())
        .list(only_active)
        .await?;

    Ok(ApiResponse::ok("categories", build_tree(categories)))
}

/// Category by numeric id or slug.
#[instrument(skip_all)]
async fn show(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<ApiResponse<Category>, AppError> {
    let category = resolve(&state, &key).await?;
    Ok(ApiResponse::ok("category", category))
}

#[instrument(skip_all)]
async fn create(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Json(payload): Json<CategoryPayload>,
) -> Result<Created<Category>, AppError> {
    let repo = CategoryRepository::new(state.pool());
    let slug = validate_payload(&repo, &payload, None).await?;

    let category = repo
        .create(CategoryInput {
            name: payload.name.trim(),
            slug: &slug,
            description: payload.description.trim(),
            parent_id: payload.parent_id,
            sort_order: payload.sort_order,
        })
        .await?;

    Ok(Created::new("category created", category))
}

#[instrument(skip_all)]
async fn update(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(payload): Json<CategoryPayload>,
) -> Result<ApiResponse<Category>, AppError> {
    let repo = CategoryRepository::new(state.pool());
    let existing = resolve(&state, &key).await?;
    let slug = validate_payload(&repo, &payload, Some(existing.id)).await?;

    let category = repo
        .update(
            existing.id,
            CategoryInput {
                name: payload.name.trim(),
                slug: &slug,
                description: payload.description.trim(),
                parent_id: payload.parent_id,
                sort_order: payload.sort_order,
            },
        )
        .await?;

    Ok(ApiResponse::ok("category updated", category))
}

#[instrument(skip_all)]
async fn activate(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<ApiResponse<Category>, AppError> {
    let existing = resolve(&state, &key).await?;
    let category = CategoryRepository::new(state.pool())
        .activate(existing.id)
        .await?;

    Ok(ApiResponse::ok("category activated", category))
}

/// Deactivate a category and all of its descendants.
#[instrument(skip_all)]
async fn deactivate(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<ApiResponse<CascadeResult>, AppError> {
    let existing = resolve(&state, &key).await?;
    let repo = CategoryRepository::new(state.pool());

    let deactivated = repo.deactivate_cascade(existing.id).await?;
    let category = repo
        .get_by_id(existing.id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("category {key}")))?;

    Ok(ApiResponse::ok(
        "category deactivated",
        CascadeResult {
            category,
            deactivated,
        },
    ))
}

#[instrument(skip_all)]
async fn remove(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<ApiResponse<()>, AppError> {
    let existing = resolve(&state, &key).await?;
    let repo = CategoryRepository::new(state.pool());

    if repo.has_children(existing.id).await? {
        return Err(AppError::Conflict(
            "category still has child categories".to_owned(),
        ));
    }
    if repo.has_products(existing.id).await? {
        return Err(AppError::Conflict(
            "category still has linked products".to_owned(),
        ));
    }

    repo.delete(existing.id).await?;

    Ok(ApiResponse::message("category deleted"))
}

// =============================================================================
// Helpers
// =============================================================================

/// Resolve a path key as a numeric id first, then as a slug.
async fn resolve(state: &AppState, key: &str) -> Result<Category, AppError> {
    let repo = CategoryRepository::new(state.pool());

    let category = if let Ok(id) = key.parse::<CategoryId>() {
        repo.get_by_id(id).await?
    } else {
        repo.get_by_slug(key).await?
    };

    category.ok_or_else(|| AppError::NotFound(format!("category {key}")))
}

/// Validate the payload and produce the slug to store.
async fn validate_payload(
    repo: &CategoryRepository<'_>,
    payload: &CategoryPayload,
    updating: Option<CategoryId>,
) -> Result<Slug, AppError> {
    if payload.name.trim().is_empty() {
        return Err(AppError::Validation("name cannot be empty".to_owned()));
    }

    if let Some(parent_id) = payload.parent_id {
        if updating == Some(parent_id) {
            return Err(AppError::Validation(
                "category cannot be its own parent".to_owned(),
            ));
        }
        if repo.get_by_id(parent_id).await?.is_none() {
            return Err(AppError::Validation(format!(
                "parent category {parent_id} does not exist"
            )));
        }
    }

    Ok(payload
        .slug
        .as_deref()
        .map_or_else(|| Slug::generate(&payload.name), Slug::generate))
}
