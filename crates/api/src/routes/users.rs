//! Admin user management route handlers.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use serde::Deserialize;
use tracing::instrument;

use mercata_core::{UserId, UserRole};

use crate::db::UserRepository;
use crate::db::users::UserListFilter;
use crate::error::AppError;
use crate::middleware::RequireAdmin;
use crate::models::User;
use crate::response::ApiResponse;
use crate::state::AppState;

use super::Pagination;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list))
        .route("/{id}", get(show).delete(remove))
        .route("/{id}/role", post(set_role))
        .route("/{id}/activate", post(activate))
        .route("/{id}/deactivate", post(deactivate))
}

#[derive(Debug, Deserialize)]
pub struct UserListQuery {
    pub role: Option<UserRole>,
    pub active: Option<bool>,
    pub search: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct SetRolePayload {
    pub role: UserRole,
}

#[instrument(skip_all)]
async fn list(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(query): Query<UserListQuery>,
) -> Result<ApiResponse<Vec<User>>, AppError> {
    let (limit, offset) = Pagination {
        page: query.page,
        per_page: query.per_page,
    }
    .limit_offset();
    let filter = UserListFilter {
        role: query.role,
        active: query.active,
        search: query.search,
    };

    let users = UserRepository::new(state.pool())
        .list(&filter, limit, offset)
        .await?;

    Ok(ApiResponse::ok("users", users))
}

#[instrument(skip_all)]
async fn show(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<UserId>,
) -> Result<ApiResponse<User>, AppError> {
    let user = UserRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("user {id}")))?;

    Ok(ApiResponse::ok("user", user))
}

#[instrument(skip_all)]
async fn set_role(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<UserId>,
    Json(payload): Json<SetRolePayload>,
) -> Result<ApiResponse<User>, AppError> {
    // An admin demoting themselves could lock the panel out entirely.
    if admin.id == id && payload.role != UserRole::Admin {
        return Err(AppError::Validation(
            "cannot change your own role".to_owned(),
        ));
    }

    let user = UserRepository::new(state.pool())
        .update_role(id, payload.role)
        .await?;

    Ok(ApiResponse::ok("role updated", user))
}

#[instrument(skip_all)]
async fn activate(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<UserId>,
) -> Result<ApiResponse<User>, AppError> {
    let user = UserRepository::new(state.pool())
        .set_active(id, true)
        .await?;

    Ok(ApiResponse::ok("user activated", user))
}

#[instrument(skip_all)]
async fn deactivate(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<UserId>,
) -> Result<ApiResponse<User>, AppError> {
    if admin.id == id {
        return Err(AppError::Validation(
            "cannot deactivate your own account".to_owned(),
        ));
    }

    let user = UserRepository::new(state.pool())
        .set_active(id, false)
        .await?;

    Ok(ApiResponse::ok("user deactivated", user))
}

#[instrument(skip_all)]
async fn remove(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<UserId>,
) -> Result<ApiResponse<()>, AppError> {
    if admin.id == id {
        return Err(AppError::Validation(
            "cannot delete your own account".to_owned(),
        ));
    }

    UserRepository::new(state.pool()).delete(id).await?;

    Ok(ApiResponse::message("user deleted"))
}
