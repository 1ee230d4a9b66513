//! Resource catalog endpoints

use axum::extract::{Path, State};
use axum::{Extension, Json};
use shared::error::{ApiResponse, AppError, ErrorCode};
use shared::models::resource::{Resource, ResourceCreate, ResourceUpdate};

use super::{ApiResult, service};
use crate::auth::Identity;
use crate::auth::policy::{self, Action};
use crate::db;
use crate::state::AppState;

/// POST /api/stores/:id/resources
pub async fn create_resource(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(store_id): Path<i64>,
    Json(payload): Json<ResourceCreate>,
) -> ApiResult<Resource> {
    policy::require(&identity, Action::ManageCatalog)?;
    policy::require_store_scope(&identity, store_id)?;

    if payload.capacity < 1 {
        return Err(AppError::validation("Resource capacity must be at least 1"));
    }

    let resource = db::resources::create(&state.pool, store_id, &payload)
        .await
        .map_err(service)?;
    Ok(ApiResponse::success(resource))
}

/// GET /api/stores/:id/resources
pub async fn list_resources(
    State(state): State<AppState>,
    Path(store_id): Path<i64>,
) -> ApiResult<Vec<Resource>> {
    let resources = db::resources::list_by_store(&state.pool, store_id)
        .await
        .map_err(service)?;
    Ok(ApiResponse::success(resources))
}

/// PATCH /api/resources/:id
pub async fn update_resource(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(resource_id): Path<i64>,
    Json(payload): Json<ResourceUpdate>,
) -> ApiResult<Resource> {
    policy::require(&identity, Action::ManageCatalog)?;

    let existing = db::resources::get(&state.pool, resource_id)
        .await
        .map_err(service)?
        .ok_or_else(|| AppError::new(ErrorCode::ResourceNotFound))?;
    policy::require_store_scope(&identity, existing.store_id)?;

    if let Some(capacity) = payload.capacity
        && capacity < 1
    {
        return Err(AppError::validation("Resource capacity must be at least 1"));
    }

    let resource = db::resources::update(&state.pool, resource_id, &payload)
        .await
        .map_err(service)?
        .ok_or_else(|| AppError::new(ErrorCode::ResourceNotFound))?;
    Ok(ApiResponse::success(resource))
}
