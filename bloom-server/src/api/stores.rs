//! Store management endpoints

use axum::extract::{Path, State};
use axum::{Extension, Json};
use serde::Serialize;
use serde_json::Value;
use shared::error::{ApiResponse, AppError, ErrorCode};
use shared::models::store::{Store, StoreCreate, StoreUpdate};

use super::{ApiResult, service};
use crate::auth::Identity;
use crate::auth::policy::{self, Action};
use crate::db;
use crate::scheduling::hours;
use crate::state::AppState;

/// POST /api/stores
pub async fn create_store(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(payload): Json<StoreCreate>,
) -> ApiResult<Store> {
    policy::require(&identity, Action::ManageStores)?;

    if payload.name.trim().is_empty() {
        return Err(AppError::validation("Store name must not be empty"));
    }
    hours::validate_timezone(&payload.timezone)?;
    hours::validate_hours(&payload.operating_hours)?;

    let store = db::stores::create(&state.pool, &payload)
        .await
        .map_err(service)?;
    Ok(ApiResponse::success(store))
}

/// Store plus its live open/closed status
#[derive(Serialize)]
pub struct StoreResponse {
    #[serde(flatten)]
    pub store: Store,
    pub is_open_now: bool,
}

/// GET /api/stores/:id
pub async fn get_store(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(store_id): Path<i64>,
) -> ApiResult<StoreResponse> {
    policy::require(&identity, Action::ViewAvailability)?;
    let store = db::stores::get(&state.pool, store_id)
        .await
        .map_err(service)?
        .ok_or_else(|| AppError::new(ErrorCode::StoreNotFound))?;
    let is_open_now = hours::is_open_now(&store)?;
    Ok(ApiResponse::success(StoreResponse { store, is_open_now }))
}

/// PATCH /api/stores/:id
pub async fn update_store(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(store_id): Path<i64>,
    Json(payload): Json<StoreUpdate>,
) -> ApiResult<Store> {
    policy::require(&identity, Action::UpdateStore)?;
    policy::require_store_scope(&identity, store_id)?;

    if let Some(ref tz) = payload.timezone {
        hours::validate_timezone(tz)?;
    }
    if let Some(ref schedule) = payload.operating_hours {
        hours::validate_hours(schedule)?;
    }

    let store = db::stores::update(&state.pool, store_id, &payload)
        .await
        .map_err(service)?
        .ok_or_else(|| AppError::new(ErrorCode::StoreNotFound))?;
    Ok(ApiResponse::success(store))
}

/// PUT /api/stores/:id/settings — shallow merge; absent keys are
/// preserved, explicit `null` clears a key back to its default
pub async fn update_settings(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(store_id): Path<i64>,
    Json(patch): Json<Value>,
) -> ApiResult<Store> {
    policy::require(&identity, Action::UpdateStore)?;
    policy::require_store_scope(&identity, store_id)?;

    if !patch.is_object() {
        return Err(AppError::validation("Settings patch must be a JSON object"));
    }

    let store = db::stores::update_settings(&state.pool, store_id, &patch)
        .await
        .map_err(service)?
        .ok_or_else(|| AppError::new(ErrorCode::StoreNotFound))?;
    Ok(ApiResponse::success(store))
}
