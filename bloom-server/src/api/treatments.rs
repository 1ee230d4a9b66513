//! Treatment catalog endpoints

use axum::extract::{Path, State};
use axum::{Extension, Json};
use shared::error::{ApiResponse, AppError, ErrorCode};
use shared::models::treatment::{
    MAX_DURATION_MINUTES, MIN_DURATION_MINUTES, Treatment, TreatmentCreate, TreatmentUpdate,
};

use super::{ApiResult, service};
use crate::auth::Identity;
use crate::auth::policy::{self, Action};
use crate::db;
use crate::state::AppState;

/// POST /api/stores/:id/treatments
pub async fn create_treatment(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(store_id): Path<i64>,
    Json(payload): Json<TreatmentCreate>,
) -> ApiResult<Treatment> {
    policy::require(&identity, Action::ManageCatalog)?;
    policy::require_store_scope(&identity, store_id)?;

    validate_fields(
        payload.duration_minutes,
        payload.max_concurrent_bookings,
        &payload.price,
    )?;
    validate_resources(&state, store_id, &payload.required_resources).await?;

    let treatment = db::treatments::create(&state.pool, store_id, &payload)
        .await
        .map_err(service)?;
    Ok(ApiResponse::success(treatment))
}

/// GET /api/stores/:id/treatments
pub async fn list_treatments(
    State(state): State<AppState>,
    Path(store_id): Path<i64>,
) -> ApiResult<Vec<Treatment>> {
    let treatments = db::treatments::list_by_store(&state.pool, store_id)
        .await
        .map_err(service)?;
    Ok(ApiResponse::success(treatments))
}

/// GET /api/treatments/:id
pub async fn get_treatment(
    State(state): State<AppState>,
    Path(treatment_id): Path<i64>,
) -> ApiResult<Treatment> {
    let treatment = db::treatments::get(&state.pool, treatment_id)
        .await
        .map_err(service)?
        .ok_or_else(|| AppError::new(ErrorCode::TreatmentNotFound))?;
    Ok(ApiResponse::success(treatment))
}

/// PATCH /api/treatments/:id
pub async fn update_treatment(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(treatment_id): Path<i64>,
    Json(payload): Json<TreatmentUpdate>,
) -> ApiResult<Treatment> {
    policy::require(&identity, Action::ManageCatalog)?;

    let existing = db::treatments::get(&state.pool, treatment_id)
        .await
        .map_err(service)?
        .ok_or_else(|| AppError::new(ErrorCode::TreatmentNotFound))?;
    policy::require_store_scope(&identity, existing.store_id)?;

    if let Some(duration) = payload.duration_minutes
        && !(MIN_DURATION_MINUTES..=MAX_DURATION_MINUTES).contains(&duration)
    {
        return Err(duration_error());
    }
    if let Some(cap) = payload.max_concurrent_bookings
        && cap < 1
    {
        return Err(AppError::validation("max_concurrent_bookings must be at least 1"));
    }
    if let Some(ref price) = payload.price {
        validate_price(price)?;
    }
    if let Some(ref resources) = payload.required_resources {
        validate_resources(&state, existing.store_id, resources).await?;
    }

    let treatment = db::treatments::update(&state.pool, treatment_id, &payload)
        .await
        .map_err(service)?
        .ok_or_else(|| AppError::new(ErrorCode::TreatmentNotFound))?;
    Ok(ApiResponse::success(treatment))
}

/// DELETE /api/treatments/:id — soft delete, refused while upcoming
/// pending/confirmed bookings reference the treatment
pub async fn deactivate_treatment(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(treatment_id): Path<i64>,
) -> ApiResult<()> {
    policy::require(&identity, Action::ManageCatalog)?;

    let existing = db::treatments::get(&state.pool, treatment_id)
        .await
        .map_err(service)?
        .ok_or_else(|| AppError::new(ErrorCode::TreatmentNotFound))?;
    policy::require_store_scope(&identity, existing.store_id)?;

    if db::bookings::treatment_has_upcoming(&state.pool, treatment_id)
        .await
        .map_err(service)?
    {
        return Err(AppError::new(ErrorCode::TreatmentHasBookings));
    }

    db::treatments::deactivate(&state.pool, treatment_id)
        .await
        .map_err(service)?;
    Ok(ApiResponse::ok())
}

fn duration_error() -> AppError {
    AppError::with_message(
        ErrorCode::ValueOutOfRange,
        format!("duration_minutes must be in [{MIN_DURATION_MINUTES}, {MAX_DURATION_MINUTES}]"),
    )
}

fn validate_price(price: &shared::models::treatment::Price) -> Result<(), AppError> {
    if price.amount.is_sign_negative() {
        return Err(AppError::validation("Price amount must not be negative"));
    }
    if price.currency.len() != 3 || !price.currency.chars().all(|c| c.is_ascii_uppercase()) {
        return Err(AppError::validation("Currency must be an ISO-4217 code"));
    }
    Ok(())
}

fn validate_fields(
    duration: i32,
    max_concurrent: i32,
    price: &shared::models::treatment::Price,
) -> Result<(), AppError> {
    if !(MIN_DURATION_MINUTES..=MAX_DURATION_MINUTES).contains(&duration) {
        return Err(duration_error());
    }
    if max_concurrent < 1 {
        return Err(AppError::validation("max_concurrent_bookings must be at least 1"));
    }
    validate_price(price)
}

/// Every required resource must exist, belong to the same store, and be
/// active
async fn validate_resources(
    state: &AppState,
    store_id: i64,
    resource_ids: &[i64],
) -> Result<(), AppError> {
    if resource_ids.is_empty() {
        return Ok(());
    }

    let mut conn = state.pool.acquire().await.map_err(service)?;
    let resources = db::resources::get_many(&mut conn, resource_ids)
        .await
        .map_err(service)?;

    if resources.len() != resource_ids.len() {
        return Err(AppError::new(ErrorCode::ResourceNotFound));
    }
    for resource in &resources {
        if resource.store_id != store_id {
            return Err(AppError::new(ErrorCode::ResourceWrongStore)
                .with_detail("resource_id", resource.id));
        }
        if !resource.is_active {
            return Err(AppError::new(ErrorCode::ResourceInactive)
                .with_detail("resource_id", resource.id));
        }
    }
    Ok(())
}
