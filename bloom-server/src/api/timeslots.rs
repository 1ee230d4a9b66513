//! Timeslot listing and generation endpoints

use axum::extract::{Path, Query, State};
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use shared::error::{ApiResponse, AppError, ErrorCode};
use shared::models::timeslot::Timeslot;

use super::{ApiResult, service};
use crate::auth::Identity;
use crate::auth::policy::{self, Action};
use crate::db;
use crate::scheduling::{hours, slots};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct ListQuery {
    /// Local date (YYYY-MM-DD) in the store's zone
    pub date: String,
}

/// GET /api/stores/:id/timeslots?date=YYYY-MM-DD
pub async fn list_timeslots(
    State(state): State<AppState>,
    Path(store_id): Path<i64>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Vec<Timeslot>> {
    let store = db::stores::get(&state.pool, store_id)
        .await
        .map_err(service)?
        .ok_or_else(|| AppError::new(ErrorCode::StoreNotFound))?;

    let date = hours::parse_date(&query.date)?;
    let tz = hours::store_tz(&store)?;
    let (from, to) = hours::day_bounds(date, tz);

    let slots = db::timeslots::list_for_range(&state.pool, store_id, from, to)
        .await
        .map_err(service)?;
    Ok(ApiResponse::success(slots))
}

/// Generation request: either a single `date` or a `start_date`/`end_date`
/// range (capped at 30 days)
#[derive(Deserialize)]
pub struct GenerateRequest {
    pub date: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    #[serde(default = "default_duration")]
    pub slot_duration: i32,
    #[serde(default = "default_capacity")]
    pub max_capacity: i32,
}

fn default_duration() -> i32 {
    slots::DEFAULT_SLOT_DURATION_MINUTES
}

fn default_capacity() -> i32 {
    slots::DEFAULT_SLOT_CAPACITY
}

#[derive(Serialize)]
pub struct GenerateResponse {
    pub slots_created: usize,
}

/// POST /api/stores/:id/timeslots/generate
pub async fn generate(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(store_id): Path<i64>,
    Json(payload): Json<GenerateRequest>,
) -> ApiResult<GenerateResponse> {
    policy::require(&identity, Action::GenerateTimeslots)?;
    policy::require_store_scope(&identity, store_id)?;

    let store = db::stores::get(&state.pool, store_id)
        .await
        .map_err(service)?
        .ok_or_else(|| AppError::new(ErrorCode::StoreNotFound))?;

    let slots_created = match (&payload.date, &payload.start_date, &payload.end_date) {
        (Some(date), None, None) => {
            let date = hours::parse_date(date)?;
            slots::generate_daily_slots(
                &state.pool,
                &state.events,
                &store,
                date,
                payload.slot_duration,
                payload.max_capacity,
            )
            .await?
            .len()
        }
        (None, Some(start), Some(end)) => {
            let start = hours::parse_date(start)?;
            let end = hours::parse_date(end)?;
            slots::generate_range(
                &state.pool,
                &state.events,
                &store,
                start,
                end,
                payload.slot_duration,
                payload.max_capacity,
            )
            .await?
        }
        _ => {
            return Err(AppError::validation(
                "Provide either `date` or both `start_date` and `end_date`",
            ));
        }
    };

    Ok(ApiResponse::success(GenerateResponse { slots_created }))
}
