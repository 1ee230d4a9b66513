//! Availability lookup: admissible start times for (store, treatment, date)

use axum::extract::{Query, State};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use shared::error::{ApiResponse, AppError, ErrorCode};

use super::{ApiResult, service};
use crate::auth::Identity;
use crate::auth::policy::{self, Action};
use crate::db;
use crate::scheduling::hours;
use crate::state::AppState;
use axum::Extension;

#[derive(Deserialize)]
pub struct AvailabilityQuery {
    pub store_id: i64,
    pub treatment_id: i64,
    /// Local date (YYYY-MM-DD) in the store's zone
    pub date: String,
}

/// One bookable start time
#[derive(Serialize)]
pub struct AvailableSlot {
    pub timeslot_id: i64,
    pub start_time: DateTime<Utc>,
    /// `start_time` + treatment duration
    pub end_time: DateTime<Utc>,
    pub remaining_capacity: i32,
    pub eligible_staff_ids: Vec<i64>,
}

/// GET /api/availability/slots?store_id&treatment_id&date
pub async fn get_slots(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(query): Query<AvailabilityQuery>,
) -> ApiResult<Vec<AvailableSlot>> {
    policy::require(&identity, Action::ViewAvailability)?;

    let store = db::stores::get(&state.pool, query.store_id)
        .await
        .map_err(service)?
        .ok_or_else(|| AppError::new(ErrorCode::StoreNotFound))?;

    let treatment = db::treatments::get(&state.pool, query.treatment_id)
        .await
        .map_err(service)?
        .filter(|t| t.store_id == store.id && t.is_active)
        .ok_or_else(|| AppError::new(ErrorCode::TreatmentNotFound))?;

    let date = hours::parse_date(&query.date)?;
    if !hours::is_open_on_date(&store, date)? {
        return Ok(ApiResponse::success(Vec::new()));
    }

    let tz = hours::store_tz(&store)?;
    let (from, to) = hours::day_bounds(date, tz);
    let duration = Duration::minutes(treatment.duration_minutes as i64);

    let slots = db::timeslots::list_available_for_range(
        &state.pool,
        store.id,
        from,
        to,
        Some(treatment.id),
    )
    .await
    .map_err(service)?;

    // Staff pool once per request; narrowed per slot by its whitelist
    let staff = db::users::list_staff_for_store(&state.pool, store.id)
        .await
        .map_err(service)?;
    let eligible: Vec<&shared::models::user::User> = staff
        .iter()
        .filter(|u| treatment.required_staff_level.admits(u.skill_level))
        .collect();

    let available = slots
        .into_iter()
        .filter(|slot| slot.start_time + duration <= slot.end_time)
        .map(|slot| {
            let eligible_staff_ids = eligible
                .iter()
                .filter(|u| slot.admits_staff(u.id))
                .map(|u| u.id)
                .collect();
            AvailableSlot {
                timeslot_id: slot.id,
                start_time: slot.start_time,
                end_time: slot.start_time + duration,
                remaining_capacity: slot.remaining_capacity(),
                eligible_staff_ids,
            }
        })
        .collect();

    Ok(ApiResponse::success(available))
}
