//! Booking admission
//!
//! Five quota checks run inside one transaction holding the store
//! advisory lock, in a fixed order; the first failure aborts with its
//! specific reason and no writes. Counter updates and the booking insert
//! commit together.

use chrono::{DateTime, Duration, Utc};
use serde_json::json;
use shared::EventType;
use shared::error::{AppError, ErrorCode};
use shared::models::booking::{Booking, BookingStatus, BookingUpdate};
use shared::models::store::Store;
use shared::models::treatment::Treatment;
use shared::models::user::User;
use sqlx::{PgConnection, PgPool};

use super::{changed_fields, load_active_store, load_booking};
use crate::db;
use crate::dispatcher::EventQueue;
use crate::error::ServiceResult;
use crate::scheduling::hours;

/// Admission request
#[derive(Debug, Clone)]
pub struct BookingRequest {
    pub customer_id: i64,
    pub store_id: i64,
    pub treatment_id: i64,
    pub staff_id: Option<i64>,
    pub booking_date_time: DateTime<Utc>,
    pub notes: Option<String>,
}

/// Admit a booking request: preconditions, then the locked five-check
/// transaction, then the `booking.created` event.
pub async fn create_booking(
    pool: &PgPool,
    events: &EventQueue,
    req: BookingRequest,
) -> ServiceResult<Booking> {
    let store = load_active_store(pool, req.store_id).await?;
    let treatment = load_treatment_for_admission(pool, &store, req.treatment_id).await?;

    let customer = db::users::get(pool, req.customer_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::UserNotFound))?;
    if !customer.is_active {
        return Err(AppError::new(ErrorCode::UserInactive).into());
    }

    if let Some(staff_id) = req.staff_id {
        validate_staff(pool, &store, &treatment, staff_id).await?;
    }

    let now = Utc::now();
    let start = req.booking_date_time;
    let end = start + Duration::minutes(treatment.duration_minutes as i64);
    check_time_window(&store, start, end, now)?;

    let mut tx = pool.begin().await?;
    db::lock_store(&mut tx, store.id).await?;

    // 1. Timeslot gate
    let slot = db::timeslots::find_covering(&mut tx, store.id, start, end, treatment.id, req.staff_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::NoTimeslot))?;

    // 2–5. Quota counts
    run_count_checks(&mut tx, &store, &treatment, req.staff_id, start, end, None).await?;

    let status = if store.settings.require_approval {
        BookingStatus::Pending
    } else {
        BookingStatus::Confirmed
    };

    let booking = Booking {
        id: shared::util::snowflake_id(),
        customer_id: customer.id,
        store_id: store.id,
        treatment_id: treatment.id,
        staff_id: req.staff_id,
        booking_date_time: start,
        duration_minutes: treatment.duration_minutes,
        status,
        price: treatment.price.clone(),
        notes: req.notes,
        cancellation_reason: None,
        cancelled_at: None,
        completed_at: None,
        reminder_sent: false,
        created_at: now,
    };

    db::bookings::insert(&mut tx, &booking).await?;
    if !db::timeslots::increment(&mut tx, slot.id).await? {
        // The gate check above holds the store lock, so this only fires on
        // a corrupted counter
        return Err(AppError::new(ErrorCode::NoTimeslot).into());
    }

    tx.commit().await?;

    events.enqueue(
        EventType::BookingCreated,
        json!({"booking": booking}),
    );

    Ok(booking)
}

/// Re-run admission for a reschedule/staff change, excluding the booking's
/// own footprint from every count. Counters move only when the covering
/// slot changes.
pub async fn modify_booking(
    pool: &PgPool,
    events: &EventQueue,
    booking_id: i64,
    update: &BookingUpdate,
) -> ServiceResult<Booking> {
    let old = load_booking(pool, booking_id).await?;
    let store = load_active_store(pool, old.store_id).await?;
    let now = Utc::now();

    let reschedule = update.booking_date_time.is_some() || update.staff_id.is_some();
    if !reschedule {
        // Notes-only edits skip admission entirely
        if update.notes.is_none() {
            return Ok(old);
        }
        let mut tx = pool.begin().await?;
        db::bookings::apply_update(
            &mut tx,
            old.id,
            old.booking_date_time,
            old.staff_id,
            &update.notes,
        )
        .await?;
        tx.commit().await?;
        let new = load_booking(pool, booking_id).await?;
        emit_updated(events, &old, &new);
        return Ok(new);
    }

    if !old.is_modifiable(now) {
        return Err(AppError::new(ErrorCode::BookingNotModifiable).into());
    }

    let treatment = load_treatment_for_admission(pool, &store, old.treatment_id).await?;

    let new_start = update.booking_date_time.unwrap_or(old.booking_date_time);
    let new_staff = match update.staff_id {
        Some(staff) => staff,
        None => old.staff_id,
    };
    let new_end = new_start + Duration::minutes(old.duration_minutes as i64);

    if let Some(staff_id) = new_staff
        && new_staff != old.staff_id
    {
        validate_staff(pool, &store, &treatment, staff_id).await?;
    }
    check_time_window(&store, new_start, new_end, now)?;

    let mut tx = pool.begin().await?;
    db::lock_store(&mut tx, store.id).await?;

    let old_end = old.end_time();
    let old_slot =
        db::timeslots::find_covering_any(&mut tx, store.id, old.booking_date_time, old_end).await?;

    // Active slots never overlap, so the covering slot of any interval is
    // unique. A same-slot move keeps its own seat; only a real move needs
    // spare capacity in the target.
    let new_slot = db::timeslots::find_covering_any(&mut tx, store.id, new_start, new_end)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::NoTimeslot))?;
    let moved = old_slot.as_ref().map(|s| s.id) != Some(new_slot.id);

    let admitted = new_slot.admits_treatment(treatment.id)
        && new_staff.is_none_or(|s| new_slot.admits_staff(s))
        && (!moved || new_slot.has_capacity());
    if !admitted {
        return Err(AppError::new(ErrorCode::NoTimeslot).into());
    }

    run_count_checks(
        &mut tx,
        &store,
        &treatment,
        new_staff,
        new_start,
        new_end,
        Some(old.id),
    )
    .await?;

    db::bookings::apply_update(&mut tx, old.id, new_start, new_staff, &update.notes).await?;

    if moved {
        if let Some(old_slot) = &old_slot {
            db::timeslots::decrement(&mut tx, old_slot.id).await?;
        }
        if !db::timeslots::increment(&mut tx, new_slot.id).await? {
            return Err(AppError::new(ErrorCode::NoTimeslot).into());
        }
    }

    tx.commit().await?;

    let new = load_booking(pool, booking_id).await?;
    emit_updated(events, &old, &new);
    Ok(new)
}

fn emit_updated(events: &EventQueue, old: &Booking, new: &Booking) {
    let changed = changed_fields(old, new);
    if !changed.is_empty() {
        events.enqueue(
            EventType::BookingUpdated,
            json!({"booking": new, "changed_fields": changed}),
        );
    }
}

async fn load_treatment_for_admission(
    pool: &PgPool,
    store: &Store,
    treatment_id: i64,
) -> ServiceResult<Treatment> {
    let treatment = db::treatments::get(pool, treatment_id)
        .await?
        .filter(|t| t.store_id == store.id)
        .ok_or_else(|| AppError::new(ErrorCode::TreatmentNotFound))?;
    if !treatment.is_active {
        return Err(AppError::new(ErrorCode::TreatmentInactive).into());
    }
    Ok(treatment)
}

/// Staff precondition: an active staff user of the same store with an
/// eligible skill level
async fn validate_staff(
    pool: &PgPool,
    store: &Store,
    treatment: &Treatment,
    staff_id: i64,
) -> ServiceResult<User> {
    let staff = db::users::get(pool, staff_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::InvalidStaff))?;

    let eligible = staff.is_active
        && staff.role.is_staff_role()
        && staff.store_id == Some(store.id)
        && treatment.required_staff_level.admits(staff.skill_level);
    if !eligible {
        return Err(AppError::new(ErrorCode::InvalidStaff)
            .with_detail("staff_id", staff_id)
            .into());
    }
    Ok(staff)
}

/// Time preconditions: future start, advance window, operating hours
fn check_time_window(
    store: &Store,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    now: DateTime<Utc>,
) -> ServiceResult<()> {
    if start < now {
        return Err(AppError::new(ErrorCode::BookingInPast).into());
    }
    let horizon = Duration::days(store.settings.max_advance_booking_days as i64);
    if start - now > horizon {
        return Err(AppError::new(ErrorCode::TooFarInAdvance).into());
    }
    if !hours::window_contains(store, start, end)? {
        return Err(AppError::new(ErrorCode::StoreClosed).into());
    }
    Ok(())
}

/// Quota checks 2–5, in order: treatment concurrency, staff conflict,
/// resource capacity, store quotas. `exclude` removes a booking's own
/// footprint from every count during modification.
pub(super) async fn run_count_checks(
    conn: &mut PgConnection,
    store: &Store,
    treatment: &Treatment,
    staff_id: Option<i64>,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    exclude: Option<i64>,
) -> ServiceResult<()> {
    // 2. Treatment concurrency
    let concurrent =
        db::bookings::count_overlapping_for_treatment(conn, treatment.id, start, end, exclude)
            .await?;
    if concurrent >= treatment.max_concurrent_bookings as i64 {
        return Err(AppError::new(ErrorCode::TreatmentCapacity).into());
    }

    // 3. Staff conflict
    if let Some(staff_id) = staff_id {
        let conflicts =
            db::bookings::count_overlapping_for_staff(conn, staff_id, start, end, exclude).await?;
        if conflicts > 0 {
            return Err(AppError::new(ErrorCode::StaffConflict).into());
        }
    }

    // 4. Resource capacity
    let resources = db::resources::get_many(conn, &treatment.required_resources).await?;
    if resources.len() != treatment.required_resources.len() {
        return Err(AppError::new(ErrorCode::ResourceNotFound).into());
    }
    for resource in &resources {
        let in_use =
            db::bookings::count_overlapping_for_resource(conn, resource.id, start, end, exclude)
                .await?;
        if in_use >= resource.capacity as i64 {
            return Err(AppError::new(ErrorCode::ResourceCapacity)
                .with_detail("resource_id", resource.id)
                .into());
        }
    }

    // 5. Store quotas
    if let Some(max_daily) = store.settings.max_daily_bookings {
        let tz = hours::store_tz(store)?;
        let (day_start, day_end) = hours::day_bounds(hours::local_date_of(start, tz), tz);
        let daily =
            db::bookings::count_for_store_day(conn, store.id, day_start, day_end, exclude).await?;
        if daily >= max_daily as i64 {
            return Err(AppError::new(ErrorCode::DailyLimit).into());
        }
    }
    if let Some(max_concurrent) = store.settings.max_concurrent_bookings {
        let overlapping =
            db::bookings::count_overlapping_for_store(conn, store.id, start, end, exclude).await?;
        if overlapping >= max_concurrent as i64 {
            return Err(AppError::new(ErrorCode::StoreCapacity).into());
        }
    }

    Ok(())
}
