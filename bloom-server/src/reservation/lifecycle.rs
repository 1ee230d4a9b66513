//! Booking lifecycle transitions: cancellation, confirmation, completion

use chrono::Utc;
use serde_json::json;
use shared::EventType;
use shared::error::{AppError, ErrorCode};
use shared::models::booking::{Booking, BookingStatus};
use sqlx::PgPool;

use super::load_booking;
use crate::db;
use crate::dispatcher::EventQueue;
use crate::error::ServiceResult;

/// Cancel a booking, releasing its timeslot seat.
///
/// Cancelling an already-cancelled booking is an idempotent no-op: the
/// stored record is returned unchanged and no counter or event fires.
pub async fn cancel_booking(
    pool: &PgPool,
    events: &EventQueue,
    booking_id: i64,
    reason: Option<String>,
) -> ServiceResult<Booking> {
    let booking = load_booking(pool, booking_id).await?;

    if booking.status == BookingStatus::Cancelled {
        return Ok(booking);
    }
    if booking.status.is_terminal() {
        return Err(AppError::new(ErrorCode::InvalidStatusTransition).into());
    }

    // Bookings of a deactivated store stay cancellable, so no active gate
    let store = db::stores::get(pool, booking.store_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::StoreNotFound))?;
    let now = Utc::now();
    if !booking.is_cancellable(now, store.settings.cancellation_deadline_hours) {
        return Err(AppError::new(ErrorCode::CancellationDeadlinePassed).into());
    }

    let mut tx = pool.begin().await?;
    db::lock_store(&mut tx, store.id).await?;

    db::bookings::mark_cancelled(&mut tx, booking.id, &reason).await?;

    let slot = db::timeslots::find_covering_any(
        &mut tx,
        store.id,
        booking.booking_date_time,
        booking.end_time(),
    )
    .await?;
    if let Some(slot) = slot {
        db::timeslots::decrement(&mut tx, slot.id).await?;
    }

    tx.commit().await?;

    let cancelled = load_booking(pool, booking_id).await?;
    events.enqueue(
        EventType::BookingCancelled,
        json!({"booking": cancelled, "reason": cancelled.cancellation_reason}),
    );
    Ok(cancelled)
}

/// Drive a non-cancel status transition (confirm / start / complete /
/// no-show), guarded by the lifecycle graph. A `cancelled` target is
/// routed through [`cancel_booking`] so the deadline and counter rules
/// apply.
pub async fn transition_status(
    pool: &PgPool,
    events: &EventQueue,
    booking_id: i64,
    target: BookingStatus,
) -> ServiceResult<Booking> {
    if target == BookingStatus::Cancelled {
        return cancel_booking(pool, events, booking_id, None).await;
    }

    let booking = load_booking(pool, booking_id).await?;

    if !booking.status.can_transition_to(target) {
        return Err(AppError::new(ErrorCode::InvalidStatusTransition)
            .with_detail("from", booking.status.as_str())
            .with_detail("to", target.as_str())
            .into());
    }
    // No-show only after the booking's start has passed
    if target == BookingStatus::NoShow && Utc::now() <= booking.booking_date_time {
        return Err(AppError::with_message(
            ErrorCode::InvalidStatusTransition,
            "Cannot mark no-show before the booking start",
        )
        .into());
    }

    let mut tx = pool.begin().await?;
    db::bookings::mark_status(&mut tx, booking.id, target).await?;
    tx.commit().await?;

    let updated = load_booking(pool, booking_id).await?;
    match target {
        BookingStatus::Completed => events.enqueue(
            EventType::BookingCompleted,
            json!({"booking": updated, "completed_at": updated.completed_at}),
        ),
        _ => events.enqueue(
            EventType::BookingUpdated,
            json!({"booking": updated, "changed_fields": ["status"]}),
        ),
    }
    Ok(updated)
}
