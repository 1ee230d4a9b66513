//! Daily timeslot generation
//!
//! Delete-then-insert per (store, local day), serialized by the store
//! advisory lock. Regeneration refuses to touch a day that already has
//! bookings recorded against its slots.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde_json::json;
use shared::error::{AppError, ErrorCode};
use shared::models::store::Store;
use shared::models::timeslot::{MAX_SLOT_CAPACITY, MIN_SLOT_CAPACITY, Timeslot};
use shared::EventType;
use sqlx::PgPool;

use super::hours;
use crate::db;
use crate::dispatcher::EventQueue;
use crate::error::ServiceResult;

pub const DEFAULT_SLOT_DURATION_MINUTES: i32 = 60;
pub const DEFAULT_SLOT_CAPACITY: i32 = 1;

/// Maximum date span for bulk generation
pub const MAX_GENERATION_DAYS: i64 = 30;

/// Contiguous slot boundaries `[open, open+Δ), [open+Δ, open+2Δ), …`
/// stepping in UTC; the final partial slot is discarded.
pub fn slot_bounds(
    open_utc: DateTime<Utc>,
    close_utc: DateTime<Utc>,
    duration_minutes: i32,
) -> Vec<(DateTime<Utc>, DateTime<Utc>)> {
    let step = Duration::minutes(duration_minutes as i64);
    let mut bounds = Vec::new();
    let mut start = open_utc;
    while start + step <= close_utc {
        bounds.push((start, start + step));
        start += step;
    }
    bounds
}

/// Generate slots for one (store, local date).
///
/// A closed day yields an empty set and performs no writes. On success an
/// `availability.changed` event is enqueued.
pub async fn generate_daily_slots(
    pool: &PgPool,
    events: &EventQueue,
    store: &Store,
    date: NaiveDate,
    slot_duration_minutes: i32,
    max_capacity: i32,
) -> ServiceResult<Vec<Timeslot>> {
    if slot_duration_minutes <= 0 {
        return Err(AppError::validation("Slot duration must be positive").into());
    }
    if !(MIN_SLOT_CAPACITY..=MAX_SLOT_CAPACITY).contains(&max_capacity) {
        return Err(AppError::with_message(
            ErrorCode::ValueOutOfRange,
            format!("Slot capacity must be in [{MIN_SLOT_CAPACITY}, {MAX_SLOT_CAPACITY}]"),
        )
        .into());
    }

    let tz = hours::store_tz(store)?;
    let Some((open, close)) = hours::hours_for_date(store, date)? else {
        return Ok(Vec::new());
    };

    let open_utc = hours::local_to_utc(date, open, tz);
    let close_utc = hours::local_to_utc(date, close, tz);
    let bounds = slot_bounds(open_utc, close_utc, slot_duration_minutes);

    let (day_start, day_end) = hours::day_bounds(date, tz);

    let mut tx = pool.begin().await?;
    db::lock_store(&mut tx, store.id).await?;

    let booked = db::timeslots::count_booked_in_range(&mut tx, store.id, day_start, day_end).await?;
    if booked > 0 {
        return Err(AppError::with_message(
            ErrorCode::TimeslotHasBookings,
            format!("{booked} slot(s) on {date} already have bookings"),
        )
        .into());
    }

    db::timeslots::delete_range(&mut tx, store.id, day_start, day_end).await?;

    let rows: Vec<(i64, DateTime<Utc>, DateTime<Utc>)> = bounds
        .iter()
        .map(|&(start, end)| (shared::util::snowflake_id(), start, end))
        .collect();
    db::timeslots::bulk_insert(&mut tx, store.id, &rows, max_capacity).await?;

    tx.commit().await?;

    events.enqueue(
        EventType::AvailabilityChanged,
        json!({"store_id": store.id, "date": date.to_string()}),
    );

    Ok(rows
        .into_iter()
        .map(|(id, start_time, end_time)| Timeslot {
            id,
            store_id: store.id,
            start_time,
            end_time,
            max_capacity,
            current_bookings: 0,
            is_active: true,
            treatment_ids: vec![],
            staff_ids: vec![],
        })
        .collect())
}

/// Generate slots for an inclusive date range, one day at a time.
/// Returns the total number of slots created.
pub async fn generate_range(
    pool: &PgPool,
    events: &EventQueue,
    store: &Store,
    start_date: NaiveDate,
    end_date: NaiveDate,
    slot_duration_minutes: i32,
    max_capacity: i32,
) -> ServiceResult<usize> {
    if end_date < start_date {
        return Err(AppError::validation("end_date is before start_date").into());
    }
    let span = (end_date - start_date).num_days() + 1;
    if span > MAX_GENERATION_DAYS {
        return Err(AppError::with_message(
            ErrorCode::DateRangeTooLarge,
            format!("Range spans {span} days, the cap is {MAX_GENERATION_DAYS}"),
        )
        .into());
    }

    let mut total = 0;
    let mut date = start_date;
    while date <= end_date {
        total += generate_daily_slots(pool, events, store, date, slot_duration_minutes, max_capacity)
            .await?
            .len();
        date = date.succ_opt().expect("date overflow");
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveTime, TimeZone};
    use chrono_tz::America::New_York;

    fn hhmm(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_slot_bounds_exact_fit() {
        let open = Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap();
        let close = Utc.with_ymd_and_hms(2026, 3, 2, 17, 0, 0).unwrap();
        let bounds = slot_bounds(open, close, 60);
        assert_eq!(bounds.len(), 8);
        assert_eq!(bounds[0], (open, open + Duration::hours(1)));
        assert_eq!(bounds[7].1, close);
    }

    #[test]
    fn test_slot_bounds_discards_final_partial() {
        let open = Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap();
        let close = Utc.with_ymd_and_hms(2026, 3, 2, 17, 30, 0).unwrap();
        let bounds = slot_bounds(open, close, 60);
        // The 17:00–18:00 slot would cross close, so it is dropped
        assert_eq!(bounds.len(), 8);
        assert_eq!(bounds.last().unwrap().1, Utc.with_ymd_and_hms(2026, 3, 2, 17, 0, 0).unwrap());
    }

    #[test]
    fn test_slot_bounds_window_shorter_than_slot() {
        let open = Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap();
        let close = Utc.with_ymd_and_hms(2026, 3, 2, 9, 45, 0).unwrap();
        assert!(slot_bounds(open, close, 60).is_empty());
    }

    #[test]
    fn test_slot_bounds_contiguous() {
        let open = Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap();
        let close = Utc.with_ymd_and_hms(2026, 3, 2, 13, 0, 0).unwrap();
        let bounds = slot_bounds(open, close, 45);
        for pair in bounds.windows(2) {
            assert_eq!(pair[0].1, pair[1].0);
        }
    }

    #[test]
    fn test_spring_forward_window_loses_a_slot() {
        // US DST starts 2026-03-08; the 02:00–03:00 local hour does not
        // exist, so a window spanning the gap is one hour shorter in UTC.
        let date = NaiveDate::from_ymd_opt(2026, 3, 8).unwrap();
        let open_utc = hours::local_to_utc(date, hhmm(1, 0), New_York);
        let close_utc = hours::local_to_utc(date, hhmm(5, 0), New_York);
        let bounds = slot_bounds(open_utc, close_utc, 60);
        assert_eq!(bounds.len(), 3);

        // The same window on the previous (normal) Sunday has all 4 slots
        let normal = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let open_utc = hours::local_to_utc(normal, hhmm(1, 0), New_York);
        let close_utc = hours::local_to_utc(normal, hhmm(5, 0), New_York);
        assert_eq!(slot_bounds(open_utc, close_utc, 60).len(), 4);
    }
}
