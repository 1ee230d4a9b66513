//! Reservation engine: admission, modification, and lifecycle transitions

mod engine;
mod lifecycle;

pub use engine::{BookingRequest, create_booking, modify_booking};
pub use lifecycle::{cancel_booking, transition_status};

use shared::error::{AppError, ErrorCode};
use shared::models::booking::Booking;
use shared::models::store::Store;
use sqlx::PgPool;

use crate::db;
use crate::error::ServiceResult;

/// Load a store that must exist and be active
pub(crate) async fn load_active_store(pool: &PgPool, store_id: i64) -> ServiceResult<Store> {
    let store = db::stores::get(pool, store_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::StoreNotFound))?;
    if !store.is_active {
        return Err(AppError::new(ErrorCode::StoreInactive).into());
    }
    Ok(store)
}

/// Load a booking that must exist
pub(crate) async fn load_booking(pool: &PgPool, booking_id: i64) -> ServiceResult<Booking> {
    db::bookings::get(pool, booking_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::BookingNotFound).into())
}

/// Fields of a booking that changed between two revisions, for the
/// `booking.updated` event payload
pub(crate) fn changed_fields(old: &Booking, new: &Booking) -> Vec<&'static str> {
    let mut changed = Vec::new();
    if old.booking_date_time != new.booking_date_time {
        changed.push("booking_date_time");
    }
    if old.staff_id != new.staff_id {
        changed.push("staff_id");
    }
    if old.notes != new.notes {
        changed.push("notes");
    }
    if old.status != new.status {
        changed.push("status");
    }
    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;
    use shared::models::booking::BookingStatus;
    use shared::models::treatment::Price;

    fn booking() -> Booking {
        Booking {
            id: 1,
            customer_id: 2,
            store_id: 3,
            treatment_id: 4,
            staff_id: Some(5),
            booking_date_time: Utc.with_ymd_and_hms(2026, 3, 2, 10, 0, 0).unwrap(),
            duration_minutes: 60,
            status: BookingStatus::Pending,
            price: Price {
                amount: Decimal::new(3000, 2),
                currency: "EUR".into(),
            },
            notes: None,
            cancellation_reason: None,
            cancelled_at: None,
            completed_at: None,
            reminder_sent: false,
            created_at: Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_changed_fields_empty_for_identical() {
        let b = booking();
        assert!(changed_fields(&b, &b).is_empty());
    }

    #[test]
    fn test_changed_fields_reports_each_change() {
        let old = booking();
        let mut new = old.clone();
        new.booking_date_time = old.booking_date_time + chrono::Duration::hours(1);
        new.staff_id = None;
        new.status = BookingStatus::Confirmed;
        assert_eq!(
            changed_fields(&old, &new),
            vec!["booking_date_time", "staff_id", "status"]
        );
    }
}
