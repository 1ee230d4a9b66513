//! Booking model and lifecycle state machine

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::treatment::Price;

/// Booking lifecycle status
///
/// `pending → confirmed → in_progress → completed`; `cancelled` is
/// reachable from the first three; `no_show` from pending/confirmed after
/// the booking's start. `completed`, `cancelled` and `no_show` are
/// terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    InProgress,
    Completed,
    Cancelled,
    NoShow,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::InProgress => "in_progress",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::NoShow => "no_show",
        }
    }

    pub fn parse(s: &str) -> Option<BookingStatus> {
        match s {
            "pending" => Some(BookingStatus::Pending),
            "confirmed" => Some(BookingStatus::Confirmed),
            "in_progress" => Some(BookingStatus::InProgress),
            "completed" => Some(BookingStatus::Completed),
            "cancelled" => Some(BookingStatus::Cancelled),
            "no_show" => Some(BookingStatus::NoShow),
            _ => None,
        }
    }

    /// Terminal statuses admit no further transitions
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            BookingStatus::Completed | BookingStatus::Cancelled | BookingStatus::NoShow
        )
    }

    /// Statuses that count against quotas
    pub fn counts_against_quota(&self) -> bool {
        !matches!(self, BookingStatus::Cancelled | BookingStatus::NoShow)
    }

    /// Whether the lifecycle graph allows `self → next`
    pub fn can_transition_to(&self, next: BookingStatus) -> bool {
        use BookingStatus::*;
        match (self, next) {
            (Pending, Confirmed) => true,
            (Confirmed, InProgress) => true,
            (InProgress, Completed) => true,
            (Pending | Confirmed | InProgress, Cancelled) => true,
            (Pending | Confirmed, NoShow) => true,
            _ => false,
        }
    }
}

/// Booking entity
///
/// `duration_minutes` and `price` are snapshots taken from the treatment
/// at admission time; later treatment edits do not alter them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: i64,
    pub customer_id: i64,
    pub store_id: i64,
    pub treatment_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub staff_id: Option<i64>,
    pub booking_date_time: DateTime<Utc>,
    pub duration_minutes: i32,
    pub status: BookingStatus,
    pub price: Price,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancellation_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancelled_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    pub reminder_sent: bool,
    pub created_at: DateTime<Utc>,
}

impl Booking {
    /// Exclusive end of the booked interval
    pub fn end_time(&self) -> DateTime<Utc> {
        self.booking_date_time + Duration::minutes(self.duration_minutes as i64)
    }

    /// Fields other than status/notes may change only in this window
    pub fn is_modifiable(&self, now: DateTime<Utc>) -> bool {
        matches!(self.status, BookingStatus::Pending | BookingStatus::Confirmed)
            && self.booking_date_time > now
    }

    /// Whether cancellation is still open given the store's deadline
    pub fn is_cancellable(&self, now: DateTime<Utc>, deadline_hours: i32) -> bool {
        !self.status.is_terminal()
            && self.booking_date_time - now >= Duration::hours(deadline_hours as i64)
    }
}

/// Create booking payload
#[derive(Debug, Clone, Deserialize)]
pub struct BookingCreate {
    pub store_id: i64,
    pub treatment_id: i64,
    /// Staff and admins may book on behalf of a customer; customers book
    /// for themselves and leave this unset
    #[serde(default)]
    pub customer_id: Option<i64>,
    #[serde(default)]
    pub staff_id: Option<i64>,
    pub booking_date_time: DateTime<Utc>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Modify booking payload (reschedule / staff change / notes)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookingUpdate {
    pub booking_date_time: Option<DateTime<Utc>>,
    /// `Some(None)` clears the staff assignment
    #[serde(default, with = "double_option")]
    pub staff_id: Option<Option<i64>>,
    pub notes: Option<String>,
}

/// Distinguishes an absent key from an explicit `null`
mod double_option {
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
    where
        T: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(de).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal::Decimal;

    fn booking(status: BookingStatus, start: DateTime<Utc>) -> Booking {
        Booking {
            id: 1,
            customer_id: 2,
            store_id: 3,
            treatment_id: 4,
            staff_id: None,
            booking_date_time: start,
            duration_minutes: 60,
            status,
            price: Price {
                amount: Decimal::new(4500, 2),
                currency: "EUR".into(),
            },
            notes: None,
            cancellation_reason: None,
            cancelled_at: None,
            completed_at: None,
            reminder_sent: false,
            created_at: start,
        }
    }

    #[test]
    fn test_forward_transitions() {
        use BookingStatus::*;
        assert!(Pending.can_transition_to(Confirmed));
        assert!(Confirmed.can_transition_to(InProgress));
        assert!(InProgress.can_transition_to(Completed));
    }

    #[test]
    fn test_cancellation_transitions() {
        use BookingStatus::*;
        assert!(Pending.can_transition_to(Cancelled));
        assert!(Confirmed.can_transition_to(Cancelled));
        assert!(InProgress.can_transition_to(Cancelled));
        assert!(!Completed.can_transition_to(Cancelled));
        assert!(!NoShow.can_transition_to(Cancelled));
    }

    #[test]
    fn test_no_show_transitions() {
        use BookingStatus::*;
        assert!(Pending.can_transition_to(NoShow));
        assert!(Confirmed.can_transition_to(NoShow));
        assert!(!InProgress.can_transition_to(NoShow));
        assert!(!Cancelled.can_transition_to(NoShow));
    }

    #[test]
    fn test_no_skipping_states() {
        use BookingStatus::*;
        assert!(!Pending.can_transition_to(InProgress));
        assert!(!Pending.can_transition_to(Completed));
        assert!(!Confirmed.can_transition_to(Completed));
        assert!(!Confirmed.can_transition_to(Pending));
    }

    #[test]
    fn test_terminal_states_are_closed() {
        use BookingStatus::*;
        for terminal in [Completed, Cancelled, NoShow] {
            assert!(terminal.is_terminal());
            for next in [Pending, Confirmed, InProgress, Completed, Cancelled, NoShow] {
                assert!(!terminal.can_transition_to(next), "{terminal:?} -> {next:?}");
            }
        }
    }

    #[test]
    fn test_quota_statuses() {
        use BookingStatus::*;
        assert!(Pending.counts_against_quota());
        assert!(Confirmed.counts_against_quota());
        assert!(InProgress.counts_against_quota());
        assert!(Completed.counts_against_quota());
        assert!(!Cancelled.counts_against_quota());
        assert!(!NoShow.counts_against_quota());
    }

    #[test]
    fn test_end_time() {
        let start = Utc.with_ymd_and_hms(2026, 3, 2, 10, 0, 0).unwrap();
        let b = booking(BookingStatus::Pending, start);
        assert_eq!(b.end_time(), Utc.with_ymd_and_hms(2026, 3, 2, 11, 0, 0).unwrap());
    }

    #[test]
    fn test_cancellable_at_exact_deadline() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap();
        // Exactly 24h ahead: still cancellable
        let b = booking(BookingStatus::Confirmed, now + Duration::hours(24));
        assert!(b.is_cancellable(now, 24));
        // One minute inside the window: not cancellable
        let b = booking(
            BookingStatus::Confirmed,
            now + Duration::hours(24) - Duration::minutes(1),
        );
        assert!(!b.is_cancellable(now, 24));
    }

    #[test]
    fn test_terminal_never_cancellable() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap();
        let b = booking(BookingStatus::Cancelled, now + Duration::days(7));
        assert!(!b.is_cancellable(now, 24));
    }

    #[test]
    fn test_modifiable_window() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap();
        let future = now + Duration::hours(2);
        assert!(booking(BookingStatus::Pending, future).is_modifiable(now));
        assert!(booking(BookingStatus::Confirmed, future).is_modifiable(now));
        assert!(!booking(BookingStatus::InProgress, future).is_modifiable(now));
        // Started bookings are frozen
        assert!(!booking(BookingStatus::Pending, now - Duration::minutes(1)).is_modifiable(now));
    }

    #[test]
    fn test_booking_update_staff_tristate() {
        let absent: BookingUpdate = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(absent.staff_id, None);

        let cleared: BookingUpdate = serde_json::from_str(r#"{"staff_id": null}"#).unwrap();
        assert_eq!(cleared.staff_id, Some(None));

        let set: BookingUpdate = serde_json::from_str(r#"{"staff_id": 9}"#).unwrap();
        assert_eq!(set.staff_id, Some(Some(9)));
    }
}
