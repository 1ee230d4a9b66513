//! Timeslot model — discretized capacity buckets per store

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Allowed per-slot capacity range
pub const MIN_SLOT_CAPACITY: i32 = 1;
pub const MAX_SLOT_CAPACITY: i32 = 100;

/// Half-open interval overlap: `[a_start, a_end)` meets `[b_start, b_end)`.
///
/// Touching intervals do not overlap.
pub fn intervals_overlap(
    a_start: DateTime<Utc>,
    a_end: DateTime<Utc>,
    b_start: DateTime<Utc>,
    b_end: DateTime<Utc>,
) -> bool {
    a_start < b_end && b_start < a_end
}

/// Timeslot entity
///
/// `[start_time, end_time)` half-open; active slots of one store never
/// overlap. `current_bookings` is mutated only inside the admission
/// transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Timeslot {
    pub id: i64,
    pub store_id: i64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub max_capacity: i32,
    pub current_bookings: i32,
    pub is_active: bool,
    /// Treatments admitted by this slot (empty = all)
    pub treatment_ids: Vec<i64>,
    /// Staff admitted by this slot (empty = any)
    pub staff_ids: Vec<i64>,
}

impl Timeslot {
    /// Whether the slot fully contains `[start, end)`
    pub fn covers(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.start_time <= start && end <= self.end_time
    }

    pub fn has_capacity(&self) -> bool {
        self.current_bookings < self.max_capacity
    }

    pub fn remaining_capacity(&self) -> i32 {
        (self.max_capacity - self.current_bookings).max(0)
    }

    pub fn admits_treatment(&self, treatment_id: i64) -> bool {
        self.treatment_ids.is_empty() || self.treatment_ids.contains(&treatment_id)
    }

    pub fn admits_staff(&self, staff_id: i64) -> bool {
        self.staff_ids.is_empty() || self.staff_ids.contains(&staff_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, h, m, 0).unwrap()
    }

    fn slot(start_h: u32, end_h: u32) -> Timeslot {
        Timeslot {
            id: 1,
            store_id: 10,
            start_time: at(start_h, 0),
            end_time: at(end_h, 0),
            max_capacity: 2,
            current_bookings: 0,
            is_active: true,
            treatment_ids: vec![],
            staff_ids: vec![],
        }
    }

    #[test]
    fn test_touching_intervals_do_not_overlap() {
        assert!(!intervals_overlap(at(9, 0), at(10, 0), at(10, 0), at(11, 0)));
        assert!(!intervals_overlap(at(10, 0), at(11, 0), at(9, 0), at(10, 0)));
    }

    #[test]
    fn test_overlapping_intervals() {
        assert!(intervals_overlap(at(9, 0), at(10, 30), at(10, 0), at(11, 0)));
        // Containment
        assert!(intervals_overlap(at(9, 0), at(12, 0), at(10, 0), at(11, 0)));
        // Identity
        assert!(intervals_overlap(at(9, 0), at(10, 0), at(9, 0), at(10, 0)));
    }

    #[test]
    fn test_covers_half_open() {
        let s = slot(10, 11);
        // End equal to slot end is admissible
        assert!(s.covers(at(10, 0), at(11, 0)));
        assert!(s.covers(at(10, 15), at(10, 45)));
        // One minute past the slot end is not
        assert!(!s.covers(at(10, 0), at(11, 1)));
        assert!(!s.covers(at(9, 59), at(10, 30)));
    }

    #[test]
    fn test_capacity() {
        let mut s = slot(10, 11);
        assert!(s.has_capacity());
        assert_eq!(s.remaining_capacity(), 2);
        s.current_bookings = 2;
        assert!(!s.has_capacity());
        assert_eq!(s.remaining_capacity(), 0);
    }

    #[test]
    fn test_whitelists() {
        let mut s = slot(10, 11);
        assert!(s.admits_treatment(7));
        assert!(s.admits_staff(7));

        s.treatment_ids = vec![1, 2];
        s.staff_ids = vec![5];
        assert!(s.admits_treatment(2));
        assert!(!s.admits_treatment(7));
        assert!(s.admits_staff(5));
        assert!(!s.admits_staff(7));
    }
}
