//! Operating-hours policy and timeslot generation

pub mod hours;
pub mod slots;
