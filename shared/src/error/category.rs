//! Error category classification

use super::codes::ErrorCode;
use serde::{Deserialize, Serialize};

/// Error category classification based on error code ranges
///
/// Categories are determined by the leading digit of the error code:
/// - 0xxx: General errors
/// - 1xxx: Authentication errors
/// - 2xxx: Permission errors
/// - 3xxx: Store errors
/// - 4xxx: Booking errors
/// - 5xxx: Timeslot errors
/// - 6xxx: Catalog errors
/// - 7xxx: Webhook errors
/// - 8xxx: Account errors
/// - 9xxx: System errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// General errors (0xxx)
    General,
    /// Authentication errors (1xxx)
    Auth,
    /// Permission errors (2xxx)
    Permission,
    /// Store errors (3xxx)
    Store,
    /// Booking errors (4xxx)
    Booking,
    /// Timeslot errors (5xxx)
    Timeslot,
    /// Catalog errors (6xxx)
    Catalog,
    /// Webhook errors (7xxx)
    Webhook,
    /// Account errors (8xxx)
    Account,
    /// System errors (9xxx)
    System,
}

impl ErrorCategory {
    /// Determine category from error code value
    pub fn from_code(code: u16) -> Self {
        match code {
            0..1000 => Self::General,
            1000..2000 => Self::Auth,
            2000..3000 => Self::Permission,
            3000..4000 => Self::Store,
            4000..5000 => Self::Booking,
            5000..6000 => Self::Timeslot,
            6000..7000 => Self::Catalog,
            7000..8000 => Self::Webhook,
            8000..9000 => Self::Account,
            _ => Self::System,
        }
    }

    /// Get the string name for this category
    pub fn name(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Auth => "auth",
            Self::Permission => "permission",
            Self::Store => "store",
            Self::Booking => "booking",
            Self::Timeslot => "timeslot",
            Self::Catalog => "catalog",
            Self::Webhook => "webhook",
            Self::Account => "account",
            Self::System => "system",
        }
    }
}

impl ErrorCode {
    /// Get the category for this error code
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::from_code(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_from_code() {
        assert_eq!(ErrorCategory::from_code(0), ErrorCategory::General);
        assert_eq!(ErrorCategory::from_code(999), ErrorCategory::General);
        assert_eq!(ErrorCategory::from_code(1001), ErrorCategory::Auth);
        assert_eq!(ErrorCategory::from_code(2001), ErrorCategory::Permission);
        assert_eq!(ErrorCategory::from_code(3003), ErrorCategory::Store);
        assert_eq!(ErrorCategory::from_code(4002), ErrorCategory::Booking);
        assert_eq!(ErrorCategory::from_code(5001), ErrorCategory::Timeslot);
        assert_eq!(ErrorCategory::from_code(6101), ErrorCategory::Catalog);
        assert_eq!(ErrorCategory::from_code(7003), ErrorCategory::Webhook);
        assert_eq!(ErrorCategory::from_code(8001), ErrorCategory::Account);
        assert_eq!(ErrorCategory::from_code(9101), ErrorCategory::System);
        assert_eq!(ErrorCategory::from_code(10000), ErrorCategory::System);
    }

    #[test]
    fn test_error_code_category() {
        assert_eq!(ErrorCode::ValidationFailed.category(), ErrorCategory::General);
        assert_eq!(ErrorCode::TokenExpired.category(), ErrorCategory::Auth);
        assert_eq!(ErrorCode::StoreScopeMismatch.category(), ErrorCategory::Permission);
        assert_eq!(ErrorCode::StoreClosed.category(), ErrorCategory::Store);
        assert_eq!(ErrorCode::StaffConflict.category(), ErrorCategory::Booking);
        assert_eq!(ErrorCode::TimeslotOverlap.category(), ErrorCategory::Timeslot);
        assert_eq!(ErrorCode::TreatmentNotFound.category(), ErrorCategory::Catalog);
        assert_eq!(ErrorCode::InvalidSignature.category(), ErrorCategory::Webhook);
        assert_eq!(ErrorCode::EmailExists.category(), ErrorCategory::Account);
        assert_eq!(ErrorCode::RateLimited.category(), ErrorCategory::System);
    }

    #[test]
    fn test_category_name() {
        assert_eq!(ErrorCategory::Booking.name(), "booking");
        assert_eq!(ErrorCategory::Webhook.name(), "webhook");
    }

    #[test]
    fn test_category_serialize() {
        let json = serde_json::to_string(&ErrorCategory::Timeslot).unwrap();
        assert_eq!(json, "\"timeslot\"");
    }
}
