//! Unified error codes for the Bloom platform
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: Store errors
//! - 4xxx: Booking errors (admission failures and lifecycle violations)
//! - 5xxx: Timeslot errors
//! - 6xxx: Catalog errors (treatments, resources)
//! - 7xxx: Webhook errors
//! - 8xxx: Account errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility (Rust, TypeScript, etc.)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Invalid format
    InvalidFormat = 6,
    /// Required field missing
    RequiredField = 7,
    /// Value out of range
    ValueOutOfRange = 8,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Invalid credentials (email/password)
    InvalidCredentials = 1002,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,
    /// Account is disabled
    AccountDisabled = 1005,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,
    /// Specific role required
    RoleRequired = 2002,
    /// Super admin role required
    SuperAdminRequired = 2003,
    /// Subject's store does not match the target store
    StoreScopeMismatch = 2004,
    /// Customers may only act on their own bookings
    NotBookingOwner = 2005,

    // ==================== 3xxx: Store ====================
    /// Store not found
    StoreNotFound = 3001,
    /// Store is deactivated
    StoreInactive = 3002,
    /// Store is closed at the requested time
    StoreClosed = 3003,
    /// Timezone is not a resolvable IANA zone
    InvalidTimezone = 3004,
    /// Operating hours entry is malformed
    InvalidOperatingHours = 3005,
    /// Store does not accept online bookings
    OnlineBookingDisabled = 3006,

    // ==================== 4xxx: Booking ====================
    /// Booking not found
    BookingNotFound = 4001,
    /// No active timeslot covers the requested interval
    NoTimeslot = 4002,
    /// Treatment concurrency cap reached
    TreatmentCapacity = 4003,
    /// Staff member already booked in the interval
    StaffConflict = 4004,
    /// A required resource is at capacity
    ResourceCapacity = 4005,
    /// Store daily booking limit reached
    DailyLimit = 4006,
    /// Store concurrent booking limit reached
    StoreCapacity = 4007,
    /// Requested start exceeds the advance booking window
    TooFarInAdvance = 4008,
    /// Staff member missing, inactive, or not eligible
    InvalidStaff = 4009,
    /// Requested start is in the past
    BookingInPast = 4010,
    /// Booking is no longer modifiable
    BookingNotModifiable = 4011,
    /// Cancellation deadline has passed
    CancellationDeadlinePassed = 4012,
    /// Status transition not allowed by the lifecycle
    InvalidStatusTransition = 4013,

    // ==================== 5xxx: Timeslot ====================
    /// Timeslot not found
    TimeslotNotFound = 5001,
    /// Timeslot overlaps an existing active slot
    TimeslotOverlap = 5002,
    /// Timeslot range has existing bookings
    TimeslotHasBookings = 5003,
    /// Generation date range exceeds the 30-day cap
    DateRangeTooLarge = 5004,

    // ==================== 6xxx: Catalog ====================
    /// Treatment not found
    TreatmentNotFound = 6001,
    /// Treatment is deactivated
    TreatmentInactive = 6002,
    /// Treatment has upcoming bookings
    TreatmentHasBookings = 6003,
    /// Resource not found
    ResourceNotFound = 6101,
    /// Resource is deactivated
    ResourceInactive = 6102,
    /// Resource belongs to a different store
    ResourceWrongStore = 6103,

    // ==================== 7xxx: Webhook ====================
    /// Webhook subscription not found
    SubscriptionNotFound = 7001,
    /// Unknown event name
    InvalidEventName = 7002,
    /// Payload signature mismatch
    InvalidSignature = 7003,
    /// Signature timestamp outside the replay window
    StaleTimestamp = 7004,

    // ==================== 8xxx: Account ====================
    /// User not found
    UserNotFound = 8001,
    /// Email already registered
    EmailExists = 8002,
    /// User account is deactivated
    UserInactive = 8003,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Configuration error
    ConfigError = 9003,
    /// Network error
    NetworkError = 9004,
    /// Operation timeout
    TimeoutError = 9005,
    /// Too many requests from this client
    RateLimited = 9101,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::InvalidFormat => "Invalid format",
            ErrorCode::RequiredField => "Required field is missing",
            ErrorCode::ValueOutOfRange => "Value is out of range",

            // Auth
            ErrorCode::NotAuthenticated => "User is not authenticated",
            ErrorCode::InvalidCredentials => "Invalid email or password",
            ErrorCode::TokenExpired => "Authentication token has expired",
            ErrorCode::TokenInvalid => "Authentication token is invalid",
            ErrorCode::AccountDisabled => "Account is disabled",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",
            ErrorCode::RoleRequired => "Specific role is required",
            ErrorCode::SuperAdminRequired => "Super admin role is required",
            ErrorCode::StoreScopeMismatch => "Operation is outside your store",
            ErrorCode::NotBookingOwner => "Customers may only act on their own bookings",

            // Store
            ErrorCode::StoreNotFound => "Store not found",
            ErrorCode::StoreInactive => "Store is deactivated",
            ErrorCode::StoreClosed => "Store is closed at the requested time",
            ErrorCode::InvalidTimezone => "Timezone is not a resolvable IANA zone",
            ErrorCode::InvalidOperatingHours => "Operating hours entry is malformed",
            ErrorCode::OnlineBookingDisabled => "Store does not accept online bookings",

            // Booking
            ErrorCode::BookingNotFound => "Booking not found",
            ErrorCode::NoTimeslot => "No timeslot covers the requested interval",
            ErrorCode::TreatmentCapacity => "Treatment concurrency cap reached",
            ErrorCode::StaffConflict => "Staff member is already booked in this interval",
            ErrorCode::ResourceCapacity => "A required resource is fully booked",
            ErrorCode::DailyLimit => "Store daily booking limit reached",
            ErrorCode::StoreCapacity => "Store concurrent booking limit reached",
            ErrorCode::TooFarInAdvance => "Requested start exceeds the advance booking window",
            ErrorCode::InvalidStaff => "Staff member is not eligible for this booking",
            ErrorCode::BookingInPast => "Booking start must be in the future",
            ErrorCode::BookingNotModifiable => "Booking is no longer modifiable",
            ErrorCode::CancellationDeadlinePassed => "Cancellation deadline has passed",
            ErrorCode::InvalidStatusTransition => "Status transition not allowed",

            // Timeslot
            ErrorCode::TimeslotNotFound => "Timeslot not found",
            ErrorCode::TimeslotOverlap => "Timeslot overlaps an existing active slot",
            ErrorCode::TimeslotHasBookings => "Timeslot range has existing bookings",
            ErrorCode::DateRangeTooLarge => "Generation range exceeds 30 days",

            // Catalog
            ErrorCode::TreatmentNotFound => "Treatment not found",
            ErrorCode::TreatmentInactive => "Treatment is deactivated",
            ErrorCode::TreatmentHasBookings => "Treatment has upcoming bookings",
            ErrorCode::ResourceNotFound => "Resource not found",
            ErrorCode::ResourceInactive => "Resource is deactivated",
            ErrorCode::ResourceWrongStore => "Resource belongs to a different store",

            // Webhook
            ErrorCode::SubscriptionNotFound => "Webhook subscription not found",
            ErrorCode::InvalidEventName => "Unknown event name",
            ErrorCode::InvalidSignature => "Payload signature mismatch",
            ErrorCode::StaleTimestamp => "Signature timestamp outside the replay window",

            // Account
            ErrorCode::UserNotFound => "User not found",
            ErrorCode::EmailExists => "Email already registered",
            ErrorCode::UserInactive => "User account is deactivated",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::ConfigError => "Configuration error",
            ErrorCode::NetworkError => "Network error",
            ErrorCode::TimeoutError => "Operation timed out",
            ErrorCode::RateLimited => "Too many requests, please retry later",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            6 => Ok(ErrorCode::InvalidFormat),
            7 => Ok(ErrorCode::RequiredField),
            8 => Ok(ErrorCode::ValueOutOfRange),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1002 => Ok(ErrorCode::InvalidCredentials),
            1003 => Ok(ErrorCode::TokenExpired),
            1004 => Ok(ErrorCode::TokenInvalid),
            1005 => Ok(ErrorCode::AccountDisabled),

            // Permission
            2001 => Ok(ErrorCode::PermissionDenied),
            2002 => Ok(ErrorCode::RoleRequired),
            2003 => Ok(ErrorCode::SuperAdminRequired),
            2004 => Ok(ErrorCode::StoreScopeMismatch),
            2005 => Ok(ErrorCode::NotBookingOwner),

            // Store
            3001 => Ok(ErrorCode::StoreNotFound),
            3002 => Ok(ErrorCode::StoreInactive),
            3003 => Ok(ErrorCode::StoreClosed),
            3004 => Ok(ErrorCode::InvalidTimezone),
            3005 => Ok(ErrorCode::InvalidOperatingHours),
            3006 => Ok(ErrorCode::OnlineBookingDisabled),

            // Booking
            4001 => Ok(ErrorCode::BookingNotFound),
            4002 => Ok(ErrorCode::NoTimeslot),
            4003 => Ok(ErrorCode::TreatmentCapacity),
            4004 => Ok(ErrorCode::StaffConflict),
            4005 => Ok(ErrorCode::ResourceCapacity),
            4006 => Ok(ErrorCode::DailyLimit),
            4007 => Ok(ErrorCode::StoreCapacity),
            4008 => Ok(ErrorCode::TooFarInAdvance),
            4009 => Ok(ErrorCode::InvalidStaff),
            4010 => Ok(ErrorCode::BookingInPast),
            4011 => Ok(ErrorCode::BookingNotModifiable),
            4012 => Ok(ErrorCode::CancellationDeadlinePassed),
            4013 => Ok(ErrorCode::InvalidStatusTransition),

            // Timeslot
            5001 => Ok(ErrorCode::TimeslotNotFound),
            5002 => Ok(ErrorCode::TimeslotOverlap),
            5003 => Ok(ErrorCode::TimeslotHasBookings),
            5004 => Ok(ErrorCode::DateRangeTooLarge),

            // Catalog
            6001 => Ok(ErrorCode::TreatmentNotFound),
            6002 => Ok(ErrorCode::TreatmentInactive),
            6003 => Ok(ErrorCode::TreatmentHasBookings),
            6101 => Ok(ErrorCode::ResourceNotFound),
            6102 => Ok(ErrorCode::ResourceInactive),
            6103 => Ok(ErrorCode::ResourceWrongStore),

            // Webhook
            7001 => Ok(ErrorCode::SubscriptionNotFound),
            7002 => Ok(ErrorCode::InvalidEventName),
            7003 => Ok(ErrorCode::InvalidSignature),
            7004 => Ok(ErrorCode::StaleTimestamp),

            // Account
            8001 => Ok(ErrorCode::UserNotFound),
            8002 => Ok(ErrorCode::EmailExists),
            8003 => Ok(ErrorCode::UserInactive),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9003 => Ok(ErrorCode::ConfigError),
            9004 => Ok(ErrorCode::NetworkError),
            9005 => Ok(ErrorCode::TimeoutError),
            9101 => Ok(ErrorCode::RateLimited),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::Success.code(), 0);
        assert_eq!(ErrorCode::ValidationFailed.code(), 2);
        assert_eq!(ErrorCode::NotAuthenticated.code(), 1001);
        assert_eq!(ErrorCode::PermissionDenied.code(), 2001);
        assert_eq!(ErrorCode::StoreNotFound.code(), 3001);
        assert_eq!(ErrorCode::StoreClosed.code(), 3003);
        assert_eq!(ErrorCode::NoTimeslot.code(), 4002);
        assert_eq!(ErrorCode::TreatmentCapacity.code(), 4003);
        assert_eq!(ErrorCode::StaffConflict.code(), 4004);
        assert_eq!(ErrorCode::ResourceCapacity.code(), 4005);
        assert_eq!(ErrorCode::DailyLimit.code(), 4006);
        assert_eq!(ErrorCode::StoreCapacity.code(), 4007);
        assert_eq!(ErrorCode::TimeslotHasBookings.code(), 5003);
        assert_eq!(ErrorCode::TreatmentNotFound.code(), 6001);
        assert_eq!(ErrorCode::SubscriptionNotFound.code(), 7001);
        assert_eq!(ErrorCode::UserNotFound.code(), 8001);
        assert_eq!(ErrorCode::InternalError.code(), 9001);
        assert_eq!(ErrorCode::RateLimited.code(), 9101);
    }

    #[test]
    fn test_is_success() {
        assert!(ErrorCode::Success.is_success());
        assert!(!ErrorCode::Unknown.is_success());
        assert!(!ErrorCode::NoTimeslot.is_success());
    }

    #[test]
    fn test_try_from_valid() {
        assert_eq!(ErrorCode::try_from(0), Ok(ErrorCode::Success));
        assert_eq!(ErrorCode::try_from(1001), Ok(ErrorCode::NotAuthenticated));
        assert_eq!(ErrorCode::try_from(4004), Ok(ErrorCode::StaffConflict));
        assert_eq!(ErrorCode::try_from(9001), Ok(ErrorCode::InternalError));
    }

    #[test]
    fn test_try_from_invalid() {
        assert_eq!(ErrorCode::try_from(999), Err(InvalidErrorCode(999)));
        assert_eq!(ErrorCode::try_from(4099), Err(InvalidErrorCode(4099)));
        assert_eq!(ErrorCode::try_from(10000), Err(InvalidErrorCode(10000)));
    }

    #[test]
    fn test_serialize_as_number() {
        let json = serde_json::to_string(&ErrorCode::NoTimeslot).unwrap();
        assert_eq!(json, "4002");

        let code: ErrorCode = serde_json::from_str("4002").unwrap();
        assert_eq!(code, ErrorCode::NoTimeslot);
    }

    #[test]
    fn test_roundtrip() {
        let codes = [
            ErrorCode::Success,
            ErrorCode::NotAuthenticated,
            ErrorCode::StoreClosed,
            ErrorCode::ResourceCapacity,
            ErrorCode::SubscriptionNotFound,
            ErrorCode::RateLimited,
        ];

        for code in codes {
            let json = serde_json::to_string(&code).unwrap();
            let parsed: ErrorCode = serde_json::from_str(&json).unwrap();
            assert_eq!(code, parsed);
        }
    }

    #[test]
    fn test_message() {
        assert_eq!(ErrorCode::StoreNotFound.message(), "Store not found");
        assert_eq!(
            ErrorCode::StaffConflict.message(),
            "Staff member is already booked in this interval"
        );
    }
}
