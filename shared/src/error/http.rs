//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            // Success
            Self::Success => StatusCode::OK,

            // 404 Not Found
            Self::NotFound
            | Self::StoreNotFound
            | Self::StoreInactive
            | Self::BookingNotFound
            | Self::TimeslotNotFound
            | Self::TreatmentNotFound
            | Self::TreatmentInactive
            | Self::ResourceNotFound
            | Self::SubscriptionNotFound
            | Self::UserNotFound => StatusCode::NOT_FOUND,

            // 409 Conflict (admission failures and lifecycle violations)
            Self::AlreadyExists
            | Self::StoreClosed
            | Self::NoTimeslot
            | Self::TreatmentCapacity
            | Self::StaffConflict
            | Self::ResourceCapacity
            | Self::DailyLimit
            | Self::StoreCapacity
            | Self::TooFarInAdvance
            | Self::InvalidStaff
            | Self::BookingNotModifiable
            | Self::CancellationDeadlinePassed
            | Self::InvalidStatusTransition
            | Self::TimeslotOverlap
            | Self::TimeslotHasBookings
            | Self::TreatmentHasBookings
            | Self::EmailExists => StatusCode::CONFLICT,

            // 401 Unauthorized
            Self::NotAuthenticated
            | Self::InvalidCredentials
            | Self::TokenExpired
            | Self::TokenInvalid
            | Self::AccountDisabled
            | Self::InvalidSignature
            | Self::StaleTimestamp => StatusCode::UNAUTHORIZED,

            // 403 Forbidden
            Self::PermissionDenied
            | Self::RoleRequired
            | Self::SuperAdminRequired
            | Self::StoreScopeMismatch
            | Self::NotBookingOwner
            | Self::OnlineBookingDisabled
            | Self::UserInactive => StatusCode::FORBIDDEN,

            // 429 Too Many Requests
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,

            // 503 Service Unavailable (transient errors, client can retry)
            Self::NetworkError | Self::TimeoutError => StatusCode::SERVICE_UNAVAILABLE,

            // 500 Internal Server Error
            Self::InternalError | Self::DatabaseError | Self::ConfigError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }

            // 400 Bad Request (default for validation/business errors)
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_status() {
        assert_eq!(ErrorCode::StoreNotFound.http_status(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorCode::BookingNotFound.http_status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ErrorCode::SubscriptionNotFound.http_status(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_admission_failures_are_conflicts() {
        for code in [
            ErrorCode::StoreClosed,
            ErrorCode::NoTimeslot,
            ErrorCode::TreatmentCapacity,
            ErrorCode::StaffConflict,
            ErrorCode::ResourceCapacity,
            ErrorCode::DailyLimit,
            ErrorCode::StoreCapacity,
            ErrorCode::TooFarInAdvance,
            ErrorCode::InvalidStaff,
        ] {
            assert_eq!(code.http_status(), StatusCode::CONFLICT, "{code:?}");
        }
    }

    #[test]
    fn test_auth_status() {
        assert_eq!(
            ErrorCode::NotAuthenticated.http_status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ErrorCode::InvalidSignature.http_status(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn test_forbidden_status() {
        assert_eq!(
            ErrorCode::StoreScopeMismatch.http_status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ErrorCode::NotBookingOwner.http_status(),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn test_rate_limit_status() {
        assert_eq!(
            ErrorCode::RateLimited.http_status(),
            StatusCode::TOO_MANY_REQUESTS
        );
    }

    #[test]
    fn test_internal_error_status() {
        assert_eq!(
            ErrorCode::InternalError.http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ErrorCode::DatabaseError.http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_validation_defaults_to_bad_request() {
        assert_eq!(
            ErrorCode::ValidationFailed.http_status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ErrorCode::BookingInPast.http_status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ErrorCode::InvalidEventName.http_status(),
            StatusCode::BAD_REQUEST
        );
    }
}
