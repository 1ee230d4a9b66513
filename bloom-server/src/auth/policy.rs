//! Role-based access policy
//!
//! Pure functions over closed enums: `allow(role, action)` plus the
//! store-ownership rule (staff and store admins act only inside their own
//! store; customers only on their own records; super admins everywhere).

use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::booking::Booking;
use shared::models::user::Role;

use super::jwt::Identity;

/// Everything a caller can ask the platform to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Create or deactivate stores
    ManageStores,
    /// Update a store's profile, hours, or settings
    UpdateStore,
    /// Create/update treatments and resources
    ManageCatalog,
    /// Generate or regenerate timeslots
    GenerateTimeslots,
    /// Read catalogs, slots, and availability
    ViewAvailability,
    /// Create or modify a booking
    CreateBooking,
    /// Confirm / start / complete / no-show a booking
    TransitionBooking,
    /// Webhook subscription CRUD
    ManageWebhooks,
}

/// The role → action matrix
pub fn allow(role: Role, action: Action) -> bool {
    use Action::*;
    match role {
        Role::SuperAdmin => true,
        Role::StoreAdmin => !matches!(action, ManageStores | ManageWebhooks),
        Role::Staff => matches!(
            action,
            ViewAvailability | CreateBooking | TransitionBooking
        ),
        Role::Customer => matches!(action, ViewAvailability | CreateBooking),
    }
}

/// Gate an action, 403 on refusal
pub fn require(identity: &Identity, action: Action) -> AppResult<()> {
    if allow(identity.role, action) {
        Ok(())
    } else {
        Err(AppError::new(ErrorCode::PermissionDenied))
    }
}

/// Store-ownership rule: staff/store_admin actions are additionally gated
/// by their store assignment
pub fn require_store_scope(identity: &Identity, store_id: i64) -> AppResult<()> {
    match identity.role {
        Role::SuperAdmin => Ok(()),
        Role::StoreAdmin | Role::Staff if identity.store_id == Some(store_id) => Ok(()),
        Role::StoreAdmin | Role::Staff => Err(AppError::new(ErrorCode::StoreScopeMismatch)),
        Role::Customer => Err(AppError::new(ErrorCode::PermissionDenied)),
    }
}

/// Visibility rule for a single booking: customers see their own,
/// staff/store_admin their store's, super admins everything
pub fn require_booking_access(identity: &Identity, booking: &Booking) -> AppResult<()> {
    match identity.role {
        Role::SuperAdmin => Ok(()),
        Role::StoreAdmin | Role::Staff => {
            if identity.store_id == Some(booking.store_id) {
                Ok(())
            } else {
                Err(AppError::new(ErrorCode::StoreScopeMismatch))
            }
        }
        Role::Customer => {
            if identity.user_id == booking.customer_id {
                Ok(())
            } else {
                Err(AppError::new(ErrorCode::NotBookingOwner))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;
    use shared::models::booking::BookingStatus;
    use shared::models::treatment::Price;

    fn identity(role: Role, store_id: Option<i64>) -> Identity {
        Identity {
            user_id: 100,
            role,
            store_id,
        }
    }

    fn booking(customer_id: i64, store_id: i64) -> Booking {
        Booking {
            id: 1,
            customer_id,
            store_id,
            treatment_id: 4,
            staff_id: None,
            booking_date_time: Utc.with_ymd_and_hms(2026, 3, 2, 10, 0, 0).unwrap(),
            duration_minutes: 30,
            status: BookingStatus::Pending,
            price: Price {
                amount: Decimal::ZERO,
                currency: "EUR".into(),
            },
            notes: None,
            cancellation_reason: None,
            cancelled_at: None,
            completed_at: None,
            reminder_sent: false,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_super_admin_allows_everything() {
        for action in [
            Action::ManageStores,
            Action::UpdateStore,
            Action::ManageCatalog,
            Action::GenerateTimeslots,
            Action::ViewAvailability,
            Action::CreateBooking,
            Action::TransitionBooking,
            Action::ManageWebhooks,
        ] {
            assert!(allow(Role::SuperAdmin, action), "{action:?}");
        }
    }

    #[test]
    fn test_store_admin_cannot_touch_platform_surfaces() {
        assert!(!allow(Role::StoreAdmin, Action::ManageStores));
        assert!(!allow(Role::StoreAdmin, Action::ManageWebhooks));
        assert!(allow(Role::StoreAdmin, Action::ManageCatalog));
        assert!(allow(Role::StoreAdmin, Action::GenerateTimeslots));
    }

    #[test]
    fn test_staff_matrix() {
        assert!(allow(Role::Staff, Action::TransitionBooking));
        assert!(allow(Role::Staff, Action::CreateBooking));
        assert!(!allow(Role::Staff, Action::ManageCatalog));
        assert!(!allow(Role::Staff, Action::GenerateTimeslots));
    }

    #[test]
    fn test_customer_matrix() {
        assert!(allow(Role::Customer, Action::ViewAvailability));
        assert!(allow(Role::Customer, Action::CreateBooking));
        assert!(!allow(Role::Customer, Action::TransitionBooking));
        assert!(!allow(Role::Customer, Action::ManageWebhooks));
    }

    #[test]
    fn test_store_scope() {
        assert!(require_store_scope(&identity(Role::SuperAdmin, None), 7).is_ok());
        assert!(require_store_scope(&identity(Role::StoreAdmin, Some(7)), 7).is_ok());

        let err = require_store_scope(&identity(Role::StoreAdmin, Some(8)), 7).unwrap_err();
        assert_eq!(err.code, ErrorCode::StoreScopeMismatch);

        let err = require_store_scope(&identity(Role::Customer, None), 7).unwrap_err();
        assert_eq!(err.code, ErrorCode::PermissionDenied);
    }

    #[test]
    fn test_booking_access() {
        // Customer sees own booking only
        let own = booking(100, 7);
        let other = booking(200, 7);
        let customer = identity(Role::Customer, None);
        assert!(require_booking_access(&customer, &own).is_ok());
        assert_eq!(
            require_booking_access(&customer, &other).unwrap_err().code,
            ErrorCode::NotBookingOwner
        );

        // Staff scoped to their store
        let staff = identity(Role::Staff, Some(7));
        assert!(require_booking_access(&staff, &other).is_ok());
        assert_eq!(
            require_booking_access(&staff, &booking(200, 8)).unwrap_err().code,
            ErrorCode::StoreScopeMismatch
        );
    }
}
