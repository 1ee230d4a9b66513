//! Booking endpoints

use axum::extract::{Path, Query, State};
use axum::{Extension, Json};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use shared::error::{ApiResponse, AppError, ErrorCode};
use shared::models::booking::{Booking, BookingCreate, BookingStatus, BookingUpdate};
use shared::models::user::Role;

use super::{ApiResult, service};
use crate::auth::Identity;
use crate::auth::policy::{self, Action};
use crate::db;
use crate::db::bookings::BookingFilter;
use crate::reservation::{self, BookingRequest};
use crate::state::AppState;

/// POST /api/bookings
pub async fn create_booking(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(payload): Json<BookingCreate>,
) -> ApiResult<Booking> {
    policy::require(&identity, Action::CreateBooking)?;

    // Customers book for themselves; staff and admins may name a customer
    let customer_id = match identity.role {
        Role::Customer => {
            if payload.customer_id.is_some_and(|id| id != identity.user_id) {
                return Err(AppError::new(ErrorCode::NotBookingOwner));
            }
            identity.user_id
        }
        _ => {
            policy::require_store_scope(&identity, payload.store_id)?;
            payload
                .customer_id
                .ok_or_else(|| AppError::validation("customer_id is required"))?
        }
    };

    if identity.role == Role::Customer {
        let store = db::stores::get(&state.pool, payload.store_id)
            .await
            .map_err(service)?
            .ok_or_else(|| AppError::new(ErrorCode::StoreNotFound))?;
        if !store.settings.allow_online_booking {
            return Err(AppError::new(ErrorCode::OnlineBookingDisabled));
        }
    }

    let booking = reservation::create_booking(
        &state.pool,
        &state.events,
        BookingRequest {
            customer_id,
            store_id: payload.store_id,
            treatment_id: payload.treatment_id,
            staff_id: payload.staff_id,
            booking_date_time: payload.booking_date_time,
            notes: payload.notes,
        },
    )
    .await?;

    Ok(ApiResponse::success(booking))
}

/// GET /api/bookings/:id
pub async fn get_booking(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(booking_id): Path<i64>,
) -> ApiResult<Booking> {
    let booking = db::bookings::get(&state.pool, booking_id)
        .await
        .map_err(service)?
        .ok_or_else(|| AppError::new(ErrorCode::BookingNotFound))?;
    policy::require_booking_access(&identity, &booking)?;
    Ok(ApiResponse::success(booking))
}

#[derive(Deserialize)]
pub struct ListQuery {
    pub store_id: Option<i64>,
    pub customer_id: Option<i64>,
    pub staff_id: Option<i64>,
    pub status: Option<BookingStatus>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_page_size")]
    pub page_size: i64,
}

fn default_page() -> i64 {
    1
}

fn default_page_size() -> i64 {
    20
}

/// GET /api/bookings — customers see their own, staff their store's
pub async fn list_bookings(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Vec<Booking>> {
    let page = query.page.max(1);
    let page_size = query.page_size.clamp(1, 100);

    let mut filter = BookingFilter {
        store_id: query.store_id,
        customer_id: query.customer_id,
        staff_id: query.staff_id,
        status: query.status,
        from: query.from,
        to: query.to,
    };

    match identity.role {
        Role::SuperAdmin => {}
        Role::StoreAdmin | Role::Staff => {
            let own_store = identity.store_id;
            if filter.store_id.is_some() && filter.store_id != own_store {
                return Err(AppError::new(ErrorCode::StoreScopeMismatch));
            }
            filter.store_id = own_store;
        }
        Role::Customer => {
            if filter.customer_id.is_some_and(|id| id != identity.user_id) {
                return Err(AppError::new(ErrorCode::NotBookingOwner));
            }
            filter.customer_id = Some(identity.user_id);
        }
    }

    let (bookings, total) = db::bookings::list(&state.pool, &filter, page, page_size)
        .await
        .map_err(service)?;
    Ok(ApiResponse::paginated(bookings, page, page_size, total))
}

/// PATCH /api/bookings/:id — reschedule, staff change, notes
pub async fn update_booking(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(booking_id): Path<i64>,
    Json(payload): Json<BookingUpdate>,
) -> ApiResult<Booking> {
    policy::require(&identity, Action::CreateBooking)?;
    let existing = db::bookings::get(&state.pool, booking_id)
        .await
        .map_err(service)?
        .ok_or_else(|| AppError::new(ErrorCode::BookingNotFound))?;
    policy::require_booking_access(&identity, &existing)?;

    let booking =
        reservation::modify_booking(&state.pool, &state.events, booking_id, &payload).await?;
    Ok(ApiResponse::success(booking))
}

#[derive(Deserialize)]
pub struct TransitionRequest {
    pub status: BookingStatus,
}

/// POST /api/bookings/:id/status
pub async fn transition_booking(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(booking_id): Path<i64>,
    Json(payload): Json<TransitionRequest>,
) -> ApiResult<Booking> {
    policy::require(&identity, Action::TransitionBooking)?;
    let existing = db::bookings::get(&state.pool, booking_id)
        .await
        .map_err(service)?
        .ok_or_else(|| AppError::new(ErrorCode::BookingNotFound))?;
    policy::require_booking_access(&identity, &existing)?;

    let booking =
        reservation::transition_status(&state.pool, &state.events, booking_id, payload.status)
            .await?;
    Ok(ApiResponse::success(booking))
}

#[derive(Deserialize)]
pub struct CancelRequest {
    #[serde(default)]
    pub reason: Option<String>,
}

/// POST /api/bookings/:id/cancel
pub async fn cancel_booking(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(booking_id): Path<i64>,
    Json(payload): Json<CancelRequest>,
) -> ApiResult<Booking> {
    let existing = db::bookings::get(&state.pool, booking_id)
        .await
        .map_err(service)?
        .ok_or_else(|| AppError::new(ErrorCode::BookingNotFound))?;
    policy::require_booking_access(&identity, &existing)?;

    let booking =
        reservation::cancel_booking(&state.pool, &state.events, booking_id, payload.reason).await?;
    Ok(ApiResponse::success(booking))
}
