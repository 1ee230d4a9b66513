//! API routes and handlers

mod auth;
mod availability;
mod bookings;
mod resources;
mod stores;
mod timeslots;
mod treatments;
mod webhooks;

use axum::routing::{get, post, put};
use axum::{Router, middleware};
use shared::error::{ApiResponse, AppError};
use tower_http::trace::TraceLayer;

use crate::auth::middleware::auth_middleware;
use crate::auth::rate_limit::rate_limit_middleware;
use crate::error::ServiceError;
use crate::state::AppState;

/// Every handler answers with the platform envelope or an `AppError`
pub type ApiResult<T> = Result<ApiResponse<T>, AppError>;

/// Map any service-layer error into the API error type (DB errors are
/// logged and collapsed to InternalError on the way through)
pub(crate) fn service<E>(e: E) -> AppError
where
    ServiceError: From<E>,
{
    ServiceError::from(e).into()
}

/// Create the combined router
pub fn router(state: AppState) -> Router {
    // Credential endpoints and the signature-authenticated callback sink
    // stay outside the auth layer
    let public = Router::new()
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/refresh", post(auth::refresh))
        .route("/api/webhooks/inbound", post(webhooks::inbound_webhook));

    let protected = Router::new()
        .route("/api/auth/password", post(auth::change_password))
        .route("/api/stores", post(stores::create_store))
        .route(
            "/api/stores/:id",
            get(stores::get_store).patch(stores::update_store),
        )
        .route("/api/stores/:id/settings", put(stores::update_settings))
        .route(
            "/api/stores/:id/treatments",
            post(treatments::create_treatment).get(treatments::list_treatments),
        )
        .route(
            "/api/treatments/:id",
            get(treatments::get_treatment)
                .patch(treatments::update_treatment)
                .delete(treatments::deactivate_treatment),
        )
        .route(
            "/api/stores/:id/resources",
            post(resources::create_resource).get(resources::list_resources),
        )
        .route("/api/resources/:id", axum::routing::patch(resources::update_resource))
        .route("/api/stores/:id/timeslots", get(timeslots::list_timeslots))
        .route("/api/stores/:id/timeslots/generate", post(timeslots::generate))
        .route("/api/availability/slots", get(availability::get_slots))
        .route(
            "/api/bookings",
            post(bookings::create_booking).get(bookings::list_bookings),
        )
        .route(
            "/api/bookings/:id",
            get(bookings::get_booking).patch(bookings::update_booking),
        )
        .route("/api/bookings/:id/status", post(bookings::transition_booking))
        .route("/api/bookings/:id/cancel", post(bookings::cancel_booking))
        .route(
            "/api/webhooks/subscriptions",
            post(webhooks::create_subscription).get(webhooks::list_subscriptions),
        )
        .route(
            "/api/webhooks/subscriptions/:id",
            get(webhooks::get_subscription)
                .patch(webhooks::update_subscription)
                .delete(webhooks::delete_subscription),
        )
        .route(
            "/api/webhooks/subscriptions/:id/reactivate",
            post(webhooks::reactivate_subscription),
        )
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(public)
        .merge(protected)
        .layer(middleware::from_fn_with_state(
            state.rate_limiter.clone(),
            rate_limit_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
