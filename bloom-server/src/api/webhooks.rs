//! Webhook subscription management (super_admin only) and the inbound
//! callback entry point

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::{Extension, Json};
use chrono::Utc;
use serde::Serialize;
use shared::EventType;
use shared::error::{ApiResponse, AppError, ErrorCode};
use shared::models::subscription::{
    MAX_RETRIES_LIMIT, SubscriptionCreate, SubscriptionHealth, SubscriptionUpdate,
    WebhookSubscription,
};

use super::{ApiResult, service};
use crate::auth::Identity;
use crate::auth::policy::{self, Action};
use crate::db;
use crate::dispatcher::sign;
use crate::state::AppState;

/// Subscription plus its derived health. The signing secret never leaves
/// the server after creation.
#[derive(Serialize)]
pub struct SubscriptionResponse {
    #[serde(flatten)]
    pub subscription: WebhookSubscription,
    pub health: SubscriptionHealth,
}

impl From<WebhookSubscription> for SubscriptionResponse {
    fn from(subscription: WebhookSubscription) -> Self {
        let health = subscription.health(Utc::now());
        Self {
            subscription,
            health,
        }
    }
}

/// Creation response: the only place the secret is ever returned
#[derive(Serialize)]
pub struct SubscriptionCreatedResponse {
    #[serde(flatten)]
    pub subscription: WebhookSubscription,
    pub health: SubscriptionHealth,
    pub secret: String,
}

fn validate_payload(url: Option<&str>, events: Option<&[String]>, max_retries: Option<i32>) -> Result<(), AppError> {
    if let Some(url) = url
        && !(url.starts_with("http://") || url.starts_with("https://"))
    {
        return Err(AppError::validation("URL must be http or https"));
    }
    if let Some(events) = events {
        if events.is_empty() {
            return Err(AppError::validation("At least one event name is required"));
        }
        for name in events {
            if EventType::parse(name).is_none() {
                return Err(AppError::new(ErrorCode::InvalidEventName).with_detail("event", name.clone()));
            }
        }
    }
    if let Some(max_retries) = max_retries
        && !(0..=MAX_RETRIES_LIMIT).contains(&max_retries)
    {
        return Err(AppError::with_message(
            ErrorCode::ValueOutOfRange,
            format!("max_retries must be in [0, {MAX_RETRIES_LIMIT}]"),
        ));
    }
    Ok(())
}

/// POST /api/webhooks/subscriptions
pub async fn create_subscription(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(payload): Json<SubscriptionCreate>,
) -> ApiResult<SubscriptionCreatedResponse> {
    policy::require(&identity, Action::ManageWebhooks)?;
    validate_payload(
        Some(&payload.url),
        Some(&payload.events),
        Some(payload.max_retries),
    )?;

    let secret = shared::util::generate_secret();
    let subscription = db::subscriptions::create(&state.pool, &payload, &secret)
        .await
        .map_err(service)?;

    let health = subscription.health(Utc::now());
    Ok(ApiResponse::success(SubscriptionCreatedResponse {
        subscription,
        health,
        secret,
    }))
}

/// GET /api/webhooks/subscriptions
pub async fn list_subscriptions(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> ApiResult<Vec<SubscriptionResponse>> {
    policy::require(&identity, Action::ManageWebhooks)?;
    let subscriptions = db::subscriptions::list(&state.pool).await.map_err(service)?;
    Ok(ApiResponse::success(
        subscriptions.into_iter().map(Into::into).collect(),
    ))
}

/// GET /api/webhooks/subscriptions/:id
pub async fn get_subscription(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<i64>,
) -> ApiResult<SubscriptionResponse> {
    policy::require(&identity, Action::ManageWebhooks)?;
    let subscription = db::subscriptions::get(&state.pool, id)
        .await
        .map_err(service)?
        .ok_or_else(|| AppError::new(ErrorCode::SubscriptionNotFound))?;
    Ok(ApiResponse::success(subscription.into()))
}

/// PATCH /api/webhooks/subscriptions/:id
pub async fn update_subscription(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<i64>,
    Json(payload): Json<SubscriptionUpdate>,
) -> ApiResult<SubscriptionResponse> {
    policy::require(&identity, Action::ManageWebhooks)?;
    validate_payload(
        payload.url.as_deref(),
        payload.events.as_deref(),
        payload.max_retries,
    )?;

    let subscription = db::subscriptions::update(&state.pool, id, &payload)
        .await
        .map_err(service)?
        .ok_or_else(|| AppError::new(ErrorCode::SubscriptionNotFound))?;
    Ok(ApiResponse::success(subscription.into()))
}

/// DELETE /api/webhooks/subscriptions/:id
pub async fn delete_subscription(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<i64>,
) -> ApiResult<()> {
    policy::require(&identity, Action::ManageWebhooks)?;
    let deleted = db::subscriptions::delete(&state.pool, id)
        .await
        .map_err(service)?;
    if !deleted {
        return Err(AppError::new(ErrorCode::SubscriptionNotFound));
    }
    Ok(ApiResponse::ok())
}

/// POST /api/webhooks/inbound — signature-authenticated callback sink.
///
/// Verified against the platform default secret with a constant-time
/// comparison; requests older than the replay window are rejected.
pub async fn inbound_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<()> {
    let signature = headers
        .get("x-signature")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::new(ErrorCode::InvalidSignature))?;
    let timestamp: i64 = headers
        .get("x-timestamp")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
        .ok_or_else(|| AppError::new(ErrorCode::StaleTimestamp))?;

    sign::verify(
        &state.webhook_default_secret,
        &body,
        signature,
        timestamp,
        Utc::now().timestamp(),
    )?;

    tracing::info!(bytes = body.len(), "Verified inbound webhook callback");
    Ok(ApiResponse::ok())
}

/// POST /api/webhooks/subscriptions/:id/reactivate — clears the retry
/// counter and re-enables delivery; past events are not replayed
pub async fn reactivate_subscription(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<i64>,
) -> ApiResult<SubscriptionResponse> {
    policy::require(&identity, Action::ManageWebhooks)?;
    let subscription = db::subscriptions::reactivate(&state.pool, id)
        .await
        .map_err(service)?
        .ok_or_else(|| AppError::new(ErrorCode::SubscriptionNotFound))?;
    Ok(ApiResponse::success(subscription.into()))
}
