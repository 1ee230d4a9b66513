//! Webhook subscription database operations
//!
//! Health columns (`retry_count`, `last_*`) are written only by the
//! dispatcher worker; management endpoints touch the rest.

use chrono::{DateTime, Utc};
use shared::models::subscription::{SubscriptionCreate, SubscriptionUpdate, WebhookSubscription};
use sqlx::PgPool;

#[derive(sqlx::FromRow)]
struct SubscriptionRow {
    id: i64,
    url: String,
    events: Vec<String>,
    secret: String,
    is_active: bool,
    retry_count: i32,
    max_retries: i32,
    last_success_at: Option<DateTime<Utc>>,
    last_failure_at: Option<DateTime<Utc>>,
    last_failure_reason: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<SubscriptionRow> for WebhookSubscription {
    fn from(row: SubscriptionRow) -> Self {
        WebhookSubscription {
            id: row.id,
            url: row.url,
            events: row.events,
            secret: row.secret,
            is_active: row.is_active,
            retry_count: row.retry_count,
            max_retries: row.max_retries,
            last_success_at: row.last_success_at,
            last_failure_at: row.last_failure_at,
            last_failure_reason: row.last_failure_reason,
            created_at: row.created_at,
        }
    }
}

const SUB_COLUMNS: &str = "id, url, events, secret, is_active, retry_count, max_retries, \
     last_success_at, last_failure_at, last_failure_reason, created_at";

pub async fn create(
    pool: &PgPool,
    data: &SubscriptionCreate,
    secret: &str,
) -> Result<WebhookSubscription, sqlx::Error> {
    let row: SubscriptionRow = sqlx::query_as(&format!(
        r#"
        INSERT INTO webhook_subscriptions (id, url, events, secret, is_active, retry_count, max_retries)
        VALUES ($1, $2, $3, $4, TRUE, 0, $5)
        RETURNING {SUB_COLUMNS}
        "#,
    ))
    .bind(super::snowflake_id())
    .bind(&data.url)
    .bind(&data.events)
    .bind(secret)
    .bind(data.max_retries)
    .fetch_one(pool)
    .await?;
    Ok(row.into())
}

pub async fn get(pool: &PgPool, id: i64) -> Result<Option<WebhookSubscription>, sqlx::Error> {
    let row: Option<SubscriptionRow> = sqlx::query_as(&format!(
        "SELECT {SUB_COLUMNS} FROM webhook_subscriptions WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(Into::into))
}

pub async fn list(pool: &PgPool) -> Result<Vec<WebhookSubscription>, sqlx::Error> {
    let rows: Vec<SubscriptionRow> = sqlx::query_as(&format!(
        "SELECT {SUB_COLUMNS} FROM webhook_subscriptions ORDER BY created_at"
    ))
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(Into::into).collect())
}

/// Active subscriptions listening for an event name
pub async fn list_active_for_event(
    pool: &PgPool,
    event: &str,
) -> Result<Vec<WebhookSubscription>, sqlx::Error> {
    let rows: Vec<SubscriptionRow> = sqlx::query_as(&format!(
        "SELECT {SUB_COLUMNS} FROM webhook_subscriptions WHERE is_active AND $1 = ANY(events)"
    ))
    .bind(event)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(Into::into).collect())
}

pub async fn update(
    pool: &PgPool,
    id: i64,
    data: &SubscriptionUpdate,
) -> Result<Option<WebhookSubscription>, sqlx::Error> {
    let row: Option<SubscriptionRow> = sqlx::query_as(&format!(
        r#"
        UPDATE webhook_subscriptions SET
            url = COALESCE($1, url),
            events = COALESCE($2, events),
            max_retries = COALESCE($3, max_retries),
            is_active = COALESCE($4, is_active)
        WHERE id = $5
        RETURNING {SUB_COLUMNS}
        "#,
    ))
    .bind(&data.url)
    .bind(&data.events)
    .bind(data.max_retries)
    .bind(data.is_active)
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(Into::into))
}

pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM webhook_subscriptions WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Re-enable a disabled subscription and reset its retry counter.
/// Past payloads are not journaled, so nothing is redelivered.
pub async fn reactivate(pool: &PgPool, id: i64) -> Result<Option<WebhookSubscription>, sqlx::Error> {
    let row: Option<SubscriptionRow> = sqlx::query_as(&format!(
        r#"
        UPDATE webhook_subscriptions SET
            is_active = TRUE,
            retry_count = 0,
            last_failure_reason = NULL
        WHERE id = $1
        RETURNING {SUB_COLUMNS}
        "#,
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(Into::into))
}

// ── Dispatcher-owned health updates ──

pub async fn record_success(pool: &PgPool, id: i64) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE webhook_subscriptions SET
            last_success_at = NOW(),
            retry_count = 0,
            last_failure_reason = NULL
        WHERE id = $1
        "#,
    )
    .bind(id)
    .execute(pool)
    .await?;
    Ok(())
}

/// Record a delivery failure; deactivates the subscription when the retry
/// budget is exhausted. Returns `(retry_count, is_active)` after the update.
pub async fn record_failure(
    pool: &PgPool,
    id: i64,
    reason: &str,
) -> Result<(i32, bool), sqlx::Error> {
    let (retry_count, is_active): (i32, bool) = sqlx::query_as(
        r#"
        UPDATE webhook_subscriptions SET
            retry_count = retry_count + 1,
            last_failure_at = NOW(),
            last_failure_reason = $2,
            is_active = CASE WHEN retry_count + 1 >= max_retries THEN FALSE ELSE is_active END
        WHERE id = $1
        RETURNING retry_count, is_active
        "#,
    )
    .bind(id)
    .bind(reason)
    .fetch_one(pool)
    .await?;
    Ok((retry_count, is_active))
}
