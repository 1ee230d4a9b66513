//! Store database operations

use chrono::{DateTime, Utc};
use serde_json::Value;
use shared::models::store::{OperatingHours, Store, StoreCreate, StoreSettings, StoreUpdate, merge_settings};
use sqlx::PgPool;

use super::BoxError;

#[derive(sqlx::FromRow)]
struct StoreRow {
    id: i64,
    name: String,
    timezone: String,
    operating_hours: Value,
    settings: Value,
    is_active: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<StoreRow> for Store {
    type Error = BoxError;

    fn try_from(row: StoreRow) -> Result<Self, Self::Error> {
        let operating_hours: OperatingHours = serde_json::from_value(row.operating_hours)?;
        let settings: StoreSettings = serde_json::from_value(row.settings)?;
        Ok(Store {
            id: row.id,
            name: row.name,
            timezone: row.timezone,
            operating_hours,
            settings,
            is_active: row.is_active,
            created_at: row.created_at,
        })
    }
}

const STORE_COLUMNS: &str = "id, name, timezone, operating_hours, settings, is_active, created_at";

pub async fn create(pool: &PgPool, data: &StoreCreate) -> Result<Store, BoxError> {
    let id = super::snowflake_id();
    let hours = serde_json::to_value(&data.operating_hours)?;
    let settings = data.settings.clone().unwrap_or_else(|| Value::Object(Default::default()));
    // Round-trips through StoreSettings so malformed blobs are rejected here
    let _: StoreSettings = serde_json::from_value(settings.clone())?;

    let row: StoreRow = sqlx::query_as(&format!(
        r#"
        INSERT INTO stores (id, name, timezone, operating_hours, settings, is_active)
        VALUES ($1, $2, $3, $4, $5, TRUE)
        RETURNING {STORE_COLUMNS}
        "#,
    ))
    .bind(id)
    .bind(&data.name)
    .bind(&data.timezone)
    .bind(&hours)
    .bind(&settings)
    .fetch_one(pool)
    .await?;

    row.try_into()
}

pub async fn get(pool: &PgPool, store_id: i64) -> Result<Option<Store>, BoxError> {
    let row: Option<StoreRow> =
        sqlx::query_as(&format!("SELECT {STORE_COLUMNS} FROM stores WHERE id = $1"))
            .bind(store_id)
            .fetch_optional(pool)
            .await?;

    row.map(Store::try_from).transpose()
}

pub async fn update(pool: &PgPool, store_id: i64, data: &StoreUpdate) -> Result<Option<Store>, BoxError> {
    let hours = data
        .operating_hours
        .as_ref()
        .map(serde_json::to_value)
        .transpose()?;

    let row: Option<StoreRow> = sqlx::query_as(&format!(
        r#"
        UPDATE stores SET
            name = COALESCE($1, name),
            timezone = COALESCE($2, timezone),
            operating_hours = COALESCE($3, operating_hours),
            is_active = COALESCE($4, is_active),
            updated_at = NOW()
        WHERE id = $5
        RETURNING {STORE_COLUMNS}
        "#,
    ))
    .bind(&data.name)
    .bind(&data.timezone)
    .bind(&hours)
    .bind(data.is_active)
    .bind(store_id)
    .fetch_optional(pool)
    .await?;

    row.map(Store::try_from).transpose()
}

/// Shallow-merge a settings patch (read-modify-write under row lock)
pub async fn update_settings(
    pool: &PgPool,
    store_id: i64,
    patch: &Value,
) -> Result<Option<Store>, BoxError> {
    let mut tx = pool.begin().await?;

    let current: Option<(Value,)> =
        sqlx::query_as("SELECT settings FROM stores WHERE id = $1 FOR UPDATE")
            .bind(store_id)
            .fetch_optional(&mut *tx)
            .await?;

    let Some((current,)) = current else {
        return Ok(None);
    };

    let merged = merge_settings(&current, patch);
    // Reject patches that break the typed settings shape
    let _: StoreSettings = serde_json::from_value(merged.clone())?;

    let row: StoreRow = sqlx::query_as(&format!(
        "UPDATE stores SET settings = $1, updated_at = NOW() WHERE id = $2 RETURNING {STORE_COLUMNS}"
    ))
    .bind(&merged)
    .bind(store_id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(Some(row.try_into()?))
}
