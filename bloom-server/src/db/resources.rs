//! Resource database operations

use chrono::{DateTime, Utc};
use shared::models::resource::{Resource, ResourceCreate, ResourceType, ResourceUpdate};
use sqlx::{PgConnection, PgPool};

use super::BoxError;

#[derive(sqlx::FromRow)]
struct ResourceRow {
    id: i64,
    store_id: i64,
    name: String,
    resource_type: String,
    capacity: i32,
    is_active: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<ResourceRow> for Resource {
    type Error = BoxError;

    fn try_from(row: ResourceRow) -> Result<Self, Self::Error> {
        let resource_type = ResourceType::parse(&row.resource_type)
            .ok_or_else(|| format!("unknown resource type: {}", row.resource_type))?;
        Ok(Resource {
            id: row.id,
            store_id: row.store_id,
            name: row.name,
            resource_type,
            capacity: row.capacity,
            is_active: row.is_active,
            created_at: row.created_at,
        })
    }
}

const RESOURCE_COLUMNS: &str = "id, store_id, name, resource_type, capacity, is_active, created_at";

pub async fn create(
    pool: &PgPool,
    store_id: i64,
    data: &ResourceCreate,
) -> Result<Resource, BoxError> {
    let row: ResourceRow = sqlx::query_as(&format!(
        r#"
        INSERT INTO resources (id, store_id, name, resource_type, capacity, is_active)
        VALUES ($1, $2, $3, $4, $5, TRUE)
        RETURNING {RESOURCE_COLUMNS}
        "#,
    ))
    .bind(super::snowflake_id())
    .bind(store_id)
    .bind(&data.name)
    .bind(data.resource_type.as_str())
    .bind(data.capacity)
    .fetch_one(pool)
    .await?;

    row.try_into()
}

pub async fn get(pool: &PgPool, resource_id: i64) -> Result<Option<Resource>, BoxError> {
    let row: Option<ResourceRow> = sqlx::query_as(&format!(
        "SELECT {RESOURCE_COLUMNS} FROM resources WHERE id = $1"
    ))
    .bind(resource_id)
    .fetch_optional(pool)
    .await?;
    row.map(Resource::try_from).transpose()
}

pub async fn list_by_store(pool: &PgPool, store_id: i64) -> Result<Vec<Resource>, BoxError> {
    let rows: Vec<ResourceRow> = sqlx::query_as(&format!(
        "SELECT {RESOURCE_COLUMNS} FROM resources WHERE store_id = $1 ORDER BY name"
    ))
    .bind(store_id)
    .fetch_all(pool)
    .await?;
    rows.into_iter().map(Resource::try_from).collect()
}

/// Load several resources at once, admission-check order
pub async fn get_many(conn: &mut PgConnection, ids: &[i64]) -> Result<Vec<Resource>, BoxError> {
    let rows: Vec<ResourceRow> = sqlx::query_as(&format!(
        "SELECT {RESOURCE_COLUMNS} FROM resources WHERE id = ANY($1)"
    ))
    .bind(ids)
    .fetch_all(conn)
    .await?;

    let mut by_id: std::collections::HashMap<i64, Resource> = rows
        .into_iter()
        .map(|r| Resource::try_from(r).map(|res| (res.id, res)))
        .collect::<Result<_, _>>()?;

    // Preserve the caller's ordering
    Ok(ids.iter().filter_map(|id| by_id.remove(id)).collect())
}

pub async fn update(
    pool: &PgPool,
    resource_id: i64,
    data: &ResourceUpdate,
) -> Result<Option<Resource>, BoxError> {
    let row: Option<ResourceRow> = sqlx::query_as(&format!(
        r#"
        UPDATE resources SET
            name = COALESCE($1, name),
            capacity = COALESCE($2, capacity),
            is_active = COALESCE($3, is_active),
            updated_at = NOW()
        WHERE id = $4
        RETURNING {RESOURCE_COLUMNS}
        "#,
    ))
    .bind(&data.name)
    .bind(data.capacity)
    .bind(data.is_active)
    .bind(resource_id)
    .fetch_optional(pool)
    .await?;

    row.map(Resource::try_from).transpose()
}
