//! Treatment database operations
//!
//! The required-resources set lives in the `treatment_resources` join
//! table, ordered by `position`; it is replaced wholesale on update.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use shared::models::treatment::{Price, RequiredLevel, Treatment, TreatmentCreate, TreatmentUpdate};
use sqlx::{PgConnection, PgPool};

use super::BoxError;

#[derive(sqlx::FromRow)]
struct TreatmentRow {
    id: i64,
    store_id: i64,
    name: String,
    category: String,
    duration_minutes: i32,
    price_amount: Decimal,
    price_currency: String,
    required_staff_level: String,
    max_concurrent_bookings: i32,
    tags: Vec<String>,
    is_active: bool,
    created_at: DateTime<Utc>,
}

impl TreatmentRow {
    fn into_treatment(self, required_resources: Vec<i64>) -> Result<Treatment, BoxError> {
        let required_staff_level = RequiredLevel::parse(&self.required_staff_level)
            .ok_or_else(|| format!("unknown staff level: {}", self.required_staff_level))?;
        Ok(Treatment {
            id: self.id,
            store_id: self.store_id,
            name: self.name,
            category: self.category,
            duration_minutes: self.duration_minutes,
            price: Price {
                amount: self.price_amount,
                currency: self.price_currency,
            },
            required_staff_level,
            required_resources,
            max_concurrent_bookings: self.max_concurrent_bookings,
            tags: self.tags,
            is_active: self.is_active,
            created_at: self.created_at,
        })
    }
}

const TREATMENT_COLUMNS: &str = "id, store_id, name, category, duration_minutes, price_amount, \
     price_currency, required_staff_level, max_concurrent_bookings, tags, is_active, created_at";

async fn resource_ids(conn: &mut PgConnection, treatment_id: i64) -> Result<Vec<i64>, sqlx::Error> {
    let rows: Vec<(i64,)> = sqlx::query_as(
        "SELECT resource_id FROM treatment_resources WHERE treatment_id = $1 ORDER BY position",
    )
    .bind(treatment_id)
    .fetch_all(conn)
    .await?;
    Ok(rows.into_iter().map(|(id,)| id).collect())
}

async fn replace_resources(
    conn: &mut PgConnection,
    treatment_id: i64,
    resources: &[i64],
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM treatment_resources WHERE treatment_id = $1")
        .bind(treatment_id)
        .execute(&mut *conn)
        .await?;

    if !resources.is_empty() {
        let treatment_ids: Vec<i64> = resources.iter().map(|_| treatment_id).collect();
        let positions: Vec<i32> = (0..resources.len() as i32).collect();
        sqlx::query(
            r#"
            INSERT INTO treatment_resources (treatment_id, resource_id, position)
            SELECT * FROM UNNEST($1::bigint[], $2::bigint[], $3::integer[])
            "#,
        )
        .bind(&treatment_ids)
        .bind(resources)
        .bind(&positions)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

pub async fn create(
    pool: &PgPool,
    store_id: i64,
    data: &TreatmentCreate,
) -> Result<Treatment, BoxError> {
    let id = super::snowflake_id();
    let mut tx = pool.begin().await?;

    let row: TreatmentRow = sqlx::query_as(&format!(
        r#"
        INSERT INTO treatments (
            id, store_id, name, category, duration_minutes, price_amount,
            price_currency, required_staff_level, max_concurrent_bookings,
            tags, is_active
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, TRUE)
        RETURNING {TREATMENT_COLUMNS}
        "#,
    ))
    .bind(id)
    .bind(store_id)
    .bind(&data.name)
    .bind(&data.category)
    .bind(data.duration_minutes)
    .bind(data.price.amount)
    .bind(&data.price.currency)
    .bind(data.required_staff_level.as_str())
    .bind(data.max_concurrent_bookings)
    .bind(&data.tags)
    .fetch_one(&mut *tx)
    .await?;

    replace_resources(&mut tx, id, &data.required_resources).await?;
    tx.commit().await?;

    row.into_treatment(data.required_resources.clone())
}

pub async fn get(pool: &PgPool, treatment_id: i64) -> Result<Option<Treatment>, BoxError> {
    let mut conn = pool.acquire().await?;
    let row: Option<TreatmentRow> = sqlx::query_as(&format!(
        "SELECT {TREATMENT_COLUMNS} FROM treatments WHERE id = $1"
    ))
    .bind(treatment_id)
    .fetch_optional(&mut *conn)
    .await?;

    match row {
        Some(row) => {
            let resources = resource_ids(&mut conn, treatment_id).await?;
            Ok(Some(row.into_treatment(resources)?))
        }
        None => Ok(None),
    }
}

pub async fn list_by_store(pool: &PgPool, store_id: i64) -> Result<Vec<Treatment>, BoxError> {
    let mut conn = pool.acquire().await?;
    let rows: Vec<TreatmentRow> = sqlx::query_as(&format!(
        "SELECT {TREATMENT_COLUMNS} FROM treatments WHERE store_id = $1 ORDER BY category, name"
    ))
    .bind(store_id)
    .fetch_all(&mut *conn)
    .await?;

    let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
    let links: Vec<(i64, i64)> = sqlx::query_as(
        "SELECT treatment_id, resource_id FROM treatment_resources \
         WHERE treatment_id = ANY($1) ORDER BY position",
    )
    .bind(&ids)
    .fetch_all(&mut *conn)
    .await?;

    let mut by_treatment: std::collections::HashMap<i64, Vec<i64>> =
        std::collections::HashMap::new();
    for (treatment_id, resource_id) in links {
        by_treatment.entry(treatment_id).or_default().push(resource_id);
    }

    rows.into_iter()
        .map(|r| {
            let resources = by_treatment.remove(&r.id).unwrap_or_default();
            r.into_treatment(resources)
        })
        .collect()
}

pub async fn update(
    pool: &PgPool,
    treatment_id: i64,
    data: &TreatmentUpdate,
) -> Result<Option<Treatment>, BoxError> {
    let mut tx = pool.begin().await?;

    let row: Option<TreatmentRow> = sqlx::query_as(&format!(
        r#"
        UPDATE treatments SET
            name = COALESCE($1, name),
            category = COALESCE($2, category),
            duration_minutes = COALESCE($3, duration_minutes),
            price_amount = COALESCE($4, price_amount),
            price_currency = COALESCE($5, price_currency),
            required_staff_level = COALESCE($6, required_staff_level),
            max_concurrent_bookings = COALESCE($7, max_concurrent_bookings),
            tags = COALESCE($8, tags),
            updated_at = NOW()
        WHERE id = $9
        RETURNING {TREATMENT_COLUMNS}
        "#,
    ))
    .bind(&data.name)
    .bind(&data.category)
    .bind(data.duration_minutes)
    .bind(data.price.as_ref().map(|p| p.amount))
    .bind(data.price.as_ref().map(|p| p.currency.clone()))
    .bind(data.required_staff_level.map(|l| l.as_str()))
    .bind(data.max_concurrent_bookings)
    .bind(&data.tags)
    .bind(treatment_id)
    .fetch_optional(&mut *tx)
    .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    if let Some(ref resources) = data.required_resources {
        replace_resources(&mut tx, treatment_id, resources).await?;
    }
    let resources = resource_ids(&mut tx, treatment_id).await?;
    tx.commit().await?;

    Ok(Some(row.into_treatment(resources)?))
}

/// Soft-delete: flips `is_active` off. Callers must have verified there
/// are no upcoming bookings first.
pub async fn deactivate(pool: &PgPool, treatment_id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE treatments SET is_active = FALSE, updated_at = NOW() WHERE id = $1",
    )
    .bind(treatment_id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}
