//! Timeslot database operations
//!
//! Counter columns are written only from inside the admission /
//! regeneration transactions, which hold the store advisory lock.

use chrono::{DateTime, Utc};
use shared::models::timeslot::Timeslot;
use sqlx::{PgConnection, PgPool};

#[derive(sqlx::FromRow)]
struct TimeslotRow {
    id: i64,
    store_id: i64,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    max_capacity: i32,
    current_bookings: i32,
    is_active: bool,
    treatment_ids: Vec<i64>,
    staff_ids: Vec<i64>,
}

impl From<TimeslotRow> for Timeslot {
    fn from(row: TimeslotRow) -> Self {
        Timeslot {
            id: row.id,
            store_id: row.store_id,
            start_time: row.start_time,
            end_time: row.end_time,
            max_capacity: row.max_capacity,
            current_bookings: row.current_bookings,
            is_active: row.is_active,
            treatment_ids: row.treatment_ids,
            staff_ids: row.staff_ids,
        }
    }
}

const SLOT_COLUMNS: &str = "id, store_id, start_time, end_time, max_capacity, current_bookings, \
     is_active, treatment_ids, staff_ids";

/// Bookings recorded against any slot of the store in `[from, to)`.
/// Regeneration must abort when this is non-zero.
pub async fn count_booked_in_range(
    conn: &mut PgConnection,
    store_id: i64,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> Result<i64, sqlx::Error> {
    let (count,): (i64,) = sqlx::query_as(
        r#"
        SELECT COUNT(*) FROM timeslots
        WHERE store_id = $1 AND start_time >= $2 AND start_time < $3
          AND current_bookings > 0
        "#,
    )
    .bind(store_id)
    .bind(from)
    .bind(to)
    .fetch_one(conn)
    .await?;
    Ok(count)
}

pub async fn delete_range(
    conn: &mut PgConnection,
    store_id: i64,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> Result<u64, sqlx::Error> {
    let result =
        sqlx::query("DELETE FROM timeslots WHERE store_id = $1 AND start_time >= $2 AND start_time < $3")
            .bind(store_id)
            .bind(from)
            .bind(to)
            .execute(conn)
            .await?;
    Ok(result.rows_affected())
}

/// Bulk-insert freshly generated slots (empty whitelists, zero counters)
pub async fn bulk_insert(
    conn: &mut PgConnection,
    store_id: i64,
    slots: &[(i64, DateTime<Utc>, DateTime<Utc>)],
    max_capacity: i32,
) -> Result<(), sqlx::Error> {
    if slots.is_empty() {
        return Ok(());
    }
    let ids: Vec<i64> = slots.iter().map(|s| s.0).collect();
    let store_ids: Vec<i64> = slots.iter().map(|_| store_id).collect();
    let starts: Vec<DateTime<Utc>> = slots.iter().map(|s| s.1).collect();
    let ends: Vec<DateTime<Utc>> = slots.iter().map(|s| s.2).collect();
    let capacities: Vec<i32> = slots.iter().map(|_| max_capacity).collect();

    sqlx::query(
        r#"
        INSERT INTO timeslots (id, store_id, start_time, end_time, max_capacity,
                               current_bookings, is_active)
        SELECT id, store_id, start_time, end_time, max_capacity, 0, TRUE
        FROM UNNEST($1::bigint[], $2::bigint[], $3::timestamptz[], $4::timestamptz[], $5::integer[])
            AS t(id, store_id, start_time, end_time, max_capacity)
        "#,
    )
    .bind(&ids)
    .bind(&store_ids)
    .bind(&starts)
    .bind(&ends)
    .bind(&capacities)
    .execute(conn)
    .await?;
    Ok(())
}

/// The admission gate: earliest active slot containing `[start, end)` with
/// spare capacity whose whitelists admit the treatment (and staff, when
/// one is requested).
pub async fn find_covering(
    conn: &mut PgConnection,
    store_id: i64,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    treatment_id: i64,
    staff_id: Option<i64>,
) -> Result<Option<Timeslot>, sqlx::Error> {
    let row: Option<TimeslotRow> = sqlx::query_as(&format!(
        r#"
        SELECT {SLOT_COLUMNS} FROM timeslots
        WHERE store_id = $1 AND is_active
          AND start_time <= $2 AND end_time >= $3
          AND current_bookings < max_capacity
          AND (cardinality(treatment_ids) = 0 OR $4 = ANY(treatment_ids))
          AND (cardinality(staff_ids) = 0 OR $5::bigint IS NULL OR $5 = ANY(staff_ids))
        ORDER BY start_time
        LIMIT 1
        "#,
    ))
    .bind(store_id)
    .bind(start)
    .bind(end)
    .bind(treatment_id)
    .bind(staff_id)
    .fetch_optional(conn)
    .await?;
    Ok(row.map(Into::into))
}

/// The slot that covers an existing booking, capacity ignored.
/// Used to locate the counter to release on cancel/reschedule.
pub async fn find_covering_any(
    conn: &mut PgConnection,
    store_id: i64,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<Option<Timeslot>, sqlx::Error> {
    let row: Option<TimeslotRow> = sqlx::query_as(&format!(
        r#"
        SELECT {SLOT_COLUMNS} FROM timeslots
        WHERE store_id = $1 AND is_active AND start_time <= $2 AND end_time >= $3
        ORDER BY start_time
        LIMIT 1
        "#,
    ))
    .bind(store_id)
    .bind(start)
    .bind(end)
    .fetch_optional(conn)
    .await?;
    Ok(row.map(Into::into))
}

/// Increment the booking counter; refuses to exceed capacity.
/// Returns false when the slot was already full.
pub async fn increment(conn: &mut PgConnection, slot_id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE timeslots SET current_bookings = current_bookings + 1
        WHERE id = $1 AND current_bookings < max_capacity
        "#,
    )
    .bind(slot_id)
    .execute(conn)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Decrement the booking counter, clamped at zero
pub async fn decrement(conn: &mut PgConnection, slot_id: i64) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE timeslots SET current_bookings = GREATEST(current_bookings - 1, 0) WHERE id = $1",
    )
    .bind(slot_id)
    .execute(conn)
    .await?;
    Ok(())
}

/// Active slots of a store in `[from, to)`, ordered by start
pub async fn list_for_range(
    pool: &PgPool,
    store_id: i64,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> Result<Vec<Timeslot>, sqlx::Error> {
    let rows: Vec<TimeslotRow> = sqlx::query_as(&format!(
        r#"
        SELECT {SLOT_COLUMNS} FROM timeslots
        WHERE store_id = $1 AND is_active AND start_time >= $2 AND start_time < $3
        ORDER BY start_time
        "#,
    ))
    .bind(store_id)
    .bind(from)
    .bind(to)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(Into::into).collect())
}

/// As [`list_for_range`] but only slots with spare capacity, optionally
/// filtered to those admitting a treatment
pub async fn list_available_for_range(
    pool: &PgPool,
    store_id: i64,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
    treatment_id: Option<i64>,
) -> Result<Vec<Timeslot>, sqlx::Error> {
    let rows: Vec<TimeslotRow> = sqlx::query_as(&format!(
        r#"
        SELECT {SLOT_COLUMNS} FROM timeslots
        WHERE store_id = $1 AND is_active
          AND start_time >= $2 AND start_time < $3
          AND current_bookings < max_capacity
          AND ($4::bigint IS NULL OR cardinality(treatment_ids) = 0 OR $4 = ANY(treatment_ids))
        ORDER BY start_time
        "#,
    ))
    .bind(store_id)
    .bind(from)
    .bind(to)
    .bind(treatment_id)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(Into::into).collect())
}
