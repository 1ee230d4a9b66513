//! Booking database operations
//!
//! The overlap-count queries implement the quota checks of the admission
//! algorithm; every one of them runs on the connection holding the store
//! advisory lock. Overlap is half-open: `[a,b)` meets `[c,d)` iff
//! `a < d AND c < b`; touching intervals do not overlap.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use shared::models::booking::{Booking, BookingStatus};
use shared::models::treatment::Price;
use sqlx::{PgConnection, PgPool};

use super::BoxError;

#[derive(sqlx::FromRow)]
struct BookingRow {
    id: i64,
    customer_id: i64,
    store_id: i64,
    treatment_id: i64,
    staff_id: Option<i64>,
    booking_date_time: DateTime<Utc>,
    duration_minutes: i32,
    status: String,
    price_amount: Decimal,
    price_currency: String,
    notes: Option<String>,
    cancellation_reason: Option<String>,
    cancelled_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
    reminder_sent: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<BookingRow> for Booking {
    type Error = BoxError;

    fn try_from(row: BookingRow) -> Result<Self, Self::Error> {
        let status = BookingStatus::parse(&row.status)
            .ok_or_else(|| format!("unknown booking status: {}", row.status))?;
        Ok(Booking {
            id: row.id,
            customer_id: row.customer_id,
            store_id: row.store_id,
            treatment_id: row.treatment_id,
            staff_id: row.staff_id,
            booking_date_time: row.booking_date_time,
            duration_minutes: row.duration_minutes,
            status,
            price: Price {
                amount: row.price_amount,
                currency: row.price_currency,
            },
            notes: row.notes,
            cancellation_reason: row.cancellation_reason,
            cancelled_at: row.cancelled_at,
            completed_at: row.completed_at,
            reminder_sent: row.reminder_sent,
            created_at: row.created_at,
        })
    }
}

const BOOKING_COLUMNS: &str = "id, customer_id, store_id, treatment_id, staff_id, \
     booking_date_time, duration_minutes, status, price_amount, price_currency, notes, \
     cancellation_reason, cancelled_at, completed_at, reminder_sent, created_at";

/// Statuses excluded from every quota count
const TERMINAL_FILTER: &str = "status NOT IN ('cancelled', 'no_show')";

pub async fn insert(conn: &mut PgConnection, booking: &Booking) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO bookings (
            id, customer_id, store_id, treatment_id, staff_id, booking_date_time,
            duration_minutes, status, price_amount, price_currency, notes, reminder_sent
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, FALSE)
        "#,
    )
    .bind(booking.id)
    .bind(booking.customer_id)
    .bind(booking.store_id)
    .bind(booking.treatment_id)
    .bind(booking.staff_id)
    .bind(booking.booking_date_time)
    .bind(booking.duration_minutes)
    .bind(booking.status.as_str())
    .bind(booking.price.amount)
    .bind(&booking.price.currency)
    .bind(&booking.notes)
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn get(pool: &PgPool, booking_id: i64) -> Result<Option<Booking>, BoxError> {
    let row: Option<BookingRow> =
        sqlx::query_as(&format!("SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = $1"))
            .bind(booking_id)
            .fetch_optional(pool)
            .await?;
    row.map(Booking::try_from).transpose()
}

// ── Quota counts ──

/// Non-terminal bookings of a treatment overlapping `[start, end)`
pub async fn count_overlapping_for_treatment(
    conn: &mut PgConnection,
    treatment_id: i64,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    exclude: Option<i64>,
) -> Result<i64, sqlx::Error> {
    let (count,): (i64,) = sqlx::query_as(&format!(
        r#"
        SELECT COUNT(*) FROM bookings
        WHERE treatment_id = $1 AND {TERMINAL_FILTER}
          AND booking_date_time < $3
          AND booking_date_time + make_interval(mins => duration_minutes) > $2
          AND ($4::bigint IS NULL OR id <> $4)
        "#,
    ))
    .bind(treatment_id)
    .bind(start)
    .bind(end)
    .bind(exclude)
    .fetch_one(conn)
    .await?;
    Ok(count)
}

/// Non-terminal bookings of a staff member overlapping `[start, end)`
pub async fn count_overlapping_for_staff(
    conn: &mut PgConnection,
    staff_id: i64,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    exclude: Option<i64>,
) -> Result<i64, sqlx::Error> {
    let (count,): (i64,) = sqlx::query_as(&format!(
        r#"
        SELECT COUNT(*) FROM bookings
        WHERE staff_id = $1 AND {TERMINAL_FILTER}
          AND booking_date_time < $3
          AND booking_date_time + make_interval(mins => duration_minutes) > $2
          AND ($4::bigint IS NULL OR id <> $4)
        "#,
    ))
    .bind(staff_id)
    .bind(start)
    .bind(end)
    .bind(exclude)
    .fetch_one(conn)
    .await?;
    Ok(count)
}

/// Non-terminal bookings whose treatment requires `resource_id`,
/// overlapping `[start, end)`
pub async fn count_overlapping_for_resource(
    conn: &mut PgConnection,
    resource_id: i64,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    exclude: Option<i64>,
) -> Result<i64, sqlx::Error> {
    let (count,): (i64,) = sqlx::query_as(&format!(
        r#"
        SELECT COUNT(*) FROM bookings b
        JOIN treatment_resources tr ON tr.treatment_id = b.treatment_id
        WHERE tr.resource_id = $1 AND b.{TERMINAL_FILTER}
          AND b.booking_date_time < $3
          AND b.booking_date_time + make_interval(mins => b.duration_minutes) > $2
          AND ($4::bigint IS NULL OR b.id <> $4)
        "#,
    ))
    .bind(resource_id)
    .bind(start)
    .bind(end)
    .bind(exclude)
    .fetch_one(conn)
    .await?;
    Ok(count)
}

/// Non-terminal bookings of a store on the local day `[day_start, day_end)`
pub async fn count_for_store_day(
    conn: &mut PgConnection,
    store_id: i64,
    day_start: DateTime<Utc>,
    day_end: DateTime<Utc>,
    exclude: Option<i64>,
) -> Result<i64, sqlx::Error> {
    let (count,): (i64,) = sqlx::query_as(&format!(
        r#"
        SELECT COUNT(*) FROM bookings
        WHERE store_id = $1 AND {TERMINAL_FILTER}
          AND booking_date_time >= $2 AND booking_date_time < $3
          AND ($4::bigint IS NULL OR id <> $4)
        "#,
    ))
    .bind(store_id)
    .bind(day_start)
    .bind(day_end)
    .bind(exclude)
    .fetch_one(conn)
    .await?;
    Ok(count)
}

/// Non-terminal bookings of a store overlapping `[start, end)`
pub async fn count_overlapping_for_store(
    conn: &mut PgConnection,
    store_id: i64,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    exclude: Option<i64>,
) -> Result<i64, sqlx::Error> {
    let (count,): (i64,) = sqlx::query_as(&format!(
        r#"
        SELECT COUNT(*) FROM bookings
        WHERE store_id = $1 AND {TERMINAL_FILTER}
          AND booking_date_time < $3
          AND booking_date_time + make_interval(mins => duration_minutes) > $2
          AND ($4::bigint IS NULL OR id <> $4)
        "#,
    ))
    .bind(store_id)
    .bind(start)
    .bind(end)
    .bind(exclude)
    .fetch_one(conn)
    .await?;
    Ok(count)
}

/// Whether any upcoming pending/confirmed booking references the treatment
pub async fn treatment_has_upcoming(
    pool: &PgPool,
    treatment_id: i64,
) -> Result<bool, sqlx::Error> {
    let (count,): (i64,) = sqlx::query_as(
        r#"
        SELECT COUNT(*) FROM bookings
        WHERE treatment_id = $1 AND status IN ('pending', 'confirmed')
          AND booking_date_time >= NOW()
        "#,
    )
    .bind(treatment_id)
    .fetch_one(pool)
    .await?;
    Ok(count > 0)
}

// ── Mutations ──

/// Apply a reschedule/staff/notes modification
pub async fn apply_update(
    conn: &mut PgConnection,
    booking_id: i64,
    start: DateTime<Utc>,
    staff_id: Option<i64>,
    notes: &Option<String>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE bookings SET
            booking_date_time = $1,
            staff_id = $2,
            notes = COALESCE($3, notes),
            updated_at = NOW()
        WHERE id = $4
        "#,
    )
    .bind(start)
    .bind(staff_id)
    .bind(notes)
    .bind(booking_id)
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn mark_cancelled(
    conn: &mut PgConnection,
    booking_id: i64,
    reason: &Option<String>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE bookings SET
            status = 'cancelled',
            cancellation_reason = $1,
            cancelled_at = NOW(),
            updated_at = NOW()
        WHERE id = $2
        "#,
    )
    .bind(reason)
    .bind(booking_id)
    .execute(conn)
    .await?;
    Ok(())
}

/// Record a non-cancel status transition; stamps `completed_at` when
/// moving to `completed`
pub async fn mark_status(
    conn: &mut PgConnection,
    booking_id: i64,
    status: BookingStatus,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE bookings SET
            status = $1,
            completed_at = CASE WHEN $1 = 'completed' THEN NOW() ELSE completed_at END,
            updated_at = NOW()
        WHERE id = $2
        "#,
    )
    .bind(status.as_str())
    .bind(booking_id)
    .execute(conn)
    .await?;
    Ok(())
}

// ── Listings ──

/// Filterable, paginated booking listing
#[derive(Debug, Default, Clone)]
pub struct BookingFilter {
    pub store_id: Option<i64>,
    pub customer_id: Option<i64>,
    pub staff_id: Option<i64>,
    pub status: Option<BookingStatus>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

pub async fn list(
    pool: &PgPool,
    filter: &BookingFilter,
    page: i64,
    page_size: i64,
) -> Result<(Vec<Booking>, i64), BoxError> {
    const FILTER_SQL: &str = r#"
        ($1::bigint IS NULL OR store_id = $1)
        AND ($2::bigint IS NULL OR customer_id = $2)
        AND ($3::bigint IS NULL OR staff_id = $3)
        AND ($4::text IS NULL OR status = $4)
        AND ($5::timestamptz IS NULL OR booking_date_time >= $5)
        AND ($6::timestamptz IS NULL OR booking_date_time < $6)
    "#;

    let (total,): (i64,) =
        sqlx::query_as(&format!("SELECT COUNT(*) FROM bookings WHERE {FILTER_SQL}"))
            .bind(filter.store_id)
            .bind(filter.customer_id)
            .bind(filter.staff_id)
            .bind(filter.status.map(|s| s.as_str()))
            .bind(filter.from)
            .bind(filter.to)
            .fetch_one(pool)
            .await?;

    let rows: Vec<BookingRow> = sqlx::query_as(&format!(
        r#"
        SELECT {BOOKING_COLUMNS} FROM bookings
        WHERE {FILTER_SQL}
        ORDER BY booking_date_time
        LIMIT $7 OFFSET $8
        "#,
    ))
    .bind(filter.store_id)
    .bind(filter.customer_id)
    .bind(filter.staff_id)
    .bind(filter.status.map(|s| s.as_str()))
    .bind(filter.from)
    .bind(filter.to)
    .bind(page_size)
    .bind((page - 1) * page_size)
    .fetch_all(pool)
    .await?;

    let bookings = rows
        .into_iter()
        .map(Booking::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    Ok((bookings, total))
}
