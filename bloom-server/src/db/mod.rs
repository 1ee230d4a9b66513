//! Database access layer
//!
//! Module per table; plain async functions over `&PgPool` (reads) or
//! `&mut PgConnection` (statements that must join an open transaction).
//! The reservation engine owns transaction boundaries and the per-store
//! advisory lock; nothing in this layer begins a transaction for the
//! admission path.

pub mod bookings;
pub mod refresh_tokens;
pub mod resources;
pub mod stores;
pub mod subscriptions;
pub mod timeslots;
pub mod treatments;
pub mod users;

use sqlx::PgConnection;

pub(crate) type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Generate a Snowflake-style i64 — delegates to shared::util::snowflake_id().
pub(crate) fn snowflake_id() -> i64 {
    shared::util::snowflake_id()
}

/// Take the per-store advisory lock for the rest of the transaction.
///
/// The lock key is the store id. Admission and timeslot regeneration both
/// run under this lock, which serializes writes per store while leaving
/// other stores fully parallel.
pub async fn lock_store(conn: &mut PgConnection, store_id: i64) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT pg_advisory_xact_lock($1)")
        .bind(store_id)
        .execute(conn)
        .await?;
    Ok(())
}
