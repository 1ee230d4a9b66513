//! User queries — lookups for authentication and staff eligibility

use chrono::{DateTime, Utc};
use shared::models::user::{Role, SkillLevel, User};
use sqlx::PgPool;

use super::BoxError;

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    email: String,
    name: String,
    role: String,
    store_id: Option<i64>,
    skill_level: Option<String>,
    is_active: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = BoxError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role = Role::parse(&row.role).ok_or_else(|| format!("unknown role: {}", row.role))?;
        let skill_level = row
            .skill_level
            .as_deref()
            .map(|s| SkillLevel::parse(s).ok_or_else(|| format!("unknown skill level: {s}")))
            .transpose()?;
        Ok(User {
            id: row.id,
            email: row.email,
            name: row.name,
            role,
            store_id: row.store_id,
            skill_level,
            is_active: row.is_active,
            created_at: row.created_at,
        })
    }
}

const USER_COLUMNS: &str = "id, email, name, role, store_id, skill_level, is_active, created_at";

pub async fn get(pool: &PgPool, user_id: i64) -> Result<Option<User>, BoxError> {
    let row: Option<UserRow> =
        sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(user_id)
            .fetch_optional(pool)
            .await?;
    row.map(User::try_from).transpose()
}

/// Fetch a user together with their password hash, for login
pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<(User, String)>, BoxError> {
    #[derive(sqlx::FromRow)]
    struct WithHash {
        #[sqlx(flatten)]
        user: UserRow,
        password_hash: String,
    }

    let row: Option<WithHash> = sqlx::query_as(&format!(
        "SELECT {USER_COLUMNS}, password_hash FROM users WHERE email = $1"
    ))
    .bind(email)
    .fetch_optional(pool)
    .await?;

    row.map(|r| Ok((r.user.try_into()?, r.password_hash)))
        .transpose()
}

/// Stored password hash for a user, for credential checks
pub async fn password_hash(pool: &PgPool, user_id: i64) -> Result<Option<String>, sqlx::Error> {
    sqlx::query_scalar("SELECT password_hash FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

pub async fn update_password(
    pool: &PgPool,
    user_id: i64,
    password_hash: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE users SET password_hash = $1 WHERE id = $2")
        .bind(password_hash)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Active staff and store admins of a store, for eligibility listings
pub async fn list_staff_for_store(pool: &PgPool, store_id: i64) -> Result<Vec<User>, BoxError> {
    let rows: Vec<UserRow> = sqlx::query_as(&format!(
        r#"
        SELECT {USER_COLUMNS} FROM users
        WHERE store_id = $1 AND is_active AND role IN ('staff', 'store_admin')
        ORDER BY name
        "#
    ))
    .bind(store_id)
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(User::try_from).collect()
}
