//! Refresh token storage

use sqlx::PgPool;

/// Create a new refresh token, revoking any outstanding tokens for the user
pub async fn create(pool: &PgPool, user_id: i64, ttl_days: i64) -> Result<String, sqlx::Error> {
    let token_id = shared::util::generate_secret();

    sqlx::query("UPDATE refresh_tokens SET revoked = TRUE WHERE user_id = $1 AND NOT revoked")
        .bind(user_id)
        .execute(pool)
        .await?;

    sqlx::query(
        r#"
        INSERT INTO refresh_tokens (id, user_id, expires_at)
        VALUES ($1, $2, NOW() + make_interval(days => $3::int))
        "#,
    )
    .bind(&token_id)
    .bind(user_id)
    .bind(ttl_days as i32)
    .execute(pool)
    .await?;

    Ok(token_id)
}

/// Validate and rotate a refresh token. Returns `(user_id, new_token)`.
pub async fn rotate(
    pool: &PgPool,
    refresh_token: &str,
    ttl_days: i64,
) -> Result<Option<(i64, String)>, sqlx::Error> {
    let row: Option<(i64, bool)> = sqlx::query_as(
        "SELECT user_id, (revoked OR expires_at < NOW()) FROM refresh_tokens WHERE id = $1",
    )
    .bind(refresh_token)
    .fetch_optional(pool)
    .await?;

    let Some((user_id, dead)) = row else {
        return Ok(None);
    };
    if dead {
        return Ok(None);
    }

    // Revoke the used token, then issue a fresh one
    sqlx::query("UPDATE refresh_tokens SET revoked = TRUE WHERE id = $1")
        .bind(refresh_token)
        .execute(pool)
        .await?;

    let new_token = create(pool, user_id, ttl_days).await?;
    Ok(Some((user_id, new_token)))
}
