/**
 * Refresh Token Storage
 *
 * Refresh tokens are persisted so they can be revoked and rotated. A
 * refresh token is single-use: exchanging it deletes the row and issues
 * a new pair, so a replayed token is always rejected.
 */
use chrono::{DateTime, Utc};
use sqlx::PgPool;

/// Persist a freshly issued refresh token.
pub async fn store_refresh_token(
    pool: &PgPool,
    token: &str,
    username: &str,
    expires_at: DateTime<Utc>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO refresh_tokens (token, username, expires_at)
        VALUES ($1, $2, $3)
        "#,
    )
    .bind(token)
    .bind(username)
    .bind(expires_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Consume a refresh token, deleting its row.
///
/// Returns the owning username when the token existed and had not
/// expired; `None` means the token is unknown, already used, or stale.
pub async fn consume_refresh_token(
    pool: &PgPool,
    token: &str,
) -> Result<Option<String>, sqlx::Error> {
    let row: Option<(String,)> = sqlx::query_as(
        r#"
        DELETE FROM refresh_tokens
        WHERE token = $1 AND expires_at > now()
        RETURNING username
        "#,
    )
    .bind(token)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|(username,)| username))
}

/// Delete expired refresh tokens.
///
/// Called periodically from a background task; expired rows are already
/// unusable, this just keeps the table small.
pub async fn purge_expired_tokens(pool: &PgPool) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM refresh_tokens WHERE expires_at <= now()")
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}
