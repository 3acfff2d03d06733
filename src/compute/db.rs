//! Persistence for completed computations.

use chrono::Utc;
use sqlx::PgPool;

/// Record a finished computation in the `calculations` table.
pub async fn insert_calculation(
    pool: &PgPool,
    username: &str,
    task: &str,
    result: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO calculations (username, task, result, created_at)
        VALUES ($1, $2, $3, $4)
        "#,
    )
    .bind(username)
    .bind(task)
    .bind(result)
    .bind(Utc::now())
    .execute(pool)
    .await?;

    Ok(())
}
