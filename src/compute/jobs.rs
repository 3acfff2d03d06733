/**
 * Background Computation Jobs
 *
 * The toy computations (factorial, inclusive range sum) run as spawned
 * tasks after the HTTP handler has already answered 202. Each job:
 *
 * 1. Computes its result with overflow checking
 * 2. Persists a `calculations` row (under the retry helper)
 * 3. Broadcasts a completion notification to WebSocket subscribers
 *
 * Jobs are in-process only: they die with the server and are never
 * re-queued. A job that exhausts its retries logs the failure.
 */
use sqlx::PgPool;
use thiserror::Error;

use crate::compute::db::insert_calculation;
use crate::compute::retry::{retry, DEFAULT_ATTEMPTS, DEFAULT_DELAY};
use crate::realtime::broadcast::Broadcaster;

/// Largest `n` whose factorial fits in the BIGINT result column.
pub const MAX_FACTORIAL_INPUT: i64 = 20;

#[derive(Debug, Error)]
pub enum JobError {
    #[error("result does not fit in a 64-bit integer")]
    Overflow,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// `n!` with overflow checking.
pub fn factorial(n: i64) -> Option<i64> {
    if n < 0 {
        return None;
    }
    (1..=n).try_fold(1i64, |acc, i| acc.checked_mul(i))
}

/// Inclusive sum of `start..=end` with overflow checking.
pub fn sum_range(start: i64, end: i64) -> Option<i64> {
    if start > end {
        return None;
    }
    // Closed-form in i128 to survive intermediate overflow
    let count = (end as i128) - (start as i128) + 1;
    let total = ((start as i128) + (end as i128)) * count / 2;
    i64::try_from(total).ok()
}

/// Compute `n!`, persist the result, notify subscribers.
pub async fn run_factorial(pool: PgPool, hub: Broadcaster, username: String, n: i64) {
    tracing::info!("computing factorial of {n} for {username}");

    let task = format!("factorial of {n}");
    let outcome = retry(DEFAULT_ATTEMPTS, DEFAULT_DELAY, || {
        let pool = pool.clone();
        let username = username.clone();
        let task = task.clone();
        async move {
            let result = factorial(n).ok_or(JobError::Overflow)?;
            insert_calculation(&pool, &username, &task, result).await?;
            Ok::<i64, JobError>(result)
        }
    })
    .await;

    match outcome {
        Ok(result) => {
            tracing::info!("factorial of {n} = {result} for {username}");
            hub.broadcast(format!(
                "Computation finished for {username}: factorial of {n} = {result}"
            ));
        }
        Err(e) => tracing::error!("factorial job for {username} failed: {e}"),
    }
}

/// Sum `start..=end`, persist the result, notify subscribers.
pub async fn run_sum(pool: PgPool, hub: Broadcaster, username: String, start: i64, end: i64) {
    tracing::info!("computing sum from {start} to {end} for {username}");

    let task = format!("sum from {start} to {end}");
    let outcome = retry(DEFAULT_ATTEMPTS, DEFAULT_DELAY, || {
        let pool = pool.clone();
        let username = username.clone();
        let task = task.clone();
        async move {
            let result = sum_range(start, end).ok_or(JobError::Overflow)?;
            insert_calculation(&pool, &username, &task, result).await?;
            Ok::<i64, JobError>(result)
        }
    })
    .await;

    match outcome {
        Ok(result) => {
            tracing::info!("sum from {start} to {end} = {result} for {username}");
            hub.broadcast(format!(
                "Computation finished for {username}: sum from {start} to {end} = {result}"
            ));
        }
        Err(e) => tracing::error!("sum job for {username} failed: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factorial_small_values() {
        assert_eq!(factorial(1), Some(1));
        assert_eq!(factorial(5), Some(120));
        assert_eq!(factorial(10), Some(3_628_800));
    }

    #[test]
    fn test_factorial_of_zero() {
        assert_eq!(factorial(0), Some(1));
    }

    #[test]
    fn test_factorial_limit() {
        // 20! is the largest factorial that fits in i64
        assert_eq!(factorial(MAX_FACTORIAL_INPUT), Some(2_432_902_008_176_640_000));
        assert_eq!(factorial(MAX_FACTORIAL_INPUT + 1), None);
    }

    #[test]
    fn test_factorial_negative() {
        assert_eq!(factorial(-1), None);
    }

    #[test]
    fn test_sum_range() {
        assert_eq!(sum_range(1, 10), Some(55));
        assert_eq!(sum_range(5, 5), Some(5));
        assert_eq!(sum_range(-3, 3), Some(0));
    }

    #[test]
    fn test_sum_range_empty() {
        assert_eq!(sum_range(10, 1), None);
    }

    #[test]
    fn test_sum_range_overflow() {
        assert_eq!(sum_range(i64::MAX - 1, i64::MAX), None);
        // Large but representable ranges still work
        assert_eq!(sum_range(0, 2_000_000_000), Some(2_000_000_001_000_000_000));
    }
}
