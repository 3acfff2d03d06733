/**
 * Retry Helper
 *
 * A generic retry wrapper for fallible async operations. Used by the
 * background computation jobs to ride out transient failures (most
 * often a briefly unreachable database).
 */
use std::future::Future;
use std::time::Duration;

/// Default number of attempts for background jobs.
pub const DEFAULT_ATTEMPTS: u32 = 3;

/// Default pause between attempts.
pub const DEFAULT_DELAY: Duration = Duration::from_secs(2);

/// Run `operation` up to `attempts` times, sleeping `delay` between
/// failures. Returns the first success, or the last error once the
/// attempts are exhausted.
pub async fn retry<F, Fut, T, E>(attempts: u32, delay: Duration, mut operation: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut attempt = 1;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt < attempts => {
                tracing::warn!("attempt {attempt}/{attempts} failed: {e}, retrying in {delay:?}");
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => {
                tracing::error!("all {attempts} attempts failed: {e}");
                return Err(e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_first_try() {
        let calls = AtomicU32::new(0);
        let result: Result<i32, &str> = retry(3, Duration::from_secs(2), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok(42) }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_on_last_attempt() {
        let calls = AtomicU32::new(0);
        let result: Result<i32, &str> = retry(3, Duration::from_secs(2), || {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            async move {
                if n < 3 {
                    Err("transient failure")
                } else {
                    Ok(7)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_gives_up_after_attempts() {
        let calls = AtomicU32::new(0);
        let result: Result<i32, &str> = retry(3, Duration::from_secs(2), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err("permanent failure") }
        })
        .await;

        assert_eq!(result.unwrap_err(), "permanent failure");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
