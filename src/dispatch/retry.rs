// ============================================================================
// Retry Executor
// ============================================================================
//
// Wraps one remote operation with bounded exponential backoff.
// After failed attempt `n` (0-based) the executor waits `base_delay * 2^n`,
// so the delays run base, 2*base, 4*base, ... Exhausting every attempt hands
// the final error back to the caller unchanged.
// ============================================================================

use std::future::Future;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    /// `max_attempts` below one is raised to one: the operation always runs
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    /// Delay before the attempt that follows failed attempt `attempt` (0-based)
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(2_u32.saturating_pow(attempt))
    }
}

/// Run `operation` until it succeeds or `policy.max_attempts` are spent.
///
/// The closure receives the 0-based attempt number.
pub async fn retry<T, E, F, Fut>(
    policy: RetryPolicy,
    operation_name: &str,
    mut operation: F,
) -> Result<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut attempt = 0;

    loop {
        match operation(attempt).await {
            Ok(value) => {
                if attempt > 0 {
                    info!(
                        operation = operation_name,
                        attempt = attempt + 1,
                        "Operation succeeded after retry"
                    );
                }
                return Ok(value);
            }
            Err(e) => {
                let remaining = policy.max_attempts - attempt - 1;
                warn!(
                    operation = operation_name,
                    attempt = attempt + 1,
                    max_attempts = policy.max_attempts,
                    error = %e,
                    "Operation failed"
                );

                if remaining == 0 {
                    return Err(e);
                }

                tokio::time::sleep(policy.delay_after(attempt)).await;
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::time::Instant;

    fn policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy::new(max_attempts, Duration::from_secs(1))
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_after_failures_waits_doubling_delays() {
        let calls = Arc::new(AtomicU32::new(0));
        let started = Instant::now();

        let result: Result<&str, String> = retry(policy(3), "flaky", |_| {
            let calls = calls.clone();
            async move {
                if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err("transient".to_string())
                } else {
                    Ok("done")
                }
            }
        })
        .await;

        assert_eq!(result, Ok("done"));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // 1s after the first failure, 2s after the second
        assert_eq!(started.elapsed(), Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhaustion_returns_last_error_without_trailing_delay() {
        let started = Instant::now();

        let result: Result<(), String> =
            retry(policy(3), "always-fails", |attempt| async move {
                Err(format!("failure {}", attempt))
            })
            .await;

        assert_eq!(result, Err("failure 2".to_string()));
        assert_eq!(started.elapsed(), Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_try_success_never_sleeps() {
        let started = Instant::now();
        let result: Result<u8, String> = retry(policy(3), "ok", |_| async { Ok(7) }).await;
        assert_eq!(result, Ok(7));
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[test]
    fn test_delay_schedule() {
        let p = RetryPolicy::new(4, Duration::from_millis(500));
        assert_eq!(p.delay_after(0), Duration::from_millis(500));
        assert_eq!(p.delay_after(1), Duration::from_millis(1000));
        assert_eq!(p.delay_after(2), Duration::from_millis(2000));
        assert_eq!(RetryPolicy::new(0, Duration::ZERO).max_attempts, 1);
    }
}
