//! Retry controller for transient LLM failures.
//!
//! Provides classification of retryable errors, exponential backoff, and
//! a reusable combinator that wraps any outbound call. The backoff sleep
//! suspends only the calling task; concurrent requests are unaffected.

use crate::error::LlmError;
use std::future::Future;
use std::time::Duration;

/// Retry policy for a guarded call.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Max total attempts (first try included)
    pub max_attempts: u32,
    /// Base backoff delay in milliseconds
    pub base_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 2000,
        }
    }
}

/// Determine whether an LLM call error is worth retrying.
///
/// Retryable errors: timeouts, rate limits (429), request timeouts (408),
/// server errors (5xx), and connection-level failures. Non-retryable:
/// other client errors (auth, bad request) and schema violations, which
/// repeat identically on retry.
pub fn is_retryable(error: &LlmError) -> bool {
    match error {
        LlmError::Timeout { .. } => true,
        LlmError::Transport { .. } => true,
        LlmError::Http { status, .. } => {
            *status == 408 || *status == 429 || (500..=599).contains(status)
        }
        LlmError::Schema { .. } => false,
    }
}

/// Calculate exponential backoff duration for a given attempt.
///
/// Uses `base_delay * 2^attempt` with a cap at 30 seconds.
pub fn backoff_duration(attempt: u32, base_delay_ms: u64) -> Duration {
    let delay = base_delay_ms.saturating_mul(2u64.saturating_pow(attempt));
    Duration::from_millis(delay.min(30_000))
}

/// Run `call` with bounded retries and exponential backoff.
///
/// Permanent failures are returned immediately. Transient failures are
/// retried after `base_delay * 2^(attempt-1)` until `max_attempts` total
/// attempts have been made; exhaustion surfaces the last transient error.
pub async fn with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    stage: &str,
    mut call: F,
) -> Result<T, LlmError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, LlmError>>,
{
    let mut last_error: Option<LlmError> = None;

    for attempt in 1..=policy.max_attempts {
        if attempt > 1 {
            let delay = backoff_duration(attempt - 2, policy.base_delay_ms);
            tracing::debug!(stage, attempt, ?delay, "retrying after transient failure");
            tokio::time::sleep(delay).await;
        }

        match call().await {
            Ok(value) => return Ok(value),
            Err(e) if is_retryable(&e) => {
                tracing::warn!(stage, attempt, error = %e, "transient LLM failure");
                last_error = Some(e);
            }
            Err(e) => return Err(e),
        }
    }

    Err(last_error.unwrap_or_else(|| LlmError::Transport {
        message: format!("{stage}: no attempts were made"),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use tokio::time::Instant;

    fn transient() -> LlmError {
        LlmError::Http {
            status: 503,
            message: "service unavailable".to_string(),
        }
    }

    fn permanent() -> LlmError {
        LlmError::Http {
            status: 401,
            message: "unauthorized".to_string(),
        }
    }

    #[test]
    fn test_timeout_is_retryable() {
        let err = LlmError::Timeout {
            stage: "validate".to_string(),
            timeout_ms: 60000,
        };
        assert!(is_retryable(&err));
    }

    #[test]
    fn test_rate_limit_is_retryable() {
        let err = LlmError::Http {
            status: 429,
            message: "rate limit exceeded".to_string(),
        };
        assert!(is_retryable(&err));
    }

    #[test]
    fn test_server_error_is_retryable() {
        assert!(is_retryable(&transient()));
    }

    #[test]
    fn test_connection_error_is_retryable() {
        let err = LlmError::Transport {
            message: "connection refused".to_string(),
        };
        assert!(is_retryable(&err));
    }

    #[test]
    fn test_auth_error_not_retryable() {
        assert!(!is_retryable(&permanent()));
    }

    #[test]
    fn test_schema_violation_not_retryable() {
        let err = LlmError::Schema {
            message: "expected PASS or FAIL".to_string(),
        };
        assert!(!is_retryable(&err));
    }

    #[test]
    fn test_backoff_exponential() {
        assert_eq!(backoff_duration(0, 1000), Duration::from_millis(1000));
        assert_eq!(backoff_duration(1, 1000), Duration::from_millis(2000));
        assert_eq!(backoff_duration(2, 1000), Duration::from_millis(4000));
        assert_eq!(backoff_duration(3, 1000), Duration::from_millis(8000));
    }

    #[test]
    fn test_backoff_capped_at_30s() {
        assert_eq!(backoff_duration(10, 1000), Duration::from_millis(30_000));
    }

    fn policy(max_attempts: u32, base_delay_ms: u64) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            base_delay_ms,
        }
    }

    #[tokio::test]
    async fn test_success_on_first_attempt() {
        let calls = Arc::new(AtomicU32::new(0));
        let calls_ref = calls.clone();
        let result = with_retry(&policy(3, 10), "test", || {
            let calls = calls_ref.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<_, LlmError>(42)
            }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_failures_then_success() {
        // Fails transiently twice, succeeds on the third attempt.
        let calls = Arc::new(AtomicU32::new(0));
        let calls_ref = calls.clone();
        let result = with_retry(&policy(5, 1000), "test", || {
            let calls = calls_ref.clone();
            async move {
                let attempt = calls.fetch_add(1, Ordering::SeqCst);
                if attempt < 2 {
                    Err(transient())
                } else {
                    Ok("recovered")
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), "recovered");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhaustion_surfaces_last_transient_error() {
        let calls = Arc::new(AtomicU32::new(0));
        let calls_ref = calls.clone();
        let result: Result<(), _> = with_retry(&policy(3, 1000), "test", || {
            let calls = calls_ref.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(transient())
            }
        })
        .await;

        let err = result.unwrap_err();
        assert!(matches!(err, LlmError::Http { status: 503, .. }));
        // Exactly max_attempts calls, no more
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_permanent_failure_is_not_retried() {
        let calls = Arc::new(AtomicU32::new(0));
        let calls_ref = calls.clone();
        let result: Result<(), _> = with_retry(&policy(5, 10), "test", || {
            let calls = calls_ref.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(permanent())
            }
        })
        .await;

        assert!(matches!(
            result.unwrap_err(),
            LlmError::Http { status: 401, .. }
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_backoff_waits_increase_between_attempts() {
        // With the clock paused, sleeps advance virtual time instantly and
        // the total elapsed time equals the sum of the backoff delays.
        let start = Instant::now();
        let calls = Arc::new(AtomicU32::new(0));
        let calls_ref = calls.clone();
        let _: Result<(), _> = with_retry(&policy(3, 1000), "test", || {
            let calls = calls_ref.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(transient())
            }
        })
        .await;

        // Delays: 1000ms after attempt 1, 2000ms after attempt 2.
        let elapsed = start.elapsed();
        assert!(
            elapsed >= Duration::from_millis(3000),
            "expected >= 3000ms of backoff, got {elapsed:?}"
        );
        assert!(elapsed < Duration::from_millis(3500));
    }
}
