//! Rate-limit retry
//!
//! Only `RateLimited` errors are retried. The delay before attempt `n + 1`
//! is `base_delay * 2^n` capped at `max_delay`, unless the store named a
//! delay itself, in which case that delay is used.

use std::future::Future;
use std::time::Duration;

use envsync_core::errors::{ExError, ExErrorKind};
use envsync_store::config::RetrySettings;

/// Retry budget for calls against the target store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl RetryPolicy {
    /// Single attempt, no backoff
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    /// Backoff delay after the `attempt`-th failure (0-based)
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.base_delay
            .checked_mul(factor)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }

    fn delay_for(&self, attempt: u32, err: &ExError) -> Duration {
        err.retry_after().unwrap_or_else(|| self.backoff(attempt))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetrySettings::default())
    }
}

impl From<&RetrySettings> for RetryPolicy {
    fn from(settings: &RetrySettings) -> Self {
        Self {
            max_attempts: settings.max_attempts.max(1),
            base_delay: Duration::from_millis(settings.base_delay_ms),
            max_delay: Duration::from_millis(settings.max_delay_ms),
        }
    }
}

/// Run `call` until it succeeds, fails with a non-retryable error, or the
/// attempt budget is spent
///
/// The last error is returned unchanged when the budget runs out.
pub async fn with_retry<T, F, Fut>(policy: &RetryPolicy, op: &str, mut call: F) -> Result<T, ExError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ExError>>,
{
    let mut attempt = 0u32;
    loop {
        match call().await {
            Ok(value) => return Ok(value),
            Err(err) if err.kind() == ExErrorKind::RateLimited => {
                attempt += 1;
                if attempt >= policy.max_attempts {
                    tracing::warn!(
                        op = op,
                        attempts = attempt,
                        "rate limited; retry budget exhausted"
                    );
                    return Err(err);
                }
                let delay = policy.delay_for(attempt - 1, &err);
                tracing::warn!(
                    op = op,
                    attempt = attempt,
                    delay_ms = delay.as_millis() as u64,
                    "rate limited; backing off"
                );
                tokio::time::sleep(delay).await;
            }
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(4),
        }
    }

    #[test]
    fn test_backoff_doubles_and_caps() {
        let policy = RetryPolicy {
            max_attempts: 10,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_millis(3000),
        };
        assert_eq!(policy.backoff(0), Duration::from_millis(500));
        assert_eq!(policy.backoff(1), Duration::from_millis(1000));
        assert_eq!(policy.backoff(2), Duration::from_millis(2000));
        assert_eq!(policy.backoff(3), Duration::from_millis(3000));
        assert_eq!(policy.backoff(40), Duration::from_millis(3000));
    }

    #[test]
    fn test_from_settings() {
        let policy = RetryPolicy::from(&RetrySettings::default());
        assert_eq!(policy.max_attempts, 5);
        assert_eq!(policy.base_delay, Duration::from_millis(500));
    }

    #[tokio::test]
    async fn test_rate_limit_then_success() {
        let calls = AtomicU32::new(0);
        let result = with_retry(&fast(), "get_entry", || async {
            if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(ExError::new(ExErrorKind::RateLimited))
            } else {
                Ok(7)
            }
        })
        .await;
        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_budget_exhausted_returns_last_error() {
        let calls = AtomicU32::new(0);
        let result: Result<(), ExError> = with_retry(&fast(), "publish_entry", || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(ExError::new(ExErrorKind::RateLimited))
        })
        .await;
        assert_eq!(result.unwrap_err().kind(), ExErrorKind::RateLimited);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_other_errors_not_retried() {
        let calls = AtomicU32::new(0);
        let result: Result<(), ExError> = with_retry(&fast(), "update_entry", || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(ExError::new(ExErrorKind::VersionMismatch))
        })
        .await;
        assert_eq!(result.unwrap_err().kind(), ExErrorKind::VersionMismatch);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
