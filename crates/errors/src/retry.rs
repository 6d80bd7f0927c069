use std::future::Future;
use std::time::Duration;

use eyre::Result;
use tracing::{debug, warn};

use crate::classify_report;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_attempts: 5, base_delay: Duration::from_secs(1), max_delay: Duration::from_secs(30) }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration, max_delay: Duration) -> Self {
        Self { max_attempts: max_attempts.max(1), base_delay, max_delay }
    }

    /// Delay before retry number `attempt` (0-based): `base * 2^attempt`, capped at `max_delay`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }
}

async fn retry_inner<T, F, Fut>(policy: &RetryPolicy, name: &str, mut op: F, only_retryable: bool) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 0u32;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(error) => {
                attempt += 1;
                let classified = classify_report(&error);
                if only_retryable && !classified.retryable {
                    debug!(%name, category = %classified.category, "not retryable");
                    return Err(error);
                }
                if attempt >= policy.max_attempts {
                    warn!(%name, attempt, "giving up after {} attempts : {:#}", attempt, error);
                    return Err(error);
                }
                let delay = policy.delay_for(attempt - 1);
                warn!(%name, attempt, category = %classified.category, ?delay, "retrying : {:#}", error);
                tokio::time::sleep(delay).await;
            }
        }
    }
}

/// Retries only errors the classifier marks retryable.
pub async fn retry_with_backoff<T, F, Fut>(policy: &RetryPolicy, name: &str, op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    retry_inner(policy, name, op, true).await
}

/// Retries any error until the attempt ceiling.
pub async fn retry_always<T, F, Fut>(policy: &RetryPolicy, name: &str, op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    retry_inner(policy, name, op, false).await
}

#[cfg(test)]
mod test {
    use std::sync::atomic::{AtomicU32, Ordering};

    use eyre::eyre;

    use super::*;

    #[test]
    fn test_delay_is_exponential_and_capped() {
        let policy = RetryPolicy::new(10, Duration::from_millis(100), Duration::from_secs(1));
        assert_eq!(policy.delay_for(0), Duration::from_millis(100));
        assert_eq!(policy.delay_for(1), Duration::from_millis(200));
        assert_eq!(policy.delay_for(3), Duration::from_millis(800));
        assert_eq!(policy.delay_for(4), Duration::from_secs(1));
        assert_eq!(policy.delay_for(40), Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_retryable_error_eventually_succeeds() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::new(5, Duration::from_millis(10), Duration::from_millis(100));

        let result = retry_with_backoff(&policy, "flaky", || async {
            if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(eyre!("connection reset"))
            } else {
                Ok(42)
            }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_retryable_error_fails_fast() {
        let calls = AtomicU32::new(0);
        let result: Result<()> = retry_with_backoff(&RetryPolicy::default(), "revert", || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(eyre!("execution reverted"))
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_always_stops_at_ceiling() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::new(3, Duration::from_millis(10), Duration::from_millis(100));
        let result: Result<()> = retry_always(&policy, "broken", || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(eyre!("execution reverted"))
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
