use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use eyre::{eyre, Result};
use otc_errors::{classify_report, ErrorCategory};
use tokio::sync::{Mutex, OwnedSemaphorePermit, Semaphore};
use tokio::time::Instant;
use tracing::{trace, warn};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RateLimiterConfig {
    pub max_concurrent: usize,
    pub min_spacing: Duration,
    pub cooldown: Duration,
    pub request_timeout: Duration,
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self {
            max_concurrent: 4,
            min_spacing: Duration::from_millis(250),
            cooldown: Duration::from_secs(2),
            request_timeout: Duration::from_secs(15),
        }
    }
}

/// Admission gate for provider calls: at most `max_concurrent` in flight and call starts at least
/// `min_spacing` apart. A call failing with a rate-limit error is retried once after `cooldown`.
#[derive(Clone)]
pub struct RateLimiter {
    config: RateLimiterConfig,
    semaphore: Arc<Semaphore>,
    last_start: Arc<Mutex<Option<Instant>>>,
}

impl RateLimiter {
    pub fn new(config: RateLimiterConfig) -> Self {
        let permits = config.max_concurrent.max(1);
        Self { config, semaphore: Arc::new(Semaphore::new(permits)), last_start: Arc::new(Mutex::new(None)) }
    }

    pub fn config(&self) -> &RateLimiterConfig {
        &self.config
    }

    /// Waits for a free slot, then for the spacing since the previous start. The permit frees the slot on drop.
    pub async fn acquire(&self) -> Result<OwnedSemaphorePermit> {
        let permit = self.semaphore.clone().acquire_owned().await?;

        let mut last_start = self.last_start.lock().await;
        if let Some(previous) = *last_start {
            let earliest = previous + self.config.min_spacing;
            if earliest > Instant::now() {
                tokio::time::sleep_until(earliest).await;
            }
        }
        *last_start = Some(Instant::now());

        Ok(permit)
    }

    async fn run_once<T, F, Fut>(&self, name: &str, op: &F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let _permit = self.acquire().await?;
        trace!(%name, "request admitted");
        match tokio::time::timeout(self.config.request_timeout, op()).await {
            Ok(result) => result,
            Err(_) => Err(eyre!("{} request timed out after {:?}", name, self.config.request_timeout)),
        }
    }

    pub async fn run<T, F, Fut>(&self, name: &str, op: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        match self.run_once(name, &op).await {
            Err(error) if classify_report(&error).category == ErrorCategory::RateLimit => {
                warn!(%name, cooldown = ?self.config.cooldown, "rate limited, retrying once : {:#}", error);
                tokio::time::sleep(self.config.cooldown).await;
                self.run_once(name, &op).await
            }
            result => result,
        }
    }
}
