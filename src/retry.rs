//! Bounded exponential backoff for per-file downloads.

use std::future::Future;
use std::time::Duration;

use rand::Rng as _;

/// What the error classifier tells the retry loop to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryAction {
    Retry,
    Abort,
}

#[derive(Debug, Clone, Copy)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub base_delay_secs: u64,
    pub max_delay_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay_secs: 5,
            max_delay_secs: 60,
        }
    }
}

impl RetryConfig {
    /// Delay before retry number `retry` (0-indexed):
    /// `min(base * 2^retry, max)` plus up to one extra `base` of jitter so
    /// parallel downloads do not retry in lockstep.
    fn delay_for_retry(&self, retry: u32) -> Duration {
        let doubling = 2u64.checked_pow(retry).unwrap_or(u64::MAX);
        let backoff = self
            .base_delay_secs
            .saturating_mul(doubling)
            .min(self.max_delay_secs);
        let jitter = if self.base_delay_secs > 0 {
            rand::thread_rng().gen_range(0..self.base_delay_secs)
        } else {
            0
        };
        Duration::from_secs(backoff.saturating_add(jitter))
    }
}

/// Run `operation` until it succeeds, the classifier says [`RetryAction::Abort`],
/// or `max_retries` retries are spent. Returns the last error on exhaustion.
pub async fn retry_with_backoff<F, Fut, T, E, C>(
    config: &RetryConfig,
    classifier: C,
    operation: F,
) -> Result<T, E>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    C: Fn(&E) -> RetryAction,
    E: std::fmt::Display,
{
    let mut retry = 0u32;

    loop {
        let err = match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };

        if classifier(&err) == RetryAction::Abort || retry >= config.max_retries {
            return Err(err);
        }

        let delay = config.delay_for_retry(retry);
        tracing::warn!(
            "Transient download error, retry {} of {} in {}s: {}",
            retry + 1,
            config.max_retries,
            delay.as_secs(),
            err
        );
        tokio::time::sleep(delay).await;
        retry += 1;
    }
}
