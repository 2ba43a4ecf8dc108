//! Retry-with-backoff policy for the classification call.
//!
//! The policy is plain data plus a small driver, so the schedule and the
//! transient/fatal split can be unit tested without any HTTP plumbing.
//! Retries are owned entirely by this layer; nothing above it re-invokes
//! a failed classification.

use std::future::Future;
use std::time::Duration;

use crate::error::ClassificationError;

/// Retry schedule for transient classification failures.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Additional attempts after the first (3 means 4 attempts total).
    pub max_retries: u32,
    /// Base backoff unit; the delay before retry N is `base_delay * 2^N`.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Delay before retry `attempt` (1-based).
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.base_delay * 2u32.saturating_pow(attempt)
    }

    /// Run `op` until it succeeds, fails with a non-transient error, or
    /// the retry budget is exhausted. The last observed failure is the one
    /// surfaced to the caller.
    ///
    /// Backoff sleeps suspend only this future, never the whole process.
    pub async fn run<T, F, Fut>(&self, mut op: F) -> Result<T, ClassificationError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ClassificationError>>,
    {
        let mut attempt = 0u32;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_transient() && attempt < self.max_retries => {
                    attempt += 1;
                    let delay = self.backoff(attempt);
                    tracing::warn!(
                        attempt,
                        max_retries = self.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        "transient classification failure, backing off: {err}"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(err) => return Err(err),
            }
        }
    }
}
