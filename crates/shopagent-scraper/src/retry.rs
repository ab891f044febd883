//! Optional exponential backoff for transient upstream failures.
//!
//! Retries are off by default (`max_retries == 0`): a failed refresh simply
//! waits for the next trigger. Operators can opt in per deployment.

use std::future::Future;
use std::time::Duration;

use crate::error::ScraperError;

/// How many extra attempts to make and how long to wait between them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub backoff_base_secs: u64,
}

impl RetryPolicy {
    /// A policy that makes exactly one attempt.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            max_retries: 0,
            backoff_base_secs: 0,
        }
    }

    /// Delay before retry number `attempt` (zero-based): `base * 2^attempt`.
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        Duration::from_secs(
            self.backoff_base_secs
                .saturating_mul(1u64 << attempt.min(62)),
        )
    }

    /// Runs `operation`, retrying 429s, 5xx and network failures.
    ///
    /// A 429 waits at least as long as its `Retry-After`.
    ///
    /// Any other error, or the last transient error once retries are
    /// exhausted, is returned as-is.
    pub async fn run<T, F, Fut>(&self, mut operation: F) -> Result<T, ScraperError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ScraperError>>,
    {
        let mut attempt = 0u32;
        loop {
            let err = match operation().await {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };

            if !is_transient(&err) || attempt >= self.max_retries {
                return Err(err);
            }

            let delay = match &err {
                ScraperError::RateLimited {
                    retry_after_secs, ..
                } => self.delay_for(attempt).max(Duration::from_secs(*retry_after_secs)),
                _ => self.delay_for(attempt),
            };
            tracing::warn!(
                attempt,
                max_retries = self.max_retries,
                delay_secs = delay.as_secs(),
                error = %err,
                "transient upstream error; retrying after backoff"
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}

fn is_transient(err: &ScraperError) -> bool {
    matches!(
        err,
        ScraperError::RateLimited { .. } | ScraperError::Http(_)
    ) || matches!(err, ScraperError::UnexpectedStatus { status, .. } if *status >= 500)
}
