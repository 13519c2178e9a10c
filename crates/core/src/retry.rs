//! Bounded retry with linear backoff.
//!
//! The delay before retry `n` (1-indexed) is `backoff_unit * n`, so a
//! configuration of 3 retries with a 1s unit waits 1s, 2s and 3s. There is no
//! jitter and no overall deadline: the number of attempts is the only bound.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

/// Retry configuration, supplied from outside the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryConfig {
    /// Retries after the first attempt. Zero means a single attempt.
    pub max_retries: u32,
    /// Linear backoff step.
    pub backoff_unit: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff_unit: Duration::from_secs(1),
        }
    }
}

impl RetryConfig {
    pub fn new(max_retries: u32, backoff_unit: Duration) -> Self {
        Self {
            max_retries,
            backoff_unit,
        }
    }

    /// Returns the delay to wait before the given retry (1-indexed).
    pub fn delay_for_attempt(&self, retry: u32) -> Duration {
        self.backoff_unit.saturating_mul(retry)
    }

    /// Time spent sleeping when every attempt fails.
    pub fn total_backoff(&self) -> Duration {
        (1..=self.max_retries).fold(Duration::ZERO, |total, retry| {
            total.saturating_add(self.delay_for_attempt(retry))
        })
    }
}

/// Executes fallible async actions under a [`RetryConfig`].
#[derive(Debug, Clone, Default)]
pub struct RetryExecutor {
    config: RetryConfig,
}

impl RetryExecutor {
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Runs `action`, retrying every failure until the retries are used up.
    ///
    /// The last error is returned unchanged.
    pub async fn execute<F, Fut, T, E>(&self, action: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        self.execute_if(action, |_| true).await
    }

    /// Like [`execute`](Self::execute), but gives up immediately on errors
    /// for which `should_retry` returns false.
    pub async fn execute_if<F, Fut, T, E, P>(&self, mut action: F, should_retry: P) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
        P: Fn(&E) -> bool,
    {
        let mut retry: u32 = 0;

        loop {
            match action().await {
                Ok(value) => return Ok(value),
                Err(err) if retry < self.config.max_retries && should_retry(&err) => {
                    retry += 1;
                    let delay = self.config.delay_for_attempt(retry);

                    tracing::warn!(
                        retry,
                        max_retries = self.config.max_retries,
                        error = %err,
                        delay_ms = delay.as_millis() as u64,
                        "Retry {} encountered an error: {}. Retrying in {:?}...",
                        retry,
                        err,
                        delay
                    );

                    tokio::time::sleep(delay).await;
                }
                Err(err) => return Err(err),
            }
        }
    }
}
