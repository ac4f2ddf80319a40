//! Exponential backoff for SCIM calls.
//!
//! Only the HTTP layer retries. A failure that survives the policy surfaces
//! to the reconciler, which aborts the run.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::{ScimClientError, ScimClientResult};

/// Retry policy configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt (0 = no retries).
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    #[must_use]
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
            ..Default::default()
        }
    }

    /// A policy that makes exactly one attempt.
    #[must_use]
    pub fn none() -> Self {
        Self::new(0, Duration::ZERO)
    }

    /// Whether `error` at `attempt` (0-based) is worth another try.
    #[must_use]
    pub fn should_retry(&self, attempt: u32, error: &ScimClientError) -> bool {
        attempt < self.max_retries && (error.is_retryable() || error.is_server_error())
    }

    /// `Retry-After` when the target sent one, otherwise
    /// `base_delay * 2^attempt`. Both capped at `max_delay`.
    #[must_use]
    pub fn delay_for(&self, attempt: u32, error: &ScimClientError) -> Duration {
        let delay = match error {
            ScimClientError::RateLimited {
                retry_after_secs: Some(secs),
            } => Duration::from_secs(*secs),
            _ => self
                .base_delay
                .saturating_mul(2u32.saturating_pow(attempt)),
        };
        delay.min(self.max_delay)
    }

    /// Run `f` until it succeeds, fails permanently or the budget runs out.
    pub async fn execute<F, Fut, T>(&self, operation: &str, mut f: F) -> ScimClientResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ScimClientResult<T>>,
    {
        let mut attempt: u32 = 0;
        loop {
            let error = match f().await {
                Ok(value) => {
                    if attempt > 0 {
                        debug!(operation, attempt = attempt + 1, "SCIM call succeeded after retries");
                    }
                    return Ok(value);
                }
                Err(error) => error,
            };

            if self.should_retry(attempt, &error) {
                let delay = self.delay_for(attempt, &error);
                debug!(
                    operation,
                    attempt = attempt + 1,
                    delay_ms = delay.as_millis() as u64,
                    error = %error,
                    "Retrying SCIM call"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
                continue;
            }

            let exhausted =
                attempt >= self.max_retries && (error.is_retryable() || error.is_server_error());
            if exhausted && self.max_retries > 0 {
                warn!(operation, attempts = attempt + 1, error = %error, "SCIM retries exhausted");
                return Err(ScimClientError::MaxRetriesExceeded {
                    attempts: attempt + 1,
                    message: format!("{operation}: {error}"),
                });
            }
            return Err(error);
        }
    }
}
