//! Retry-with-backoff wrapper for remote calls.
//!
//! Retryable failures (throttling, network, provider 5xx) are absorbed up
//! to the policy's attempt budget; a provider wait hint takes precedence
//! over the exponential schedule. Permanent client errors fail on the
//! first attempt.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::error::TransportError;

/// Attempt budget and backoff schedule for one call site.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Number of retries after the initial attempt.
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 5,
            base_delay: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
        }
    }

    /// The smaller budget used for write calls.
    pub fn write() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(1000),
        }
    }

    /// Delay before retry number `attempt` (0-based) for `err`.
    ///
    /// A rate-limit wait hint wins; otherwise `base_delay * 2^attempt`.
    pub fn backoff_delay(&self, attempt: u32, err: &TransportError) -> Duration {
        if let TransportError::RateLimited {
            retry_after: Some(hint),
        } = err
        {
            return *hint;
        }
        self.base_delay * 2u32.saturating_pow(attempt)
    }
}

/// Invoke `op`, retrying per `policy` until it succeeds, fails terminally,
/// or the budget is exhausted, in which case the last error is returned.
pub async fn retry_with_backoff<T, F, Fut>(
    policy: RetryPolicy,
    mut op: F,
) -> Result<T, TransportError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, TransportError>>,
{
    let mut attempt = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !err.is_retryable() {
                    return Err(err);
                }
                if attempt >= policy.max_retries {
                    warn!(attempt = attempt + 1, error = %err, "retry budget exhausted");
                    return Err(err);
                }
                let delay = policy.backoff_delay(attempt, &err);
                warn!(
                    attempt = attempt + 1,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "remote call failed, backing off"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
