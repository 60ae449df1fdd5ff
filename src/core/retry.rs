//! Fixed-delay retry for remote calls.
//!
//! The secret store throttles bursts, so retries wait a constant delay
//! between attempts instead of backing off exponentially.

use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, warn};

use crate::core::constants;

/// How often and how patiently to retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub retries: u32,
    /// Wait between attempts.
    pub delay: Duration,
}

impl RetryPolicy {
    /// Secret store reads: one retry after 2s.
    pub const READ: Self = Self::new(constants::READ_RETRIES, constants::READ_DELAY);

    /// Secret store writes: five retries, 5s apart.
    pub const WRITE: Self = Self::new(constants::WRITE_RETRIES, constants::WRITE_DELAY);

    /// Single attempt, no waiting.
    pub const NONE: Self = Self::new(0, Duration::ZERO);

    pub const fn new(retries: u32, delay: Duration) -> Self {
        Self { retries, delay }
    }

    /// Total number of attempts, including the first.
    pub const fn attempts(&self) -> u32 {
        self.retries.saturating_add(1)
    }
}

/// The last error of a call that ran out of attempts, or failed with an
/// error that is not worth retrying.
#[derive(Debug, Error)]
#[error("{label} failed after {attempts} attempt(s): {source}")]
pub struct RetryExhausted<E>
where
    E: std::error::Error + 'static,
{
    pub label: String,
    pub attempts: u32,
    #[source]
    pub source: E,
}

/// Run `op` until it succeeds, fails with an error `is_retryable` rejects,
/// or `policy` runs out of attempts.
///
/// # Errors
///
/// Returns `RetryExhausted` carrying the last error and the number of
/// attempts made.
pub async fn retry<T, E, Op, Fut, C>(
    policy: RetryPolicy,
    label: &str,
    mut op: Op,
    is_retryable: C,
) -> Result<T, RetryExhausted<E>>
where
    Op: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    C: Fn(&E) -> bool,
    E: std::error::Error + 'static,
{
    let max_attempts = policy.attempts();
    let mut attempt = 1;

    loop {
        match op().await {
            Ok(value) => {
                if attempt > 1 {
                    debug!(label, attempt, "succeeded after retry");
                }
                return Ok(value);
            }
            Err(error) if attempt < max_attempts && is_retryable(&error) => {
                warn!(
                    label,
                    attempt,
                    max_attempts,
                    delay_ms = policy.delay.as_millis() as u64,
                    error = %error,
                    "attempt failed, retrying"
                );
                tokio::time::sleep(policy.delay).await;
                attempt += 1;
            }
            Err(error) => {
                debug!(label, attempt, error = %error, "giving up");
                return Err(RetryExhausted {
                    label: label.to_string(),
                    attempts: attempt,
                    source: error,
                });
            }
        }
    }
}
