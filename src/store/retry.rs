//! Bounded exponential backoff for content-store fetches.
//!
//! Only transient (network-class) failures are retried; a genuine "no such
//! document" outcome is a normal result and never reaches this layer.

use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;

use crate::debug;

/// Retry behavior for one class of operation.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of attempts, including the first one.
    pub max_attempts: u32,
    /// Delay before the first retry; doubles per attempt.
    pub initial_delay: Duration,
    /// Cap on the per-attempt delay.
    pub max_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, initial_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            initial_delay,
            max_delay: Duration::from_secs(5),
        }
    }

    /// Delay before the given attempt (0-indexed; attempt 0 never waits).
    fn delay_for(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }
        let factor = 2u32.saturating_pow(attempt - 1);
        self.initial_delay
            .saturating_mul(factor)
            .min(self.max_delay)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(500))
    }
}

/// Run `op`, retrying while `retryable(&err)` holds, up to the attempt cap.
///
/// Non-retryable errors fail immediately; the last error is returned when
/// every attempt fails.
pub async fn with_retry<T, E, F, Fut, P>(
    policy: &RetryPolicy,
    name: &str,
    mut op: F,
    retryable: P,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
    P: Fn(&E) -> bool,
{
    let mut last_error = None;

    for attempt in 0..policy.max_attempts {
        let delay = policy.delay_for(attempt);
        if !delay.is_zero() {
            sleep(delay).await;
        }

        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if !retryable(&e) => return Err(e),
            Err(e) => {
                debug!(
                    "store";
                    "{name}: attempt {}/{} failed: {e}",
                    attempt + 1,
                    policy.max_attempts
                );
                last_error = Some(e);
            }
        }
    }

    // max_attempts >= 1, so at least one attempt ran.
    Err(last_error.expect("retry ran zero attempts"))
}
