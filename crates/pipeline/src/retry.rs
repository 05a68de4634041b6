//! Bounded retry of allocate-and-insert units.
//!
//! Each attempt runs a whole transaction. Storage conflicts (serialization
//! failures, deadlocks, lost revision races) are retried with exponential
//! backoff; anything else returns immediately. Once the attempts are spent
//! the caller sees [`CoreError::AllocationConflict`].

use std::fmt::Display;
use std::future::Future;

use kinetrack_core::error::CoreError;
use kinetrack_core::revision::RetryPolicy;

/// Run `attempt` until it succeeds, fails with a non-retryable error, or
/// `policy.max_attempts` is reached.
pub async fn with_allocation_retry<T, E, F, Fut>(
    policy: &RetryPolicy,
    operation: &'static str,
    is_retryable: impl Fn(&E) -> bool,
    mut attempt: F,
) -> Result<T, E>
where
    E: From<CoreError> + Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut tries = 1;
    loop {
        match attempt().await {
            Ok(value) => return Ok(value),
            Err(err) if is_retryable(&err) => {
                if tries >= max_attempts {
                    tracing::error!(
                        operation,
                        attempts = tries,
                        error = %err,
                        "Allocation conflict persisted after all retries"
                    );
                    return Err(CoreError::AllocationConflict { attempts: tries }.into());
                }
                let delay = policy.delay_after(tries);
                tracing::warn!(
                    operation,
                    attempt = tries,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "Allocation conflict, retrying"
                );
                tokio::time::sleep(delay).await;
                tries += 1;
            }
            Err(err) => return Err(err),
        }
    }
}
