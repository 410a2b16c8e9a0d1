//! Explicit retry policy for E-utilities requests
//!
//! The default policy performs no retries: a failed request aborts the run.
//! Raising `ClientConfig::max_retries` retries transient failures only, at a
//! fixed interval.

use std::future::Future;
use std::time::Duration;

use tokio_retry::RetryIf;
use tokio_retry::strategy::FixedInterval;
use tracing::{debug, warn};

/// Delay between two attempts when retries are enabled
pub const RETRY_INTERVAL: Duration = Duration::from_millis(500);

/// Errors that can tell whether repeating the request may succeed
pub trait RetryableError {
    /// Whether the failure is transient (timeouts, connection errors, 429, 5xx)
    fn is_retryable(&self) -> bool;

    /// Short human-readable reason, used in logs
    fn retry_reason(&self) -> &str;
}

/// Run `operation`, retrying transient failures up to `max_retries` times
///
/// With `max_retries == 0` the operation runs exactly once.
pub async fn with_retry<F, Fut, T, E>(operation: F, max_retries: usize, label: &str) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: RetryableError + std::fmt::Display,
{
    let strategy = FixedInterval::new(RETRY_INTERVAL).take(max_retries);

    let condition = |err: &E| {
        if err.is_retryable() {
            warn!(
                operation = label,
                reason = err.retry_reason(),
                error = %err,
                "Request failed, retrying"
            );
            true
        } else {
            debug!(operation = label, error = %err, "Request failed, not retryable");
            false
        }
    };

    RetryIf::start(strategy, operation, condition).await
}
