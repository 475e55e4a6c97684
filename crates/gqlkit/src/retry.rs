//! Retry logic with exponential backoff for transient transport errors.
//!
//! Retries happen inside the transport only. Callers above the transport see
//! one logical request per call.

use crate::context::RequestContext;
use crate::error::{Error, Result};
use std::thread;
use std::time::Duration;

/// Longest stretch slept between cancellation checks during backoff.
const SLEEP_SLICE: Duration = Duration::from_millis(100);

/// Retry configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Total attempts including the first one.
    pub max_attempts: u32,
    /// Delay before the first retry.
    pub base_delay: Duration,
    /// Multiplier applied per attempt.
    pub backoff_factor: f64,
    /// Upper bound for any single delay.
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
            backoff_factor: 2.0,
            max_delay: Duration::from_secs(10),
        }
    }
}

impl RetryConfig {
    /// A configuration that never retries.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Delay to wait after the zero-indexed `attempt` failed.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let factor = self.backoff_factor.powi(attempt as i32);
        let millis = (self.base_delay.as_millis() as f64 * factor).min(u64::MAX as f64) as u64;
        Duration::from_millis(millis).min(self.max_delay)
    }
}

/// Callback trait for retry progress notifications.
pub trait RetryCallback {
    /// Called when an operation is being retried.
    ///
    /// # Arguments
    /// * `attempt` - Attempt that just failed (1-indexed)
    /// * `max_attempts` - Maximum number of attempts
    /// * `error` - The error that triggered the retry
    /// * `delay` - Time until the next attempt
    fn on_retry(&self, attempt: u32, max_attempts: u32, error: &Error, delay: Duration);
}

/// Callback that logs retries at `warn`.
pub struct LogCallback;

impl RetryCallback for LogCallback {
    fn on_retry(&self, attempt: u32, max_attempts: u32, error: &Error, delay: Duration) {
        log::warn!(
            "Attempt {attempt}/{max_attempts} failed: {error}. Retrying in {}ms...",
            delay.as_millis()
        );
    }
}

/// Sleep for `delay`, waking every [`SLEEP_SLICE`] to observe cancellation.
fn sleep_cancellable(ctx: &RequestContext, delay: Duration) -> Result<()> {
    let mut left = delay;
    while !left.is_zero() {
        ctx.check()?;
        let step = left.min(SLEEP_SLICE);
        thread::sleep(step);
        left -= step;
    }
    Ok(())
}

/// Execute an operation with retry logic.
///
/// Retries only errors for which [`Error::is_retryable`] holds. Never sleeps
/// past the context deadline and stops as soon as the context is cancelled.
pub fn with_retry<T, F>(
    config: &RetryConfig,
    ctx: &RequestContext,
    callback: Option<&dyn RetryCallback>,
    mut operation: F,
) -> Result<T>
where
    F: FnMut() -> Result<T>,
{
    let mut last_error: Option<Error> = None;

    for attempt in 0..config.max_attempts.max(1) {
        ctx.check()?;

        match operation() {
            Ok(result) => return Ok(result),
            Err(e) => {
                if !e.is_retryable() || attempt + 1 >= config.max_attempts {
                    return Err(e);
                }

                let delay = config.delay_for_attempt(attempt);
                if ctx.remaining().is_some_and(|left| left <= delay) {
                    return Err(e);
                }

                if let Some(cb) = callback {
                    cb.on_retry(attempt + 1, config.max_attempts, &e, delay);
                }

                sleep_cancellable(ctx, delay)?;
                last_error = Some(e);
            }
        }
    }

    Err(last_error.unwrap_or_else(|| Error::Other("retry exhausted".to_string())))
}
