use crate::error::ProviderError;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Shared flag that tells region workers to stop at their next provider call.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Bounded exponential backoff for transient provider errors.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first one. Values below 1 behave as 1.
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    /// Retries without sleeping.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    /// Delay before retry number `retry` (1-based): `base * 2^(retry-1)`, capped.
    pub fn delay_for(&self, retry: u32) -> Duration {
        let factor = 1u32 << retry.saturating_sub(1).min(16);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }
}

const SLEEP_SLICE: Duration = Duration::from_millis(25);

/// Run `op`, retrying transient errors according to `policy`.
///
/// Non-transient errors return immediately. Cancellation is checked before every attempt and
/// while waiting between attempts.
pub fn with_retry<T>(
    policy: &RetryPolicy,
    cancel: &CancelToken,
    what: &str,
    mut op: impl FnMut() -> Result<T, ProviderError>,
) -> Result<T, ProviderError> {
    let attempts = policy.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        if cancel.is_cancelled() {
            return Err(ProviderError::Cancelled);
        }

        match op() {
            Ok(v) => return Ok(v),
            Err(err) if err.is_transient() && attempt < attempts => {
                let delay = policy.delay_for(attempt);
                tracing::debug!(
                    call = what,
                    attempt,
                    max_attempts = attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "transient provider error; backing off"
                );
                sleep_unless_cancelled(delay, cancel);
                attempt += 1;
            }
            Err(err) => {
                if err.is_transient() {
                    tracing::warn!(call = what, attempts, error = %err, "retries exhausted");
                }
                return Err(err);
            }
        }
    }
}

fn sleep_unless_cancelled(delay: Duration, cancel: &CancelToken) {
    let mut remaining = delay;
    while !remaining.is_zero() && !cancel.is_cancelled() {
        let slice = remaining.min(SLEEP_SLICE);
        std::thread::sleep(slice);
        remaining -= slice;
    }
}
