//! Request pacing and retry utilities for catalog providers.
//!
//! [`RateLimiter`] enforces a minimum interval between the *starts* of
//! consecutive provider calls. It is an owned value: the pipeline holds the
//! only instance for a run and passes `&mut` to it before every batch, so the
//! read-then-write of the last start time cannot race.
//!
//! [`retry_with_backoff`] retries transient failures of idempotent GET calls
//! with exponential backoff and jitter. The signed POST call never goes
//! through it.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;

use crate::error::CatalogError;

#[derive(Debug)]
pub struct RateLimiter {
    interval: Duration,
    last_start: Option<Instant>,
}

impl RateLimiter {
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_start: None,
        }
    }

    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Waits until at least `interval` has passed since the previous
    /// acquisition, then records now as the new start time.
    ///
    /// Returns how long the caller was suspended.
    pub async fn acquire(&mut self) -> Duration {
        let mut waited = Duration::ZERO;

        if let Some(previous) = self.last_start {
            let elapsed = previous.elapsed();
            if elapsed < self.interval {
                waited = self.interval - elapsed;
                tracing::debug!(
                    wait_ms = u64::try_from(waited.as_millis()).unwrap_or(u64::MAX),
                    "rate limiter holding next request"
                );
                tokio::time::sleep(waited).await;
            }
        }

        self.last_start = Some(Instant::now());
        waited
    }
}

/// Returns `true` for errors worth retrying after a back-off delay.
///
/// **Retriable:** timeouts, connection failures, HTTP 429 and 5xx.
///
/// **Not retriable:** other 4xx (bad key, bad request), undecodable bodies,
/// endpoint and signing errors.
pub(crate) fn is_retriable(err: &CatalogError) -> bool {
    match err {
        CatalogError::Http(e) => e.is_timeout() || e.is_connect(),
        CatalogError::Provider { status, .. } => *status == 429 || *status >= 500,
        CatalogError::Deserialize { .. }
        | CatalogError::InvalidEndpoint { .. }
        | CatalogError::Signing(_) => false,
    }
}

/// Longest pause between two attempts of one call.
const MAX_BACKOFF: Duration = Duration::from_secs(60);

/// Pause before retry `retry` (1-based): the base doubled per earlier retry,
/// scaled by `jitter` (expected in `0.75..=1.25`), capped at [`MAX_BACKOFF`].
fn backoff_delay(retry: u32, backoff_base_ms: u64, jitter: f64) -> Duration {
    let doublings = retry.saturating_sub(1).min(10);
    let nominal = Duration::from_millis(backoff_base_ms.saturating_mul(1 << doublings));
    nominal.mul_f64(jitter).min(MAX_BACKOFF)
}

/// Runs one provider call, repeating it up to `max_retries` more times
/// while it fails with a transient error.
///
/// The keyed client passes a 2 s base, so its retries wait about 2 s, 4 s,
/// 8 s and so on, each within ±25 % and never beyond 60 s. The whole
/// sequence runs inside the caller's rate-limiter slot.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, CatalogError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, CatalogError>>,
{
    let mut retry = 0u32;
    let err = loop {
        let err = match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };
        if retry == max_retries || !is_retriable(&err) {
            break err;
        }
        retry += 1;

        let delay = backoff_delay(retry, backoff_base_ms, rand::random_range(0.75..=1.25));
        tracing::warn!(
            retry,
            max_retries,
            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            error = %err,
            "transient provider error, backing off"
        );
        tokio::time::sleep(delay).await;
    };
    Err(err)
}
