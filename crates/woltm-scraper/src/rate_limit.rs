//! Retry with jittered back-off for transient request failures.
//!
//! Only transport-level failures are retried. Status, parse, and
//! missing-field errors describe the response itself and would repeat.

use std::future::Future;
use std::time::Duration;

use crate::error::FetchError;

/// Returns `true` if `err` is a transient condition worth one more attempt.
///
/// Retriable:
/// - [`FetchError::Network`]: connection reset, DNS blip, timeout.
///
/// Not retriable:
/// - [`FetchError::Http`]: the platform answered; the answer will not change.
/// - [`FetchError::Parse`]: the body is malformed; retrying won't fix it.
/// - [`FetchError::MissingField`]: record shape issue.
/// - [`FetchError::InvalidUrl`]: configuration problem.
pub(crate) fn is_retriable(err: &FetchError) -> bool {
    matches!(err, FetchError::Network { .. })
}

/// Runs `operation` with up to `max_retries` additional attempts on
/// transient errors.
///
/// The sleep before retry `n` is `backoff_base_ms × 2^(n-1)` ± 25 % jitter,
/// capped at 30 s. With the default of one retry and a 1 000 ms base, a
/// network blip costs roughly one second. Non-retriable errors are returned
/// immediately.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, FetchError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, FetchError>>,
{
    const MAX_DELAY_MS: u64 = 30_000;
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= max_retries {
                    return Err(err);
                }
                attempt += 1;
                let computed = backoff_base_ms.saturating_mul(1u64 << (attempt - 1).min(10));
                let capped = computed.min(MAX_DELAY_MS);
                #[allow(
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss,
                    clippy::cast_precision_loss
                )]
                let delay_ms = (capped as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;
                tracing::warn!(
                    attempt,
                    max_retries,
                    delay_ms,
                    error = %err,
                    "transient request error; retrying after back-off"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}
