//! Minimum spacing between outbound requests.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

/// Enforces a minimum interval between consecutive [`Throttle::wait`] returns.
///
/// One throttle is owned by each [`crate::WoltClient`] and gates every
/// request it transmits, retries included. The lock is held across the
/// sleep so concurrent callers queue up instead of racing for the slot.
#[derive(Debug)]
pub struct Throttle {
    min_interval: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl Throttle {
    #[must_use]
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_request: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Suspends until at least `min_interval` has passed since the previous
    /// call returned. The first call returns immediately.
    pub async fn wait(&self) {
        let mut last = self.last_request.lock().await;
        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.min_interval {
                tokio::time::sleep(self.min_interval.saturating_sub(elapsed)).await;
            }
        }
        *last = Some(Instant::now());
    }
}

impl Default for Throttle {
    fn default() -> Self {
        Self::new(Duration::from_millis(500))
    }
}
