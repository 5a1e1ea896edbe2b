//! Pacing between successive item fetches
//!
//! The pipelines are strictly sequential; the only scheduling concern is the
//! courtesy pause inserted between items. It is a static delay, not adaptive backoff.

use std::time::Duration;

/// Strategy deciding how long to pause between items
pub trait RateLimitPolicy: Send + Sync {
    /// Pause to apply after an item has been handled
    fn delay(&self) -> Duration;
}

/// Always waits the same amount of time
#[derive(Debug, Clone, Copy)]
pub struct FixedDelay(pub Duration);

impl FixedDelay {
    pub fn from_millis(ms: u64) -> Self {
        Self(Duration::from_millis(ms))
    }
}

impl RateLimitPolicy for FixedDelay {
    fn delay(&self) -> Duration {
        self.0
    }
}

/// Never waits; used by tests and dry runs
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDelay;

impl RateLimitPolicy for NoDelay {
    fn delay(&self) -> Duration {
        Duration::ZERO
    }
}

/// Sleeps for the policy's delay, skipping the timer entirely when it is zero
pub async fn pause(policy: &dyn RateLimitPolicy) {
    let delay = policy.delay();
    if !delay.is_zero() {
        tracing::trace!("Pausing {}ms before next item", delay.as_millis());
        tokio::time::sleep(delay).await;
    }
}
