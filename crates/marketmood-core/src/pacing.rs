//! Minimum inter-call spacing against the upstream providers.

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use governor::clock::DefaultClock;
use governor::state::direct::NotKeyed;
use governor::state::InMemoryState;
use governor::{Quota, RateLimiter};

type DirectRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Spaces sub-fetches by a minimum delay to stay under the free-tier quota.
///
/// All sub-fetches of a cycle go through one pacer, so calls against the
/// same provider are never issued in parallel bursts.
#[derive(Clone)]
pub struct CallPacer {
    limiter: Arc<DirectRateLimiter>,
    min_interval: Duration,
}

impl CallPacer {
    pub fn new(min_interval: Duration) -> Self {
        let quota = Quota::with_period(min_interval.max(Duration::from_millis(1)))
            .expect("pacer period is always non-zero")
            .allow_burst(NonZeroU32::new(1).expect("burst of one"));
        Self {
            limiter: Arc::new(RateLimiter::direct(quota)),
            min_interval,
        }
    }

    /// Waits until rate budget is available, then consumes one cell.
    pub async fn pace(&self) {
        while self.limiter.check().is_err() {
            tokio::time::sleep(self.min_interval).await;
        }
    }

    /// Non-blocking probe used by tests.
    pub fn try_acquire(&self) -> bool {
        self.limiter.check().is_ok()
    }
}
