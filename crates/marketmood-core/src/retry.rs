//! Retry backoff used by the fetcher's single-retry contract.

use std::time::Duration;

/// Backoff strategy between retry attempts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Backoff {
    /// Fixed delay between retries.
    Fixed {
        delay: Duration,
    },
    /// Exponential delay: `base * (factor ^ attempt)`, capped at `max`,
    /// with optional +/- 50% random jitter.
    Exponential {
        base: Duration,
        factor: f64,
        max: Duration,
        jitter: bool,
    },
}

impl Default for Backoff {
    fn default() -> Self {
        Self::Fixed {
            delay: Duration::from_millis(500),
        }
    }
}

impl Backoff {
    /// Delay for a 0-based retry attempt.
    pub fn delay(self, attempt: u32) -> Duration {
        match self {
            Self::Fixed { delay } => delay,
            Self::Exponential {
                base,
                factor,
                max,
                jitter,
            } => {
                let scale = factor.powi(attempt as i32);
                let seconds = base.as_secs_f64() * scale;
                let capped = seconds.min(max.as_secs_f64());
                let mut delay = Duration::from_secs_f64(capped);

                if jitter {
                    let jitter_ms = (delay.as_millis() as f64 * 0.5) as u64;
                    let offset = fastrand::u64(0..=(jitter_ms * 2));
                    let total_ms = delay.as_millis() as i64 + (offset as i64 - jitter_ms as i64);
                    delay = Duration::from_millis(total_ms.max(0) as u64);
                }

                delay
            }
        }
    }
}

/// Retry policy for upstream sub-fetches.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retries; total attempts = `max_retries + 1`.
    pub max_retries: u32,
    pub backoff: Backoff,
}

impl Default for RetryConfig {
    /// Each failing sub-fetch is retried exactly once after a short fixed
    /// backoff before the fetcher falls back to cached data.
    fn default() -> Self {
        Self {
            max_retries: 1,
            backoff: Backoff::default(),
        }
    }
}

impl RetryConfig {
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        self.backoff.delay(attempt)
    }
}
