//! Exponential backoff with full jitter for generation attempts.

use rand::Rng;
use std::time::Duration;

/// Backoff schedule: the window doubles from `base_delay_ms` per attempt up
/// to `max_delay_ms`, and the actual sleep is drawn uniformly from
/// `0..=window` (full jitter).
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            base_delay_ms: 1_000,
            max_delay_ms: 30_000,
        }
    }
}

impl RetryPolicy {
    pub const fn new(base_delay_ms: u64, max_delay_ms: u64) -> Self {
        Self {
            base_delay_ms,
            max_delay_ms,
        }
    }

    /// Upper bound of the jitter window for a 0-indexed attempt.
    pub fn backoff_window(&self, attempt: u32) -> Duration {
        let window_ms = self
            .base_delay_ms
            .saturating_mul(2_u64.saturating_pow(attempt))
            .min(self.max_delay_ms);
        Duration::from_millis(window_ms)
    }

    /// Sleep duration for a 0-indexed attempt: uniform over the window.
    pub fn jittered_delay(&self, attempt: u32) -> Duration {
        let window = self.backoff_window(attempt);
        let window_ms = u64::try_from(window.as_millis()).unwrap_or(self.max_delay_ms);
        Duration::from_millis(rand::thread_rng().gen_range(0..=window_ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_doubles_and_caps() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff_window(0), Duration::from_millis(1_000));
        assert_eq!(policy.backoff_window(1), Duration::from_millis(2_000));
        assert_eq!(policy.backoff_window(2), Duration::from_millis(4_000));
        assert_eq!(policy.backoff_window(4), Duration::from_millis(16_000));
        assert_eq!(policy.backoff_window(5), Duration::from_millis(30_000));
        assert_eq!(policy.backoff_window(20), Duration::from_millis(30_000));
    }

    #[test]
    fn jitter_stays_within_the_window() {
        let policy = RetryPolicy::default();
        for attempt in 0..6 {
            for _ in 0..50 {
                assert!(policy.jittered_delay(attempt) <= policy.backoff_window(attempt));
            }
        }
    }
}
