//! Exponential reconnect backoff.

use std::time::Duration;

/// Computes the delay before reconnect attempt `k` as
/// `min(base * 2^k, max)`.
#[derive(Debug, Clone, Copy)]
pub struct BackoffPolicy {
    base_delay_ms: u64,
    max_delay_ms: u64,
}

impl BackoffPolicy {
    /// Creates a policy with the given floor and ceiling in ms.
    pub fn new(base_delay_ms: u64, max_delay_ms: u64) -> Self {
        Self {
            base_delay_ms,
            max_delay_ms,
        }
    }

    /// Delay before attempt `attempt` (zero-based).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        // Clamp the shift so large attempt counts cannot overflow.
        let shift = attempt.min(20);
        let multiplier = 1_u64 << shift;
        let delay = self
            .base_delay_ms
            .saturating_mul(multiplier)
            .min(self.max_delay_ms);
        Duration::from_millis(delay)
    }
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self::new(1_000, 30_000)
    }
}
