/*!
 * Retry policy for rate-limited translation requests.
 *
 * The policy is plain data plus arithmetic. It decides how many attempts a
 * batch gets and how long to wait between them; the caller owns the actual
 * sleeping, which keeps the policy testable without a clock.
 */

use std::time::Duration;

/// Bounded exponential backoff
///
/// Attempt numbering is 1-based: `delay_for(1)` is the wait after the first
/// failed attempt. The delay doubles with each attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, the first try included
    max_attempts: u32,
    /// Wait after the first failed attempt
    base_delay: Duration,
}

impl RetryPolicy {
    /// Create a policy; at least one attempt is always allowed
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    /// Create a policy from a millisecond base
    pub fn from_millis(max_attempts: u32, base_delay_ms: u64) -> Self {
        Self::new(max_attempts, Duration::from_millis(base_delay_ms))
    }

    /// Total attempts this policy grants
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Whether another attempt may follow the given 1-based attempt
    pub fn allows_retry(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }

    /// Wait before the attempt after the given 1-based failed attempt
    pub fn delay_for(&self, attempt: u32) -> Duration {
        // Shift capped so a misconfigured attempt count cannot overflow
        let exponent = attempt.saturating_sub(1).min(16);
        self.base_delay * (1u32 << exponent)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(1))
    }
}
