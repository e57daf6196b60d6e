//! Retry policy with exponential backoff for per-record dispatch

use std::time::Duration;

/// Status codes treated as transient: edit conflict, unavailable, gateway timeout.
pub const RETRYABLE_STATUSES: [u16; 3] = [409, 503, 504];

/// Attempt budget and backoff base. Read-only once a run starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first one
    pub max_attempts: u32,
    /// Delay after the first failed attempt; doubles on each subsequent one
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    /// Exponential backoff: `base_delay * 2^attempt` (1s, 2s, 4s, ... by
    /// default) before the attempt that follows `attempt` (0-indexed).
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(2u32.saturating_pow(attempt))
    }

    /// Whether another attempt is allowed after `attempt` (0-indexed) failed.
    pub fn has_attempts_left(&self, attempt: u32) -> bool {
        attempt + 1 < self.max_attempts
    }

    pub fn is_retryable_status(status: u16) -> bool {
        RETRYABLE_STATUSES.contains(&status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_backoff_exponential() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 5);
        let delays: Vec<Duration> = (0..4).map(|a| policy.delay_after(a)).collect();
        assert_eq!(delays, [1, 2, 4, 8].map(Duration::from_secs));
    }

    #[test]
    fn huge_attempt_saturates() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_after(64), policy.delay_after(200));
        assert!(policy.delay_after(64) >= Duration::from_secs(u32::MAX as u64));
    }

    #[test]
    fn scaled_base_delay() {
        let policy = RetryPolicy::new(3, Duration::from_millis(10));
        assert_eq!(policy.delay_after(0), Duration::from_millis(10));
        assert_eq!(policy.delay_after(2), Duration::from_millis(40));
    }

    #[test]
    fn attempts_left() {
        let policy = RetryPolicy::default();
        assert!(policy.has_attempts_left(0));
        assert!(policy.has_attempts_left(3));
        assert!(!policy.has_attempts_left(4));
    }

    #[test]
    fn zero_attempts_clamped_to_one() {
        let policy = RetryPolicy::new(0, Duration::from_secs(1));
        assert_eq!(policy.max_attempts, 1);
        assert!(!policy.has_attempts_left(0));
    }

    #[test]
    fn retryable_statuses() {
        assert!(RetryPolicy::is_retryable_status(409));
        assert!(RetryPolicy::is_retryable_status(503));
        assert!(RetryPolicy::is_retryable_status(504));
        assert!(!RetryPolicy::is_retryable_status(400));
        assert!(!RetryPolicy::is_retryable_status(429));
        assert!(!RetryPolicy::is_retryable_status(500));
    }
}
