//! # Backoff policy for failed polls.
//!
//! [`BackoffPolicy`] turns a consecutive-failure count into the delay before the
//! next automatic poll. It is parameterized by:
//! - [`BackoffPolicy::first`] the unit delay (`attempt = 0`);
//! - [`BackoffPolicy::factor`] the integer growth factor;
//! - [`BackoffPolicy::max`] the cap.
//!
//! The delay for failure `n` is `first × factor^n`, clamped to `max`, then jitter
//! is applied. Arithmetic is done in whole milliseconds and saturates, so very large
//! failure counts land on `max` instead of overflowing.
//!
//! # Example
//! ```rust
//! use std::time::Duration;
//! use presencewatch::{BackoffPolicy, JitterPolicy};
//!
//! let backoff = BackoffPolicy::default();
//!
//! // First failure: 1s × 2^1
//! assert_eq!(backoff.next(1), Duration::from_secs(2));
//!
//! // Fifth failure: 1s × 2^5 = 32s, capped at 30s
//! assert_eq!(backoff.next(5), Duration::from_secs(30));
//! ```

use std::time::Duration;

use crate::policies::jitter::JitterPolicy;

/// Exponential backoff with a cap.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BackoffPolicy {
    /// Delay for `attempt = 0`; every later delay is a multiple of it.
    pub first: Duration,
    /// Multiplicative growth per failure (`2` doubles the delay each time).
    pub factor: u32,
    /// Upper bound applied before jitter.
    pub max: Duration,
    /// Randomization applied to the capped delay.
    pub jitter: JitterPolicy,
}

impl Default for BackoffPolicy {
    /// Returns the presence polling schedule:
    /// - `first = 1s`;
    /// - `factor = 2`;
    /// - `max = 30s`;
    /// - `jitter = None`.
    ///
    /// Failures 1..=5 therefore wait 2s, 4s, 8s, 16s and 30s.
    fn default() -> Self {
        Self {
            first: Duration::from_secs(1),
            factor: 2,
            max: Duration::from_secs(30),
            jitter: JitterPolicy::None,
        }
    }
}

impl BackoffPolicy {
    /// Returns the capped delay for `attempt` before jitter.
    pub fn base(&self, attempt: u32) -> Duration {
        let max_ms = duration_ms(self.max);
        let first_ms = duration_ms(self.first);

        let ms = u64::from(self.factor)
            .checked_pow(attempt)
            .and_then(|growth| first_ms.checked_mul(growth))
            .map_or(max_ms, |ms| ms.min(max_ms));

        Duration::from_millis(ms)
    }

    /// Returns the delay to wait after the `attempt`-th consecutive failure.
    ///
    /// The base is derived from `attempt` alone; jitter output never feeds back
    /// into later delays.
    pub fn next(&self, attempt: u32) -> Duration {
        self.jitter.apply(self.base(attempt))
    }
}

fn duration_ms(d: Duration) -> u64 {
    d.as_millis().min(u128::from(u64::MAX)) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_schedule_matches_poll_retries() {
        let policy = BackoffPolicy::default();

        assert_eq!(policy.next(1), Duration::from_millis(2_000));
        assert_eq!(policy.next(2), Duration::from_millis(4_000));
        assert_eq!(policy.next(3), Duration::from_millis(8_000));
        assert_eq!(policy.next(4), Duration::from_millis(16_000));
        assert_eq!(policy.next(5), Duration::from_millis(30_000));
    }

    #[test]
    fn test_attempt_zero_returns_first() {
        let policy = BackoffPolicy::default();
        assert_eq!(policy.next(0), Duration::from_secs(1));
    }

    #[test]
    fn test_cap_reached_before_exponent_exceeds_it() {
        let policy = BackoffPolicy::default();
        for attempt in 5..40 {
            assert_eq!(
                policy.next(attempt),
                Duration::from_secs(30),
                "attempt {attempt} should be capped"
            );
        }
    }

    #[test]
    fn test_constant_factor() {
        let policy = BackoffPolicy {
            first: Duration::from_millis(500),
            factor: 1,
            ..BackoffPolicy::default()
        };
        for attempt in 0..10 {
            assert_eq!(policy.next(attempt), Duration::from_millis(500));
        }
    }

    #[test]
    fn test_first_exceeds_max() {
        let policy = BackoffPolicy {
            first: Duration::from_secs(10),
            max: Duration::from_secs(5),
            ..BackoffPolicy::default()
        };
        assert_eq!(policy.next(0), Duration::from_secs(5));
    }

    #[test]
    fn test_overflow_saturates_to_max() {
        let policy = BackoffPolicy {
            max: Duration::from_secs(10),
            ..BackoffPolicy::default()
        };
        assert_eq!(policy.next(u32::MAX), Duration::from_secs(10));
    }

    #[test]
    fn test_equal_jitter_stays_within_half_and_base() {
        let policy = BackoffPolicy {
            jitter: JitterPolicy::Equal,
            ..BackoffPolicy::default()
        };
        for attempt in 1..=5 {
            let base = policy.base(attempt);
            let delay = policy.next(attempt);
            assert!(delay >= base / 2, "attempt {attempt}: {delay:?} < half of {base:?}");
            assert!(delay <= base, "attempt {attempt}: {delay:?} > {base:?}");
        }
    }
}
