//! # Retry ceiling.
//!
//! [`RetryPolicy`] pairs a [`BackoffPolicy`] with the number of automatic retries
//! allowed in a row. [`RetryPolicy::decide`] is the whole decision: given the
//! consecutive-failure count (already incremented for the failure at hand), retry
//! after a delay or give up.
//!
//! ```text
//! failures:  1    2    3    4     5     6
//! decision:  2s   4s   8s   16s   30s   GiveUp
//! ```

use std::time::Duration;

use crate::policies::backoff::BackoffPolicy;

/// Outcome of a failed poll.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RetryDecision {
    /// Poll again once `delay` has elapsed.
    Retry { attempt: u32, delay: Duration },
    /// Ceiling reached; nothing is scheduled.
    GiveUp { attempt: u32 },
}

/// Backoff schedule plus ceiling.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Delay schedule.
    pub backoff: BackoffPolicy,
    /// Consecutive failures that still get an automatic retry.
    pub max_retries: u32,
}

impl Default for RetryPolicy {
    /// Default backoff with `max_retries = 5`.
    fn default() -> Self {
        Self {
            backoff: BackoffPolicy::default(),
            max_retries: 5,
        }
    }
}

impl RetryPolicy {
    /// Decides what follows the `attempt`-th consecutive failure.
    pub fn decide(&self, attempt: u32) -> RetryDecision {
        if attempt <= self.max_retries {
            RetryDecision::Retry {
                attempt,
                delay: self.backoff.next(attempt),
            }
        } else {
            RetryDecision::GiveUp { attempt }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retries_until_ceiling() {
        let policy = RetryPolicy::default();
        for attempt in 1..=5 {
            assert!(matches!(
                policy.decide(attempt),
                RetryDecision::Retry { attempt: a, .. } if a == attempt
            ));
        }
        assert_eq!(policy.decide(6), RetryDecision::GiveUp { attempt: 6 });
        assert_eq!(policy.decide(7), RetryDecision::GiveUp { attempt: 7 });
    }

    #[test]
    fn test_first_retry_waits_two_seconds() {
        assert_eq!(
            RetryPolicy::default().decide(1),
            RetryDecision::Retry {
                attempt: 1,
                delay: Duration::from_secs(2)
            }
        );
    }

    #[test]
    fn test_zero_ceiling_gives_up_immediately() {
        let policy = RetryPolicy {
            max_retries: 0,
            ..RetryPolicy::default()
        };
        assert_eq!(policy.decide(1), RetryDecision::GiveUp { attempt: 1 });
    }
}
