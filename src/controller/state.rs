//! # Retry state and observable phase.
//!
//! [`RetryState`] is the controller's only mutable state: the consecutive-failure
//! count and the single pending poll. Every transition replaces or clears the
//! pending poll, so two pending polls can never coexist.
//!
//! ```text
//!            on_success             on_failure (n ≤ max)          on_failure (n > max)
//! count  ─►  0                      n + 1                         n + 1
//! pending ─► None                   Some(now + backoff(n+1))      None
//!
//!            on_manual_retry
//! count  ─►  0
//! pending ─► Some(now + manual_delay)
//! ```

use std::time::Duration;

use tokio::time::Instant;

use crate::policies::{RetryDecision, RetryPolicy};

/// Observable controller phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Nothing pending; waiting for the next external poll.
    Idle,
    /// A request is in flight.
    Polling,
    /// A poll is pending after `delay`. `attempt` is the consecutive-failure count
    /// (0 after a manual retry).
    Backoff { attempt: u32, delay: Duration },
    /// Retries exhausted; only an external poll or a manual retry moves on.
    Terminal { attempt: u32 },
}

/// Consecutive failures plus the deadline of the pending poll.
#[derive(Debug, Default)]
pub struct RetryState {
    attempt_count: u32,
    pending: Option<Instant>,
}

impl RetryState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consecutive failures since the last success or manual retry.
    pub fn attempt_count(&self) -> u32 {
        self.attempt_count
    }

    /// Deadline of the pending poll, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending
    }

    /// Removes the pending poll. Returns `true` if there was one.
    pub fn cancel_pending(&mut self) -> bool {
        self.pending.take().is_some()
    }

    /// Resets after a successful poll. Returns `true` if a pending poll was cancelled.
    pub fn on_success(&mut self) -> bool {
        self.attempt_count = 0;
        self.cancel_pending()
    }

    /// Records a failed poll at `now` and arms the retry the policy allows.
    ///
    /// Returns the decision and whether an older pending poll was cancelled.
    pub fn on_failure(&mut self, policy: &RetryPolicy, now: Instant) -> (RetryDecision, bool) {
        let cancelled = self.cancel_pending();
        self.attempt_count = self.attempt_count.saturating_add(1);

        let decision = policy.decide(self.attempt_count);
        if let RetryDecision::Retry { delay, .. } = decision {
            self.pending = Some(now + delay);
        }
        (decision, cancelled)
    }

    /// Resets the counter and arms a poll `delay` after `now`.
    ///
    /// Returns `true` if an older pending poll was cancelled.
    pub fn on_manual_retry(&mut self, delay: Duration, now: Instant) -> bool {
        let cancelled = self.cancel_pending();
        self.attempt_count = 0;
        self.pending = Some(now + delay);
        cancelled
    }
}
