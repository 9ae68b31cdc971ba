//! # Events emitted by the poll controller and its driver.
//!
//! [`EventKind`] classifies what happened; [`Event`] carries the metadata
//! (attempt number, delay, reason, error label).
//!
//! ## Ordering guarantees
//! Each event has a process-wide sequence number (`seq`) that increases
//! monotonically. Use it to restore order when subscribers see events late.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use presencewatch::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::RetryScheduled)
//!     .with_attempt(1)
//!     .with_delay(Duration::from_secs(2))
//!     .with_reason("HTTP error! status: 500");
//!
//! assert_eq!(ev.kind, EventKind::RetryScheduled);
//! assert_eq!(ev.delay_ms, Some(2_000));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Poll lifecycle ===
    /// A request is about to be sent.
    ///
    /// Sets:
    /// - `source`: endpoint
    /// - `attempt`: consecutive failures so far
    PollStarting,

    /// The payload reported success and was handed to the renderer.
    ///
    /// Sets:
    /// - `source`: endpoint
    PollSucceeded,

    /// The poll failed.
    ///
    /// Sets:
    /// - `source`: endpoint
    /// - `attempt`: consecutive failures including this one
    /// - `reason`: failure message
    /// - `label`: `PollError::as_label`
    PollFailed,

    /// A retry poll was armed after a failure.
    ///
    /// Sets:
    /// - `attempt`: consecutive failures
    /// - `delay_ms`: wait before the retry
    /// - `reason`: failure message
    RetryScheduled,

    /// The retry ceiling was exceeded; no poll is armed.
    ///
    /// Sets:
    /// - `attempt`: consecutive failures
    /// - `reason`: last failure message
    RetriesExhausted,

    /// A pending poll was dropped before it fired.
    ///
    /// Sets:
    /// - `reason`: `"success"`, `"failure"`, `"manual"` or `"dispose"`
    PendingCancelled,

    /// `manual_retry()` reset the counter and armed a poll.
    ///
    /// Sets:
    /// - `delay_ms`: wait before the poll
    ManualRetry,

    /// The renderer failed or panicked while showing a payload.
    ///
    /// Sets:
    /// - `reason`: render error
    RenderFailed,

    // === Driver ===
    /// A driver tick found a poll already queued and was dropped.
    TickSkipped,

    /// The controller task exited.
    ControllerStopped,

    // === Subscriber events ===
    /// Subscriber panicked during event processing.
    ///
    /// Sets:
    /// - `source`: subscriber name
    /// - `reason`: panic info
    SubscriberPanicked,

    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets:
    /// - `source`: subscriber name
    /// - `reason`: `"full"` or `"closed"`
    SubscriberOverflow,
}

/// Runtime event with optional metadata.
#[derive(Clone, Debug)]
pub struct Event {
    /// Process-wide, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Endpoint or subscriber name.
    pub source: Option<Arc<str>>,
    /// Consecutive failure count.
    pub attempt: Option<u32>,
    /// Delay before the next poll in milliseconds.
    pub delay_ms: Option<u32>,
    /// Human-readable reason (errors, overflow details, etc.).
    pub reason: Option<Arc<str>>,
    /// Stable error label.
    pub label: Option<&'static str>,
}

impl Event {
    /// Creates an event with the current timestamp and the next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            source: None,
            attempt: None,
            delay_ms: None,
            reason: None,
            label: None,
        }
    }

    #[inline]
    pub fn with_source(mut self, source: impl Into<Arc<str>>) -> Self {
        self.source = Some(source.into());
        self
    }

    #[inline]
    pub fn with_attempt(mut self, n: u32) -> Self {
        self.attempt = Some(n);
        self
    }

    /// Attaches a delay (stored as milliseconds, saturating at `u32::MAX`).
    #[inline]
    pub fn with_delay(mut self, d: Duration) -> Self {
        self.delay_ms = Some(d.as_millis().min(u128::from(u32::MAX)) as u32);
        self
    }

    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    #[inline]
    pub fn with_label(mut self, label: &'static str) -> Self {
        self.label = Some(label);
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_source(subscriber)
            .with_reason(reason)
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_source(subscriber)
            .with_reason(info)
    }

    /// True for events produced by the subscriber machinery itself.
    #[inline]
    pub fn is_subscriber_internal(&self) -> bool {
        matches!(
            self.kind,
            EventKind::SubscriberOverflow | EventKind::SubscriberPanicked
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_is_monotonic() {
        let a = Event::new(EventKind::PollStarting);
        let b = Event::new(EventKind::PollSucceeded);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn test_source_names_origin() {
        let ev = Event::new(EventKind::PollStarting).with_source("https://example.test/v1/users/1");
        assert_eq!(ev.source.as_deref(), Some("https://example.test/v1/users/1"));
        assert_eq!(Event::subscriber_overflow("log", "full").source.as_deref(), Some("log"));
    }

    #[test]
    fn test_delay_saturates() {
        let ev = Event::new(EventKind::RetryScheduled).with_delay(Duration::from_secs(u64::MAX));
        assert_eq!(ev.delay_ms, Some(u32::MAX));
    }
}
