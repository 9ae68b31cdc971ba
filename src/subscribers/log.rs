//! # LogWriter: events as tracing records
//!
//! Turns each [`Event`] into one `tracing` record with structured fields.
//!
//! ## Example output (compact formatter)
//! ```text
//! INFO  poll starting endpoint="https://api.lanyard.rest/v1/users/1010166973973405727" failures=0
//! WARN  poll failed failures=1 label="poll_http_status" err="HTTP error! status: 500"
//! INFO  retry scheduled failures=1 delay_ms=2000
//! ERROR retries exhausted failures=6 err="HTTP error! status: 500"
//! ```

use async_trait::async_trait;
use tracing::{debug, error, info, warn};

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Logging subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let source = e.source.as_deref().unwrap_or("-");
        let reason = e.reason.as_deref().unwrap_or("-");

        match e.kind {
            EventKind::PollStarting => {
                info!(endpoint = source, failures = e.attempt, "poll starting");
            }
            EventKind::PollSucceeded => {
                info!(endpoint = source, "presence updated");
            }
            EventKind::PollFailed => {
                warn!(
                    failures = e.attempt,
                    label = e.label,
                    err = reason,
                    "poll failed"
                );
            }
            EventKind::RetryScheduled => {
                info!(failures = e.attempt, delay_ms = e.delay_ms, "retry scheduled");
            }
            EventKind::RetriesExhausted => {
                error!(failures = e.attempt, err = reason, "retries exhausted");
            }
            EventKind::PendingCancelled => {
                debug!(by = reason, "pending poll cancelled");
            }
            EventKind::ManualRetry => {
                info!(delay_ms = e.delay_ms, "manual retry initiated");
            }
            EventKind::RenderFailed => {
                warn!(err = reason, "render failed");
            }
            EventKind::TickSkipped => {
                debug!("driver tick skipped, poll already queued");
            }
            EventKind::ControllerStopped => {
                info!("controller stopped");
            }
            EventKind::SubscriberOverflow => {
                warn!(subscriber = source, reason, "subscriber dropped an event");
            }
            EventKind::SubscriberPanicked => {
                error!(subscriber = source, info = reason, "subscriber panicked");
            }
        }
    }

    fn name(&self) -> &'static str {
        "log"
    }
}
