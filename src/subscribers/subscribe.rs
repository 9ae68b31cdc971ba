//! # Event subscriber trait.
//!
//! [`Subscribe`] is the extension point for observing the poller: logging,
//! metrics, alerting. Each subscriber gets its own worker task and bounded queue
//! inside [`SubscriberSet`](crate::SubscriberSet), so a slow or panicking
//! subscriber never delays the controller.
//!
//! ## Example
//! ```rust
//! use async_trait::async_trait;
//! use presencewatch::{Event, EventKind, Subscribe};
//!
//! struct FailureCounter;
//!
//! #[async_trait]
//! impl Subscribe for FailureCounter {
//!     async fn on_event(&self, ev: &Event) {
//!         if matches!(ev.kind, EventKind::PollFailed) {
//!             // bump a counter
//!         }
//!     }
//!
//!     fn name(&self) -> &'static str { "failures" }
//! }
//! ```

use async_trait::async_trait;

use crate::events::Event;

/// Event subscriber.
///
/// ### Implementation requirements
/// - Use async I/O; avoid blocking the executor.
/// - Handle errors internally; do not panic.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Processes one event. Events arrive in publish order per subscriber.
    async fn on_event(&self, event: &Event);

    /// Name used in overflow/panic events.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Preferred queue capacity (clamped to at least 1). Default: 256.
    fn queue_capacity(&self) -> usize {
        256
    }
}
