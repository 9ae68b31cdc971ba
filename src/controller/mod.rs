//! # Poll controller.
//!
//! - [`PollController`] owns the retry state and performs polls on one task
//! - [`ControllerHandle`] sends commands to it and observes its [`Phase`]
//! - [`IntervalDriver`] requests a poll every `poll_interval`
//!
//! ```text
//! IntervalDriver ──try_poll──► ┌──────────────────────┐ ──fetch──► PresenceSource
//! user ──manual_retry/poll───► │ PollController task  │ ──notify─► Render
//!                              │  RetryState, timer   │ ──events─► Bus
//!                              └──────────────────────┘
//! ```

mod core;
mod driver;
mod state;

pub use self::core::{retrying_notice, terminal_notice, ControllerHandle, PollController, RECONNECTING};
pub use driver::IntervalDriver;
pub use state::{Phase, RetryState};
