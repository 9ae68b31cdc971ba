//! Runtime events: types and broadcast bus.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `PollController`, `IntervalDriver`, `SubscriberSet` workers
//!   (overflow/panic).
//! - **Consumers**: the listener started by `SubscriberSet::listen`, which fans
//!   events out to every [`Subscribe`](crate::Subscribe) implementation.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
