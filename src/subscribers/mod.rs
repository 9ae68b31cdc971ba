//! # Event subscribers.
//!
//! - [`Subscribe`] trait for custom observers
//! - [`SubscriberSet`] per-subscriber queues, workers and the bus listener
//! - [`LogWriter`] built-in subscriber writing `tracing` records

mod log;
mod set;
mod subscribe;

pub use log::LogWriter;
pub use set::SubscriberSet;
pub use subscribe::Subscribe;
