//! Retry policies.
//!
//! This module groups the knobs that control **whether** a failed poll is retried
//! and **how long** to wait first.
//!
//! ## Contents
//! - [`RetryPolicy`] ceiling on consecutive automatic retries
//! - [`BackoffPolicy`] how retry delays evolve (first / factor / max + jitter)
//! - [`JitterPolicy`]  optional randomization of the delay
//!
//! ## Quick wiring
//! ```text
//! Config { retry: RetryPolicy { backoff, max_retries }, .. }
//!      └─► controller::RetryState::on_failure uses:
//!           - retry.decide(attempt) to arm the next poll or go Terminal
//! ```
//!
//! ## Defaults
//! - `BackoffPolicy::default()` → first=1s, factor=2, max=30s, jitter=None.
//! - `RetryPolicy::default()` → 5 automatic retries.

mod backoff;
mod jitter;
mod retry;

pub use backoff::BackoffPolicy;
pub use jitter::JitterPolicy;
pub use retry::{RetryDecision, RetryPolicy};
