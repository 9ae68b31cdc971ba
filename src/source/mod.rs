//! # Presence sources.
//!
//! A [`PresenceSource`] performs exactly one request per [`fetch`](PresenceSource::fetch)
//! and classifies the outcome:
//!
//! ```text
//! fetch()
//!   ├─ no response         ─► Err(PollError::Transport)
//!   ├─ status outside 2xx  ─► Err(PollError::HttpStatus)
//!   ├─ body not a payload  ─► Err(PollError::Decode)
//!   └─ payload             ─► Ok(PresencePayload)   (success flag unchecked)
//! ```
//!
//! The `success` flag is left to the controller, which owns the
//! `PollError::Application` case.

mod lanyard;
mod payload;

use async_trait::async_trait;

use crate::error::PollError;

pub use lanyard::LanyardClient;
pub use payload::PresencePayload;

/// One-shot presence fetcher.
#[async_trait]
pub trait PresenceSource: Send + Sync + 'static {
    /// URL (or other identifier) the source reads from; used in events.
    fn endpoint(&self) -> &str;

    /// Performs one request.
    async fn fetch(&self) -> Result<PresencePayload, PollError>;
}
