//! # presencewatch
//!
//! **presencewatch** polls the [Lanyard](https://github.com/Phineas/lanyard)
//! presence API for one Discord user, renders the result as an HTML fragment
//! and recovers from failures with exponential backoff.
//!
//! ## Architecture
//! ```text
//!   IntervalDriver (every 30s)        user (retry button / stdin)
//!          │ try_poll                        │ manual_retry
//!          ▼                                 ▼
//! ┌───────────────────────────────────────────────────────────────┐
//! │  PollController (one task, owns RetryState + pending timer)   │
//! │    fetch ──► PresenceSource (LanyardClient, reqwest)          │
//! │    show  ──► Render (HtmlRenderer → watch::Receiver<String>)  │
//! └──────┬────────────────────────────────────────────────────────┘
//!        │ publish(Event)
//!        ▼
//! ┌───────────────────────────────────────────────────────────────┐
//! │                   Bus (broadcast channel)                     │
//! └───────────────────────────────┬───────────────────────────────┘
//!                                 ▼
//!                  SubscriberSet (per-subscriber queues)
//!                        ├─► LogWriter (tracing)
//!                        └─► your Subscribe impls
//! ```
//!
//! ### Retry schedule
//! ```text
//! failure #   1    2    3    4     5     6
//! next poll   2s   4s   8s   16s   30s   none (Terminal)
//! ```
//! A success resets the count. `manual_retry()` resets it too and polls after 1s,
//! from any phase.
//!
//! ## Features
//! | Area            | Description                                       | Key types                                 |
//! |-----------------|---------------------------------------------------|-------------------------------------------|
//! | **Controller**  | Fetch, classify, retry with backoff, manual retry | [`PollController`], [`ControllerHandle`]  |
//! | **Scheduling**  | Fixed-period polling with tick coalescing         | [`IntervalDriver`]                        |
//! | **Policies**    | Backoff schedule, jitter, retry ceiling           | [`RetryPolicy`], [`BackoffPolicy`]        |
//! | **Sources**     | Lanyard REST client                               | [`PresenceSource`], [`LanyardClient`]     |
//! | **Rendering**   | HTML fragments for presence and notices           | [`Render`], [`HtmlRenderer`]              |
//! | **Events**      | Lifecycle events and subscribers                  | [`Event`], [`Subscribe`], [`LogWriter`]   |
//! | **Errors**      | Typed failures                                    | [`PollError`], [`RenderError`]            |
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use async_trait::async_trait;
//! use serde_json::json;
//! use presencewatch::{
//!     Config, HtmlRenderer, PollController, PollError, PresencePayload, PresenceSource, Bus,
//! };
//!
//! struct Fixed;
//!
//! #[async_trait]
//! impl PresenceSource for Fixed {
//!     fn endpoint(&self) -> &str { "fixed" }
//!     async fn fetch(&self) -> Result<PresencePayload, PollError> {
//!         Ok(PresencePayload::ok(json!({
//!             "discord_status": "idle",
//!             "discord_user": { "id": "1", "username": "someone" }
//!         })))
//!     }
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let (renderer, mut html) = HtmlRenderer::new("1");
//!     let handle = PollController::spawn(&Config::default(), Arc::new(Fixed), Arc::new(renderer), Bus::new(16));
//!
//!     handle.poll().await?;
//!     html.changed().await?;
//!     assert!(html.borrow().contains("Idle"));
//!
//!     handle.dispose().await;
//!     Ok(())
//! }
//! ```
mod config;
mod controller;
mod error;
mod events;
mod policies;
mod render;
mod shutdown;
mod source;
mod subscribers;
mod watcher;

// ---- Public re-exports ----

pub use config::{Config, DEFAULT_BASE_URL, DEFAULT_USER_ID};
pub use controller::{
    retrying_notice, terminal_notice, ControllerHandle, IntervalDriver, Phase, PollController,
    RetryState, RECONNECTING,
};
pub use error::{ClientError, ControllerError, PollError, RenderError};
pub use events::{Bus, Event, EventKind};
pub use policies::{BackoffPolicy, JitterPolicy, RetryDecision, RetryPolicy};
pub use render::{
    format_elapsed, Activity, ActivityKind, Assets, AvatarDecoration, DiscordUser, Emoji,
    HtmlRenderer, Presence, Render, Status, Timestamps,
};
pub use shutdown::shutdown_signal;
pub use source::{LanyardClient, PresencePayload, PresenceSource};
pub use subscribers::{LogWriter, Subscribe, SubscriberSet};
pub use watcher::Watcher;
