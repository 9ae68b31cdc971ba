//! # Renderers.
//!
//! The controller talks to presentation code only through [`Render`]:
//!
//! ```text
//! poll ok   ─► on_data(payload.data)  ─► Ok / Err(RenderError)  (logged, state untouched)
//! poll err  ─► on_error(notice)
//! manual    ─► on_error("Reconnecting...")
//! ```
//!
//! [`HtmlRenderer`] is the built-in implementation producing an HTML fragment.

mod html;
mod presence;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::RenderError;

pub use html::HtmlRenderer;
pub use presence::{
    Activity, ActivityKind, Assets, AvatarDecoration, DiscordUser, Emoji, Presence, Status,
    Timestamps, format_elapsed,
};

/// Presentation callbacks invoked by the poll controller.
///
/// Exactly one callback runs per controller step. Implementations that show
/// `on_error` notices should also give the user a way to call
/// [`ControllerHandle::manual_retry`](crate::ControllerHandle::manual_retry).
#[async_trait]
pub trait Render: Send + Sync + 'static {
    /// Shows the `data` object of a successful payload.
    async fn on_data(&self, data: &Value) -> Result<(), RenderError>;

    /// Shows a status or error notice.
    async fn on_error(&self, message: &str);
}
