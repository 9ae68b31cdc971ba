//! Error types used by the presence poller.
//!
//! - [`PollError`] why a single poll failed. Its `Display` output is the message
//!   shown to the user inside the retry notice.
//! - [`RenderError`] why a renderer could not show a payload.
//! - [`ControllerError`] why a command could not reach the controller.
//! - [`ClientError`] why the HTTP client could not be built.
//!
//! [`PollError`] provides `as_label` for logs.

use std::time::Duration;
use thiserror::Error;

/// # Failure of one presence poll.
///
/// Every variant is caught at the controller boundary and turned into a renderer
/// notice; none propagate further.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PollError {
    /// The request never completed (DNS, connect, TLS, reset...).
    #[error("{error}")]
    Transport {
        /// Transport error message.
        error: String,
    },

    /// A response arrived with a status outside `2xx`.
    #[error("HTTP error! status: {status}")]
    HttpStatus {
        /// Numeric HTTP status.
        status: u16,
    },

    /// The body decoded but reported `success: false`.
    #[error("API returned unsuccessful response: {body}")]
    Application {
        /// The response body, re-serialized as compact JSON.
        body: String,
    },

    /// The body was not a presence payload.
    #[error("invalid response body: {error}")]
    Decode {
        /// Decoder error message.
        error: String,
    },

    /// The request did not finish within the configured timeout.
    #[error("request timed out after {timeout:?}")]
    Timeout {
        /// The timeout that was exceeded.
        timeout: Duration,
    },
}

impl PollError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use presencewatch::PollError;
    ///
    /// let err = PollError::HttpStatus { status: 503 };
    /// assert_eq!(err.as_label(), "poll_http_status");
    /// assert_eq!(err.to_string(), "HTTP error! status: 503");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            PollError::Transport { .. } => "poll_transport",
            PollError::HttpStatus { .. } => "poll_http_status",
            PollError::Application { .. } => "poll_application",
            PollError::Decode { .. } => "poll_decode",
            PollError::Timeout { .. } => "poll_timeout",
        }
    }
}

/// # Failure of a renderer to show a payload.
///
/// Reported and logged by the controller; never affects retry state.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// Nothing is attached to receive the rendered output.
    #[error("render target not found")]
    TargetMissing,

    /// The payload does not have the shape the renderer needs.
    #[error("invalid payload: {reason}")]
    InvalidPayload {
        /// What was wrong with it.
        reason: String,
    },
}

/// Error returned by [`ControllerHandle`](crate::ControllerHandle) commands.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerError {
    /// A poll request is already queued (only from `try_poll`).
    #[error("command queue full")]
    Full,

    /// The controller has been disposed.
    #[error("controller closed")]
    Closed,
}

/// Error building the HTTP client.
#[derive(Error, Debug)]
pub enum ClientError {
    /// The underlying `reqwest` builder rejected the configuration.
    #[error("failed to build http client: {0}")]
    Build(#[from] reqwest::Error),
}

/// Extracts a readable message from a caught panic payload.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
