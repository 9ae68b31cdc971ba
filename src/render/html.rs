//! HTML fragment renderer.
//!
//! The current fragment is published on a [`watch`] channel that plays the role
//! of the page container: whoever holds the receiver embeds the latest value.
//! When every receiver is gone the container is considered missing.

use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::watch;
use tracing::warn;

use crate::error::RenderError;
use crate::render::presence::{format_elapsed, Activity, ActivityKind, Presence};
use crate::render::Render;

const LOADING: &str = r#"<div class="loading-status">Loading Discord status...</div>"#;

/// Renders presence payloads and notices as HTML fragments.
#[derive(Debug)]
pub struct HtmlRenderer {
    user_id: String,
    tx: watch::Sender<String>,
}

impl HtmlRenderer {
    /// Creates the renderer and the receiver that observes its fragments.
    ///
    /// The receiver starts with a loading placeholder.
    pub fn new(user_id: impl Into<String>) -> (Self, watch::Receiver<String>) {
        let (tx, rx) = watch::channel(LOADING.to_string());
        (
            Self {
                user_id: user_id.into(),
                tx,
            },
            rx,
        )
    }

    /// Builds the presence fragment. `now_ms` is the Unix time used for elapsed times.
    pub fn presence_fragment(&self, presence: &Presence, now_ms: i64) -> Result<String, RenderError> {
        let user = presence
            .discord_user
            .as_ref()
            .ok_or_else(|| RenderError::InvalidPayload {
                reason: "invalid user data received from API".into(),
            })?;
        let status = presence.status();

        let mut out = String::with_capacity(1024);
        out.push_str(&format!(
            r#"<div class="discord-status" data-status="{}">"#,
            status.as_str()
        ));

        out.push_str(r#"<div class="discord-header">"#);
        out.push_str(&format!(
            r#"<img class="discord-avatar" src="{}" alt="{}">"#,
            escape(&user.avatar_url()),
            escape(user.display_name())
        ));
        if let Some(frame) = user.decoration_url() {
            out.push_str(&format!(
                r#"<img class="discord-decoration" src="{}" alt="">"#,
                escape(&frame)
            ));
        }
        out.push_str(&format!(
            r#"<span class="status-indicator status-{}"></span>"#,
            status.as_str()
        ));
        out.push_str(r#"<div class="discord-title">Discord Status</div>"#);
        out.push_str(&format!(
            r#"<div class="discord-state">Status: <span style="color: {}">{}</span></div>"#,
            status.color(),
            status.label()
        ));
        out.push_str("</div>");

        out.push_str(r#"<div class="discord-activities">"#);
        if presence.activities.is_empty() {
            out.push_str(r#"<div class="discord-empty">No current activity</div>"#);
        } else {
            out.push_str(r#"<div class="discord-activities-title">Current activity:</div>"#);
            for activity in &presence.activities {
                push_activity(&mut out, activity, now_ms);
            }
        }
        out.push_str("</div></div>");

        Ok(out)
    }

    /// Builds the notice fragment with its retry button.
    pub fn error_fragment(&self, message: &str) -> String {
        format!(
            concat!(
                r#"<div class="loading-status error-status">"#,
                r#"<span class="error-message">{}</span>"#,
                r#"<div class="discord-id">ID: {}</div>"#,
                r#"<button class="retry-btn" data-action="retry">Retry now</button>"#,
                "</div>"
            ),
            escape(message),
            escape(&self.user_id)
        )
    }
}

#[async_trait]
impl Render for HtmlRenderer {
    async fn on_data(&self, data: &Value) -> Result<(), RenderError> {
        if self.tx.is_closed() {
            return Err(RenderError::TargetMissing);
        }

        let presence: Presence =
            serde_json::from_value(data.clone()).map_err(|e| RenderError::InvalidPayload {
                reason: e.to_string(),
            })?;
        let fragment = self.presence_fragment(&presence, unix_now_ms())?;

        self.tx.send(fragment).map_err(|_| RenderError::TargetMissing)
    }

    async fn on_error(&self, message: &str) {
        if self.tx.send(self.error_fragment(message)).is_err() {
            warn!(notice = message, "no fragment receiver, notice dropped");
        }
    }
}

fn push_activity(out: &mut String, activity: &Activity, now_ms: i64) {
    match activity.kind() {
        ActivityKind::Custom => {
            out.push_str(r#"<div class="discord-activity activity-custom">"#);
            if let Some(emoji) = &activity.emoji {
                match emoji.image_url() {
                    Some(src) => out.push_str(&format!(
                        r#"<img class="activity-emoji" src="{}" alt="{}">"#,
                        escape(&src),
                        escape(&emoji.name)
                    )),
                    None => out.push_str(&format!(
                        r#"<span class="activity-emoji">{}</span>"#,
                        escape(&emoji.name)
                    )),
                }
            }
            out.push_str(&format!(
                r#"<div><div class="activity-label">Custom Status</div><div class="activity-name">{}</div></div>"#,
                escape(activity.state.as_deref().unwrap_or("No custom status"))
            ));
            out.push_str("</div>");
        }
        ActivityKind::Playing => {
            out.push_str(r#"<div class="discord-activity activity-playing">"#);
            match activity.large_image_url() {
                Some(src) => out.push_str(&format!(
                    r#"<img class="activity-image" src="{}" alt="{}">"#,
                    escape(&src),
                    escape(activity.large_image_text())
                )),
                None => out.push_str(r#"<div class="activity-image activity-placeholder"></div>"#),
            }
            out.push_str(r#"<div><div class="activity-label">Playing</div>"#);
            out.push_str(&format!(
                r#"<div class="activity-name">{}</div>"#,
                escape(&activity.name)
            ));
            if let Some(details) = &activity.details {
                out.push_str(&format!(
                    r#"<div class="activity-details">{}</div>"#,
                    escape(details)
                ));
            }
            if let Some(state) = &activity.state {
                out.push_str(&format!(
                    r#"<div class="activity-state">{}</div>"#,
                    escape(state)
                ));
            }
            if let Some(start) = activity.started_at_ms() {
                out.push_str(&format!(
                    r#"<div class="activity-elapsed">{}</div>"#,
                    format_elapsed(start, now_ms)
                ));
            }
            out.push_str("</div></div>");
        }
        ActivityKind::Listening => {
            out.push_str(r#"<div class="discord-activity activity-spotify">"#);
            out.push_str(r#"<div><div class="activity-label">Listening to Spotify</div>"#);
            out.push_str(&format!(
                r#"<div class="activity-name">{}</div>"#,
                escape(activity.details.as_deref().unwrap_or_default())
            ));
            if let Some(artist) = &activity.state {
                out.push_str(&format!(
                    r#"<div class="activity-state">by {}</div>"#,
                    escape(artist)
                ));
            }
            out.push_str("</div></div>");
        }
        ActivityKind::Other(_) => {}
    }
}

fn unix_now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_millis().min(i64::MAX as u128) as i64)
}

/// Escapes text for use in element content and quoted attributes.
fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}
