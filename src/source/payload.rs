//! Decoded response body.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The Lanyard envelope: `{ success, data, ... }`.
///
/// `data` stays an opaque JSON value; only the renderer gives it a shape. A
/// missing `success` flag reads as `false`. Bodies decoded with
/// [`from_body`](Self::from_body) keep their text so an unsuccessful response
/// can be echoed back exactly as received.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PresencePayload {
    #[serde(default)]
    pub success: bool,

    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub data: Value,

    #[serde(flatten)]
    pub rest: Map<String, Value>,

    #[serde(skip)]
    raw: Option<String>,
}

impl PresencePayload {
    /// A successful payload carrying `data`.
    pub fn ok(data: Value) -> Self {
        Self {
            success: true,
            data,
            rest: Map::new(),
            raw: None,
        }
    }

    /// Decodes a response body and keeps its text.
    pub fn from_body(body: &str) -> Result<Self, serde_json::Error> {
        let mut payload: Self = serde_json::from_str(body)?;
        payload.raw = Some(body.to_string());
        Ok(payload)
    }

    /// The body as received; payloads built in memory fall back to compact JSON.
    pub fn body(&self) -> String {
        match &self.raw {
            Some(raw) => raw.clone(),
            None => serde_json::to_string(self)
                .unwrap_or_else(|_| format!("{{\"success\":{}}}", self.success)),
        }
    }
}
