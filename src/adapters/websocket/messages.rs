//! Frames exchanged with socket clients.
//!
//! Server to client frames are [`OutboundEvent`]s serialized as
//! `{"event": ..., "data": ...}`. Clients can only ping.

use serde::{Deserialize, Serialize};

use crate::domain::relay::OutboundEvent;

/// Messages a client may send. Anything else is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    Ping,
}

/// Direct reply to a client ping, never broadcast.
#[derive(Debug, Clone, Serialize)]
pub struct PongMessage {
    event: &'static str,
}

impl Default for PongMessage {
    fn default() -> Self {
        Self { event: "pong" }
    }
}

pub(super) fn encode_event(event: &OutboundEvent) -> Result<String, serde_json::Error> {
    serde_json::to_string(event)
}

pub(super) fn encode_pong() -> Result<String, serde_json::Error> {
    serde_json::to_string(&PongMessage::default())
}
