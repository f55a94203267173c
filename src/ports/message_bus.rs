//! Message bus port - inbound pub/sub feed from the rules backend.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode};

/// One message as delivered by the bus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusMessage {
    pub channel: String,
    pub payload: String,
}

impl BusMessage {
    pub fn new(channel: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            payload: payload.into(),
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BusError {
    #[error("connection failed: {0}")]
    Connection(String),

    #[error("subscribe failed: {0}")]
    Subscribe(String),

    /// Payload was not valid UTF-8 or otherwise unreadable.
    #[error("undecodable message on {channel}: {reason}")]
    Decode { channel: String, reason: String },
}

impl From<BusError> for DomainError {
    fn from(err: BusError) -> Self {
        DomainError::new(ErrorCode::MessageBusError, err.to_string())
    }
}

/// Port for a channel-based subscriber.
///
/// Implementations own reconnection. `next_message` returns `Ok(None)` only
/// when the bus is closed for good.
#[async_trait]
pub trait MessageBus: Send {
    async fn subscribe(&mut self, channels: &[&str]) -> Result<(), BusError>;

    async fn next_message(&mut self) -> Result<Option<BusMessage>, BusError>;
}
