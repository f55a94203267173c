//! In-memory message bus for tests and local runs.
//!
//! Backed by an unbounded mpsc channel. Like Redis, only channels passed to
//! `subscribe` are delivered; everything else is silently discarded.

use async_trait::async_trait;
use std::collections::HashSet;
use tokio::sync::mpsc;

use crate::ports::{BusError, BusMessage, MessageBus};

/// Publishing side of an [`InMemoryMessageBus`].
#[derive(Debug, Clone)]
pub struct InMemoryPublisher {
    tx: mpsc::UnboundedSender<BusMessage>,
}

impl InMemoryPublisher {
    /// Publish a payload. Returns false once the bus has been dropped.
    pub fn publish(&self, channel: impl Into<String>, payload: impl Into<String>) -> bool {
        self.tx.send(BusMessage::new(channel, payload)).is_ok()
    }
}

#[derive(Debug)]
pub struct InMemoryMessageBus {
    rx: mpsc::UnboundedReceiver<BusMessage>,
    channels: HashSet<String>,
}

impl InMemoryMessageBus {
    /// Creates a bus and its publisher. The bus closes when every publisher
    /// clone is dropped.
    pub fn new() -> (Self, InMemoryPublisher) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                rx,
                channels: HashSet::new(),
            },
            InMemoryPublisher { tx },
        )
    }
}

#[async_trait]
impl MessageBus for InMemoryMessageBus {
    async fn subscribe(&mut self, channels: &[&str]) -> Result<(), BusError> {
        self.channels
            .extend(channels.iter().map(|c| c.to_string()));
        Ok(())
    }

    async fn next_message(&mut self) -> Result<Option<BusMessage>, BusError> {
        while let Some(message) = self.rx.recv().await {
            if self.channels.contains(&message.channel) {
                return Ok(Some(message));
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn delivers_only_subscribed_channels() {
        let (mut bus, publisher) = InMemoryMessageBus::new();
        bus.subscribe(&["wheel", "test"]).await.unwrap();

        publisher.publish("other", "{}");
        publisher.publish("test", "{\"a\":1}");

        let msg = bus.next_message().await.unwrap().unwrap();
        assert_eq!(msg, BusMessage::new("test", "{\"a\":1}"));
    }

    #[tokio::test]
    async fn closes_when_publishers_drop() {
        let (mut bus, publisher) = InMemoryMessageBus::new();
        bus.subscribe(&["wheel"]).await.unwrap();
        publisher.publish("wheel", "1");
        drop(publisher);

        assert!(bus.next_message().await.unwrap().is_some());
        assert!(bus.next_message().await.unwrap().is_none());
    }
}
