//! Redis pub/sub message bus.
//!
//! Holds one dedicated pub/sub connection. When the connection drops or the
//! message stream ends, the bus waits `reconnect_delay`, reconnects and
//! subscribes again to the same channels. Messages published while
//! disconnected are lost; pub/sub has no backlog.

use async_trait::async_trait;
use futures::stream::{Stream, StreamExt};
use std::pin::Pin;
use std::time::Duration;
use tokio::time::{sleep, timeout};

use crate::ports::{BusError, BusMessage, MessageBus};

type MessageStream = Pin<Box<dyn Stream<Item = redis::Msg> + Send>>;

pub struct RedisMessageBus {
    client: redis::Client,
    channels: Vec<String>,
    reconnect_delay: Duration,
    connect_timeout: Duration,
    stream: Option<MessageStream>,
}

impl RedisMessageBus {
    /// Creates a bus for `url` without connecting yet.
    pub fn new(url: &str, reconnect_delay: Duration) -> Result<Self, BusError> {
        let client =
            redis::Client::open(url).map_err(|e| BusError::Connection(e.to_string()))?;
        Ok(Self {
            client,
            channels: Vec::new(),
            reconnect_delay,
            connect_timeout: Duration::from_secs(5),
            stream: None,
        })
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    async fn connect(&mut self) -> Result<(), BusError> {
        let conn = timeout(self.connect_timeout, self.client.get_async_connection())
            .await
            .map_err(|_| BusError::Connection("connect timed out".to_string()))?
            .map_err(|e| BusError::Connection(e.to_string()))?;
        let mut pubsub = conn.into_pubsub();

        for channel in &self.channels {
            pubsub
                .subscribe(channel.as_str())
                .await
                .map_err(|e| BusError::Subscribe(format!("{}: {}", channel, e)))?;
        }

        self.stream = Some(Box::pin(pubsub.into_on_message()));
        tracing::info!(channels = ?self.channels, "Subscribed to Redis channels");
        Ok(())
    }

    /// Keeps trying until a subscription is live again.
    async fn reconnect(&mut self) {
        self.stream = None;
        loop {
            sleep(self.reconnect_delay).await;
            match self.connect().await {
                Ok(()) => return,
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        retry_in_ms = self.reconnect_delay.as_millis() as u64,
                        "Redis reconnect failed"
                    );
                }
            }
        }
    }
}

#[async_trait]
impl MessageBus for RedisMessageBus {
    async fn subscribe(&mut self, channels: &[&str]) -> Result<(), BusError> {
        for channel in channels {
            if !self.channels.iter().any(|c| c == channel) {
                self.channels.push(channel.to_string());
            }
        }

        // A failed first connect is retried by `next_message`.
        if let Err(e) = self.connect().await {
            tracing::warn!(error = %e, "Initial Redis subscription failed");
        }
        Ok(())
    }

    async fn next_message(&mut self) -> Result<Option<BusMessage>, BusError> {
        loop {
            let Some(stream) = self.stream.as_mut() else {
                self.reconnect().await;
                continue;
            };

            match stream.next().await {
                Some(msg) => {
                    let channel = msg.get_channel_name().to_string();
                    let payload: String = msg.get_payload().map_err(|e| BusError::Decode {
                        channel: channel.clone(),
                        reason: e.to_string(),
                    })?;
                    return Ok(Some(BusMessage { channel, payload }));
                }
                None => {
                    tracing::warn!("Redis pub/sub stream ended, reconnecting");
                    self.reconnect().await;
                }
            }
        }
    }
}
