//! Client hub - one broadcast channel shared by every socket.
//!
//! There are no rooms: every connected client receives every event.
//!
//! ```text
//! Relay / Wheel / Jackpot / Presence
//!              │ broadcast()
//!              ▼
//!     broadcast::Sender<OutboundEvent>
//!        │          │          │
//!     socket-a   socket-b   socket-c
//! ```

use tokio::sync::broadcast;

use crate::domain::relay::OutboundEvent;
use crate::ports::Broadcaster;

/// Fan-out point for [`OutboundEvent`]s.
///
/// If a socket falls more than `capacity` events behind, its receiver skips
/// ahead and the socket continues from the newest events.
#[derive(Debug, Clone)]
pub struct ClientHub {
    sender: broadcast::Sender<OutboundEvent>,
}

impl ClientHub {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Create with default capacity (256 events).
    pub fn with_default_capacity() -> Self {
        Self::new(256)
    }

    /// Receiver for events broadcast from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<OutboundEvent> {
        self.sender.subscribe()
    }

    /// Number of live receivers (open sockets plus test subscribers).
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for ClientHub {
    fn default() -> Self {
        Self::with_default_capacity()
    }
}

impl Broadcaster for ClientHub {
    fn broadcast(&self, event: OutboundEvent) {
        tracing::trace!(event = %event.topic, "Broadcasting");
        // No receivers is fine.
        let _ = self.sender.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn every_subscriber_receives_broadcast() {
        let hub = ClientHub::new(8);
        let mut a = hub.subscribe();
        let mut b = hub.subscribe();

        hub.broadcast(OutboundEvent::live(2));

        assert_eq!(a.recv().await.unwrap(), OutboundEvent::live(2));
        assert_eq!(b.recv().await.unwrap(), OutboundEvent::live(2));
    }

    #[test]
    fn broadcast_without_subscribers_is_noop() {
        let hub = ClientHub::new(8);
        hub.broadcast(OutboundEvent::wheel_start(3));
        assert_eq!(hub.receiver_count(), 0);
    }

    #[tokio::test]
    async fn late_subscriber_gets_no_backfill() {
        let hub = ClientHub::new(8);
        hub.broadcast(OutboundEvent::wheel_start(5));
        let mut late = hub.subscribe();
        hub.broadcast(OutboundEvent::wheel_start(4));

        assert_eq!(late.recv().await.unwrap(), OutboundEvent::wheel_start(4));
    }

    #[tokio::test]
    async fn lagging_receiver_skips_ahead() {
        let hub = ClientHub::new(2);
        let mut rx = hub.subscribe();
        for n in 0..5 {
            hub.broadcast(OutboundEvent::wheel_start(n));
        }

        assert!(matches!(
            rx.recv().await,
            Err(broadcast::error::RecvError::Lagged(3))
        ));
        assert_eq!(rx.recv().await.unwrap(), OutboundEvent::wheel_start(3));
    }
}
