//! Presence service - registers sockets and broadcasts the online count.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::domain::foundation::{ClientAddress, ConnectionId};
use crate::domain::presence::PresenceRegistry;
use crate::domain::relay::OutboundEvent;
use crate::ports::Broadcaster;

/// Every connect and disconnect is followed by a `live {count}` broadcast
/// to all clients, whether or not the count moved.
pub struct PresenceService {
    registry: Mutex<PresenceRegistry>,
    broadcaster: Arc<dyn Broadcaster>,
}

impl PresenceService {
    pub fn new(broadcaster: Arc<dyn Broadcaster>) -> Self {
        Self {
            registry: Mutex::new(PresenceRegistry::new()),
            broadcaster,
        }
    }

    /// Track a new socket from `address`.
    pub async fn connect(&self, address: ClientAddress) -> ConnectionId {
        let connection_id = ConnectionId::new();
        let mut registry = self.registry.lock().await;
        let change = registry.connect(connection_id, address);
        // Broadcast under the lock so counts reach clients in order.
        self.broadcaster.broadcast(OutboundEvent::live(change.online));
        connection_id
    }

    /// Forget a socket. Returns how long it was open, if it was known.
    pub async fn disconnect(&self, connection_id: &ConnectionId) -> Option<u64> {
        let mut registry = self.registry.lock().await;
        let change = registry.disconnect(connection_id);
        self.broadcaster.broadcast(OutboundEvent::live(change.online));
        if let Some(secs) = change.connected_for_secs {
            tracing::debug!(
                connection_id = %connection_id,
                online = change.online,
                connected_for_secs = secs,
                "Client disconnected"
            );
        }
        change.connected_for_secs
    }

    pub async fn online_count(&self) -> usize {
        self.registry.lock().await.online_count()
    }
}
