//! Broadcaster port - fan-out of events to every connected client.

use crate::domain::relay::OutboundEvent;

/// Delivers an event to all connected clients.
///
/// Delivery is best-effort and non-blocking. Clients that are not connected
/// at the time of the call never see the event.
pub trait Broadcaster: Send + Sync {
    fn broadcast(&self, event: OutboundEvent);
}
