//! Presence registry - who is online right now.
//!
//! Every accepted socket is tracked by its own [`ConnectionId`]; the online
//! count is the number of distinct [`ClientAddress`]es that still hold at
//! least one open connection. Two tabs behind one NAT count once, and
//! closing one of them leaves the address online.

use std::collections::HashMap;

use crate::domain::foundation::{ClientAddress, ConnectionId, Timestamp};

/// One tracked client connection.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionRecord {
    pub connection_id: ConnectionId,
    pub address: ClientAddress,
    pub connected_at: Timestamp,
}

/// Result of a connect/disconnect, carrying the count to broadcast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresenceChange {
    /// Online count after the change.
    pub online: usize,
    /// Whether the change added or removed a distinct address.
    pub count_changed: bool,
    /// How long the closed connection was open; set on disconnect only.
    pub connected_for_secs: Option<u64>,
}

/// Reference-counted presence map.
#[derive(Debug, Default)]
pub struct PresenceRegistry {
    connections: HashMap<ConnectionId, ConnectionRecord>,
    per_address: HashMap<ClientAddress, usize>,
}

impl PresenceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a new connection.
    ///
    /// Registering an already-known connection id is a no-op.
    pub fn connect(&mut self, connection_id: ConnectionId, address: ClientAddress) -> PresenceChange {
        if self.connections.contains_key(&connection_id) {
            return PresenceChange {
                online: self.online_count(),
                count_changed: false,
                connected_for_secs: None,
            };
        }

        let refs = self.per_address.entry(address.clone()).or_insert(0);
        *refs += 1;
        let count_changed = *refs == 1;

        self.connections.insert(
            connection_id,
            ConnectionRecord {
                connection_id,
                address,
                connected_at: Timestamp::now(),
            },
        );

        PresenceChange {
            online: self.online_count(),
            count_changed,
            connected_for_secs: None,
        }
    }

    /// Forget a connection.
    ///
    /// Unknown ids leave the registry untouched.
    pub fn disconnect(&mut self, connection_id: &ConnectionId) -> PresenceChange {
        let Some(record) = self.connections.remove(connection_id) else {
            return PresenceChange {
                online: self.online_count(),
                count_changed: false,
                connected_for_secs: None,
            };
        };

        let mut count_changed = false;
        if let Some(refs) = self.per_address.get_mut(&record.address) {
            *refs -= 1;
            if *refs == 0 {
                self.per_address.remove(&record.address);
                count_changed = true;
            }
        }

        PresenceChange {
            online: self.online_count(),
            count_changed,
            connected_for_secs: Some(record.connected_at.elapsed_secs()),
        }
    }

    /// Number of distinct addresses with at least one open connection.
    pub fn online_count(&self) -> usize {
        self.per_address.len()
    }

    /// Number of open connections, regardless of address.
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Open connections for a given address.
    pub fn connections_for(&self, address: &ClientAddress) -> usize {
        self.per_address.get(address).copied().unwrap_or(0)
    }

    pub fn get(&self, connection_id: &ConnectionId) -> Option<&ConnectionRecord> {
        self.connections.get(connection_id)
    }
}
