//! Presence domain - live online count of connected clients.

mod registry;

pub use registry::{ConnectionRecord, PresenceChange, PresenceRegistry};
