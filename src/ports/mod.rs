//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the round logic and the outside world. Adapters implement these ports.
//!
//! - `MessageBus` - Inbound pub/sub feed (Redis in production)
//! - `RulesService` - HTTP backend that decides game outcomes
//! - `Broadcaster` - Fan-out to connected clients

mod broadcaster;
mod message_bus;
mod rules_service;

pub use broadcaster::Broadcaster;
pub use message_bus::{BusError, BusMessage, MessageBus};
pub use rules_service::{
    CloseBetsResponse, JackpotStatus, RulesCall, RulesEndpoint, RulesError, RulesService,
    SetStatusAck,
};
