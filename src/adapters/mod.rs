//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the round logic to external systems:
//! - `bus` - Pub/sub feed (Redis, in-memory)
//! - `rules` - Rules backend client (HTTP, mock)
//! - `websocket` - Client fan-out and socket handling
//! - `http` - Router, middleware and health check

pub mod bus;
pub mod http;
pub mod rules;
pub mod websocket;
