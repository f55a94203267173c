//! WebSocket adapters for pushing round events to game clients.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  Relay (bus)   WheelScheduler   JackpotScheduler   Presence  │
//! └──────────────────────────────────────────────────────────────┘
//!                              │ Broadcaster::broadcast
//!                              ▼
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         ClientHub                            │
//! │        one tokio broadcast channel, no rooms                 │
//! └──────────────────────────────────────────────────────────────┘
//!                              │
//!              ┌───────────────┼───────────────┐
//!           socket-a        socket-b        socket-c
//! ```
//!
//! # Components
//!
//! - [`messages`] - Client frame types
//! - [`hub`] - Broadcast fan-out
//! - [`handler`] - Axum WebSocket upgrade handler and presence hooks

pub mod handler;
pub mod hub;
pub mod messages;

pub use handler::{websocket_router, ws_handler, WebSocketState};
pub use hub::ClientHub;
pub use messages::{ClientMessage, PongMessage};
