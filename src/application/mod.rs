//! Application layer - services and long-running tasks.
//!
//! Coordinates domain rounds with the ports: the relay feeds commands into
//! the schedulers, and everything user-visible leaves through a `Broadcaster`.

pub mod handlers;

pub use handlers::{
    AdminControlHandler, JackpotHandle, JackpotScheduler, PresenceService, Relay, WheelHandle,
    WheelScheduler,
};
