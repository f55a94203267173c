//! Domain layer containing round logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared primitives (ids, epochs, errors, state machine trait)
//! - `presence` - Live online count keyed by client address
//! - `relay` - Inbound channel routing and outbound client events
//! - `wheel` - Wheel round state machine
//! - `jackpot` - Jackpot round state machine

pub mod foundation;
pub mod jackpot;
pub mod presence;
pub mod relay;
pub mod wheel;
