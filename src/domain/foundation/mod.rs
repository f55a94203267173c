//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers and error types that form the
//! vocabulary of the round orchestrator.

mod errors;
mod ids;
mod state_machine;
mod timestamp;

pub use errors::{DomainError, ErrorCode, TransitionError};
pub use ids::{ClientAddress, ConnectionId, RoundEpoch};
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
