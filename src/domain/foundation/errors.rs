//! Error types shared by the domain layer.

use std::collections::HashMap;
use std::error::Error;
use std::fmt;
use thiserror::Error;

/// A phase change a round state machine does not allow.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{machine} round cannot move from {from} to {to}")]
pub struct TransitionError {
    pub machine: &'static str,
    pub from: String,
    pub to: String,
}

/// Error codes organized by category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Inbound message errors
    UnknownChannel,
    MalformedPayload,
    UnknownEventType,
    UnknownCommand,

    // State errors
    InvalidStateTransition,

    // Collaborator errors
    RulesServiceError,
    MessageBusError,
    SchedulerUnavailable,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::UnknownChannel => "UNKNOWN_CHANNEL",
            ErrorCode::MalformedPayload => "MALFORMED_PAYLOAD",
            ErrorCode::UnknownEventType => "UNKNOWN_EVENT_TYPE",
            ErrorCode::UnknownCommand => "UNKNOWN_COMMAND",
            ErrorCode::InvalidStateTransition => "INVALID_STATE_TRANSITION",
            ErrorCode::RulesServiceError => "RULES_SERVICE_ERROR",
            ErrorCode::MessageBusError => "MESSAGE_BUS_ERROR",
            ErrorCode::SchedulerUnavailable => "SCHEDULER_UNAVAILABLE",
        };
        write!(f, "{}", s)
    }
}

/// Standard domain error with code, message, and optional details.
#[derive(Debug, Clone)]
pub struct DomainError {
    pub code: ErrorCode,
    pub message: String,
    pub details: HashMap<String, String>,
}

impl DomainError {
    /// Creates a new domain error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: HashMap::new(),
        }
    }

    /// Adds a detail to the error.
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl Error for DomainError {}

impl From<TransitionError> for DomainError {
    fn from(err: TransitionError) -> Self {
        DomainError::new(ErrorCode::InvalidStateTransition, err.to_string())
            .with_detail("round", err.machine)
    }
}
