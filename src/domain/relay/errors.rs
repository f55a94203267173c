//! Errors raised while routing an inbound bus message.

use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode};

/// Why an inbound message was dropped.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("unknown channel: {0}")]
    UnknownChannel(String),

    #[error("malformed payload on {channel}: {reason}")]
    MalformedPayload { channel: String, reason: String },

    #[error("unknown wheel event type: {0:?}")]
    UnknownWheelEvent(Option<String>),

    #[error("unknown admin command: {0:?}")]
    UnknownAdminCommand(Option<String>),

    #[error("invalid wheel event type: {0:?}")]
    InvalidWheelEventType(String),
}

impl RelayError {
    pub fn malformed(channel: impl Into<String>, reason: impl ToString) -> Self {
        RelayError::MalformedPayload {
            channel: channel.into(),
            reason: reason.to_string(),
        }
    }
}

impl From<RelayError> for DomainError {
    fn from(err: RelayError) -> Self {
        let code = match &err {
            RelayError::UnknownChannel(_) => ErrorCode::UnknownChannel,
            RelayError::MalformedPayload { .. } => ErrorCode::MalformedPayload,
            RelayError::UnknownWheelEvent(_) | RelayError::InvalidWheelEventType(_) => {
                ErrorCode::UnknownEventType
            }
            RelayError::UnknownAdminCommand(_) => ErrorCode::UnknownCommand,
        };
        DomainError::new(code, err.to_string())
    }
}
