//! Errors surfaced by scheduler handles.

use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode};

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum SchedulerError {
    /// The scheduler task has exited (shutdown or panic).
    #[error("{0} scheduler is not running")]
    Unavailable(&'static str),
}

impl From<SchedulerError> for DomainError {
    fn from(err: SchedulerError) -> Self {
        DomainError::new(ErrorCode::SchedulerUnavailable, err.to_string())
    }
}
