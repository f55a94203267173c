//! Rules service port - the external backend that owns game outcomes.
//!
//! The orchestrator never decides results itself. Every bet-window change
//! and every jackpot round boundary is a POST to the rules backend, and the
//! orchestrator broadcasts whatever comes back.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::domain::wheel::WheelOutcome;

/// Port for the rules backend.
#[async_trait]
pub trait RulesService: Send + Sync {
    /// `POST /api/wheel/close` - closes betting and returns the spin result.
    async fn close_wheel_bets(&self) -> Result<WheelOutcome, RulesError>;

    /// `POST /api/wheel/open`
    async fn open_wheel_bets(&self) -> Result<(), RulesError>;

    /// `POST /api/wheel/start`
    async fn start_wheel_game(&self) -> Result<(), RulesError>;

    /// `POST /api/wheel/end`
    async fn end_wheel_bets(&self) -> Result<(), RulesError>;

    /// `POST /api/jackpot/getSlider` - the payload is relayed to clients as is.
    async fn jackpot_slider(&self) -> Result<Value, RulesError>;

    /// `POST /api/jackpot/newGame` - the payload is relayed to clients as is.
    async fn jackpot_new_game(&self) -> Result<Value, RulesError>;

    /// `POST /api/jackpot/getStatus`
    async fn jackpot_status(&self) -> Result<JackpotStatus, RulesError>;

    /// `POST /api/jackpot/setStatus {status}`
    async fn jackpot_set_status(&self, status: i64) -> Result<SetStatusAck, RulesError>;
}

/// Backend endpoints, one per port method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RulesEndpoint {
    WheelClose,
    WheelOpen,
    WheelStart,
    WheelEnd,
    JackpotSlider,
    JackpotNewGame,
    JackpotStatus,
    JackpotSetStatus,
}

impl RulesEndpoint {
    pub fn path(&self) -> &'static str {
        match self {
            RulesEndpoint::WheelClose => "/api/wheel/close",
            RulesEndpoint::WheelOpen => "/api/wheel/open",
            RulesEndpoint::WheelStart => "/api/wheel/start",
            RulesEndpoint::WheelEnd => "/api/wheel/end",
            RulesEndpoint::JackpotSlider => "/api/jackpot/getSlider",
            RulesEndpoint::JackpotNewGame => "/api/jackpot/newGame",
            RulesEndpoint::JackpotStatus => "/api/jackpot/getStatus",
            RulesEndpoint::JackpotSetStatus => "/api/jackpot/setStatus",
        }
    }
}

impl fmt::Display for RulesEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// A request as it was sent, for call logs.
#[derive(Debug, Clone, PartialEq)]
pub struct RulesCall {
    pub endpoint: RulesEndpoint,
    pub body: Option<Value>,
}

/// Wire shape of `/api/wheel/close`: `{rotate: [spin, color], gameid}`.
#[derive(Debug, Clone, Deserialize)]
pub struct CloseBetsResponse {
    pub rotate: (i64, String),
    pub gameid: i64,
}

impl From<CloseBetsResponse> for WheelOutcome {
    fn from(resp: CloseBetsResponse) -> Self {
        WheelOutcome {
            spin_value: resp.rotate.0,
            last_color: resp.rotate.1,
            game_id: resp.gameid,
        }
    }
}

/// Current jackpot round as reported by `/api/jackpot/getStatus`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JackpotStatus {
    #[serde(default)]
    pub id: Option<i64>,
    pub status: i64,
    /// Passed through untouched; the backend sends either a name or an id.
    #[serde(default)]
    pub room: Option<Value>,
    #[serde(default)]
    pub min: i64,
    #[serde(default)]
    pub sec: i64,
    #[serde(default)]
    pub time: i64,
    #[serde(default)]
    pub timer: i64,
}

impl JackpotStatus {
    /// Round is counting down (1) or in its final seconds (2).
    pub fn is_running(&self) -> bool {
        matches!(self.status, 1 | 2)
    }

    /// Round is over and the next one has not been created.
    pub fn is_finished(&self) -> bool {
        self.status == 3
    }
}

/// Reply to `/api/jackpot/setStatus`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetStatusAck {
    #[serde(default)]
    pub msg: Option<String>,
}

/// Errors from rules backend calls.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum RulesError {
    /// Connection refused, reset, DNS failure.
    #[error("network error calling {endpoint}: {message}")]
    Network {
        endpoint: RulesEndpoint,
        message: String,
    },

    #[error("{endpoint} timed out after {timeout_secs}s")]
    Timeout {
        endpoint: RulesEndpoint,
        timeout_secs: u64,
    },

    /// Backend answered with a non-success status.
    #[error("{endpoint} returned HTTP {status}")]
    Status { endpoint: RulesEndpoint, status: u16 },

    /// Body did not match the expected shape.
    #[error("could not decode {endpoint} response: {message}")]
    Parse {
        endpoint: RulesEndpoint,
        message: String,
    },
}

impl RulesError {
    pub fn endpoint(&self) -> RulesEndpoint {
        match self {
            RulesError::Network { endpoint, .. }
            | RulesError::Timeout { endpoint, .. }
            | RulesError::Status { endpoint, .. }
            | RulesError::Parse { endpoint, .. } => *endpoint,
        }
    }

    /// Whether repeating the call could succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            RulesError::Network { .. } | RulesError::Timeout { .. } => true,
            RulesError::Status { status, .. } => *status >= 500,
            RulesError::Parse { .. } => false,
        }
    }
}

impl From<RulesError> for DomainError {
    fn from(err: RulesError) -> Self {
        DomainError::new(ErrorCode::RulesServiceError, err.to_string())
            .with_detail("endpoint", err.endpoint().path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn close_response_maps_to_outcome() {
        let resp: CloseBetsResponse =
            serde_json::from_str(r#"{"rotate":[1234,"green"],"gameid":77}"#).unwrap();
        let outcome = WheelOutcome::from(resp);

        assert_eq!(outcome.spin_value, 1234);
        assert_eq!(outcome.last_color, "green");
        assert_eq!(outcome.game_id, 77);
    }

    #[test]
    fn close_response_without_rotate_fails() {
        assert!(serde_json::from_str::<CloseBetsResponse>(r#"{"gameid":77}"#).is_err());
    }

    #[test]
    fn status_classification() {
        let status = |s| JackpotStatus {
            id: None,
            status: s,
            room: None,
            min: 0,
            sec: 0,
            time: 0,
            timer: 0,
        };
        assert!(status(1).is_running());
        assert!(status(2).is_running());
        assert!(!status(3).is_running());
        assert!(status(3).is_finished());
        assert!(!status(0).is_running() && !status(0).is_finished());
    }

    #[test]
    fn status_tolerates_missing_fields() {
        let status: JackpotStatus = serde_json::from_str(r#"{"status":3,"id":9}"#).unwrap();
        assert_eq!(status.id, Some(9));
        assert_eq!(status.min, 0);
    }

    #[test]
    fn status_accepts_numeric_room() {
        let status: JackpotStatus = serde_json::from_str(
            r#"{"id":3,"status":1,"room":1,"min":0,"sec":5,"time":5,"timer":5}"#,
        )
        .unwrap();
        assert_eq!(status.room, Some(serde_json::json!(1)));
        assert!(status.is_running());
    }

    #[test]
    fn server_errors_are_retryable() {
        let err = RulesError::Status {
            endpoint: RulesEndpoint::JackpotNewGame,
            status: 503,
        };
        assert!(err.is_retryable());
        let err = RulesError::Status {
            endpoint: RulesEndpoint::JackpotNewGame,
            status: 404,
        };
        assert!(!err.is_retryable());
    }

    #[test]
    fn converts_to_domain_error() {
        let err: DomainError = RulesError::Timeout {
            endpoint: RulesEndpoint::WheelClose,
            timeout_secs: 5,
        }
        .into();
        assert_eq!(err.code, ErrorCode::RulesServiceError);
        assert_eq!(err.details.get("endpoint").map(String::as_str), Some("/api/wheel/close"));
    }
}
