//! Operator commands arriving on the `admin` channel.

use serde_json::Value;

use super::errors::RelayError;

/// Local control actions. Never forwarded to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminCommand {
    /// Drop the current wheel countdown and start a fresh one.
    ReloadWheel,
    /// Close bets now and restart the wheel after a short delay.
    StopWheel,
}

impl AdminCommand {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdminCommand::ReloadWheel => "reloadWheel",
            AdminCommand::StopWheel => "stopWheel",
        }
    }

    /// Reads the command from the payload's `type` field.
    pub fn from_payload(payload: &Value) -> Result<Self, RelayError> {
        match payload.get("type").and_then(Value::as_str) {
            Some("reloadWheel") => Ok(AdminCommand::ReloadWheel),
            Some("stopWheel") => Ok(AdminCommand::StopWheel),
            other => Err(RelayError::UnknownAdminCommand(other.map(str::to_string))),
        }
    }
}
