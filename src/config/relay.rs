//! Bus relay configuration

use serde::Deserialize;

use crate::domain::relay::{RelayError, WheelEventTypes};

use super::error::ValidationError;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RelayConfig {
    /// Event names the `wheel` channel may fan out, comma separated in the
    /// environment (`CASINO_ORCHESTRATOR__RELAY__WHEEL_EVENT_TYPES=a,b`)
    #[serde(default)]
    pub wheel_event_types: Vec<String>,
}

impl RelayConfig {
    pub fn wheel_events(&self) -> Result<WheelEventTypes, ValidationError> {
        WheelEventTypes::new(&self.wheel_event_types).map_err(|e| match e {
            RelayError::InvalidWheelEventType(name) => ValidationError::InvalidWheelEventType(name),
            other => ValidationError::InvalidWheelEventType(other.to_string()),
        })
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        self.wheel_events().map(|_| ())
    }
}
