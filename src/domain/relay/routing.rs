//! Maps a raw bus message to what the relay should do with it.
//!
//! Routing is pure: parsing failures come back as [`RelayError`] so the
//! caller can log and drop the message.

use serde_json::Value;

use crate::domain::jackpot::JackpotTimerRequest;

use super::admin::AdminCommand;
use super::channel::InboundChannel;
use super::errors::RelayError;
use super::outbound::{OutboundEvent, OutboundTopic};
use super::wheel_events::WheelEventTypes;

/// The relay's decision for one inbound message.
#[derive(Debug, Clone, PartialEq)]
pub enum RelayAction {
    /// Forward to every connected client.
    Broadcast(OutboundEvent),
    /// Kick off the wheel countdown if it is idle.
    StartWheel,
    /// Local operator control.
    Admin(AdminCommand),
    /// (Re)start the jackpot countdown.
    StartJackpot(JackpotTimerRequest),
}

/// Route one message received on `channel`.
///
/// `wheel_events` lists the event names the `wheel` channel may fan out.
pub fn route(
    channel: &str,
    payload: &str,
    wheel_events: &WheelEventTypes,
) -> Result<RelayAction, RelayError> {
    let channel: InboundChannel = channel.parse()?;

    if !channel.requires_payload() {
        return Ok(RelayAction::StartWheel);
    }

    let body: Value =
        serde_json::from_str(payload).map_err(|e| RelayError::malformed(channel.as_str(), e))?;

    let action = match channel {
        InboundChannel::WheelTimer => RelayAction::StartWheel,
        InboundChannel::Wheel => {
            let name = wheel_event_name(&body, wheel_events)?;
            RelayAction::Broadcast(OutboundEvent::new(OutboundTopic::Wheel(name), body))
        }
        InboundChannel::Admin => RelayAction::Admin(AdminCommand::from_payload(&body)?),
        InboundChannel::JackpotTimer => {
            let request: JackpotTimerRequest = serde_json::from_value(body)
                .map_err(|e| RelayError::malformed(channel.as_str(), e))?;
            RelayAction::StartJackpot(request)
        }
        InboundChannel::Withdraw => verbatim(OutboundTopic::Withdraw, body),
        InboundChannel::Test => verbatim(OutboundTopic::Test, body),
        InboundChannel::JackpotNewBet => verbatim(OutboundTopic::JackpotNewBet, body),
        InboundChannel::Crash => verbatim(OutboundTopic::Crash, body),
    };

    Ok(action)
}

fn verbatim(topic: OutboundTopic, body: Value) -> RelayAction {
    RelayAction::Broadcast(OutboundEvent::new(topic, body))
}

fn wheel_event_name(body: &Value, allowed: &WheelEventTypes) -> Result<String, RelayError> {
    let declared = body.get("type").and_then(Value::as_str);
    declared
        .and_then(|t| allowed.lookup(t))
        .map(str::to_string)
        .ok_or_else(|| RelayError::UnknownWheelEvent(declared.map(str::to_string)))
}
