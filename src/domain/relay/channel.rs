//! Inbound pub/sub channels the relay subscribes to.

use std::fmt;
use std::str::FromStr;

use super::errors::RelayError;

/// Every channel the relay listens on, as published by the rules backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InboundChannel {
    /// Player-facing wheel events, re-emitted under `payload.type`.
    Wheel,
    /// Kick-off for the wheel countdown. Payload ignored.
    WheelTimer,
    Withdraw,
    /// Out-of-band operator commands.
    Admin,
    Test,
    JackpotNewBet,
    /// `{min, sec, time}` for a fresh jackpot countdown.
    JackpotTimer,
    Crash,
}

impl InboundChannel {
    /// The full subscription set, in subscription order.
    pub const ALL: [InboundChannel; 8] = [
        InboundChannel::Wheel,
        InboundChannel::WheelTimer,
        InboundChannel::Withdraw,
        InboundChannel::Admin,
        InboundChannel::Test,
        InboundChannel::JackpotNewBet,
        InboundChannel::JackpotTimer,
        InboundChannel::Crash,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            InboundChannel::Wheel => "wheel",
            InboundChannel::WheelTimer => "wheel_timer",
            InboundChannel::Withdraw => "withdraw",
            InboundChannel::Admin => "admin",
            InboundChannel::Test => "test",
            InboundChannel::JackpotNewBet => "jackpot.newBet",
            InboundChannel::JackpotTimer => "jackpot.timer",
            InboundChannel::Crash => "crash",
        }
    }

    /// Channel names for the bus subscription call.
    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(|c| c.as_str()).collect()
    }

    /// Whether the payload must be JSON before routing.
    pub fn requires_payload(&self) -> bool {
        !matches!(self, InboundChannel::WheelTimer)
    }
}

impl fmt::Display for InboundChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InboundChannel {
    type Err = RelayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| RelayError::UnknownChannel(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_known_channel() {
        for channel in InboundChannel::ALL {
            assert_eq!(channel.as_str().parse::<InboundChannel>().unwrap(), channel);
        }
    }

    #[test]
    fn dotted_names_are_exact() {
        assert_eq!(
            "jackpot.timer".parse::<InboundChannel>().unwrap(),
            InboundChannel::JackpotTimer
        );
        assert!("jackpot_timer".parse::<InboundChannel>().is_err());
    }

    #[test]
    fn unknown_channel_is_rejected() {
        let err = "lottery".parse::<InboundChannel>().unwrap_err();
        assert!(matches!(err, RelayError::UnknownChannel(name) if name == "lottery"));
    }

    #[test]
    fn only_wheel_timer_skips_payload() {
        let payload_free: Vec<_> = InboundChannel::ALL
            .iter()
            .filter(|c| !c.requires_payload())
            .collect();
        assert_eq!(payload_free, vec![&InboundChannel::WheelTimer]);
    }

    #[test]
    fn names_lists_all_eight() {
        let names = InboundChannel::names();
        assert_eq!(names.len(), 8);
        assert!(names.contains(&"jackpot.newBet"));
    }
}
