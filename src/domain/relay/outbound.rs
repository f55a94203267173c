//! Client-facing events.
//!
//! Every event a connected client can receive is named by an
//! [`OutboundTopic`]. Names sourced from the `wheel` channel are only
//! accepted when they appear in the configured
//! [`WheelEventTypes`](super::WheelEventTypes) allow-list.

use std::fmt;

use serde::{Serialize, Serializer};
use serde_json::{json, Value};

/// Name of an event pushed to clients.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OutboundTopic {
    Live,
    WheelStart,
    WheelRoll,
    WheelClear,
    Withdraw,
    Test,
    JackpotNewBet,
    JackpotTimer,
    JackpotNgTimer,
    JackpotSlider,
    JackpotNewGame,
    Crash,
    /// Allow-listed event published on the `wheel` channel.
    Wheel(String),
}

impl OutboundTopic {
    const FIXED: [OutboundTopic; 12] = [
        OutboundTopic::Live,
        OutboundTopic::WheelStart,
        OutboundTopic::WheelRoll,
        OutboundTopic::WheelClear,
        OutboundTopic::Withdraw,
        OutboundTopic::Test,
        OutboundTopic::JackpotNewBet,
        OutboundTopic::JackpotTimer,
        OutboundTopic::JackpotNgTimer,
        OutboundTopic::JackpotSlider,
        OutboundTopic::JackpotNewGame,
        OutboundTopic::Crash,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            OutboundTopic::Live => "live",
            OutboundTopic::WheelStart => "wheel_start",
            OutboundTopic::WheelRoll => "wheel_roll",
            OutboundTopic::WheelClear => "wheel_clear",
            OutboundTopic::Withdraw => "withdraw",
            OutboundTopic::Test => "test",
            OutboundTopic::JackpotNewBet => "jackpot.newBet",
            OutboundTopic::JackpotTimer => "jackpot.timer",
            OutboundTopic::JackpotNgTimer => "jackpot.ngTimer",
            OutboundTopic::JackpotSlider => "jackpot.slider",
            OutboundTopic::JackpotNewGame => "jackpot.newGame",
            OutboundTopic::Crash => "crash",
            OutboundTopic::Wheel(name) => name.as_str(),
        }
    }

    /// Whether `name` is one of the fixed event names.
    pub fn is_reserved(name: &str) -> bool {
        Self::FIXED.iter().any(|topic| topic.as_str() == name)
    }
}

impl fmt::Display for OutboundTopic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for OutboundTopic {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// An event addressed to every connected client.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutboundEvent {
    #[serde(rename = "event")]
    pub topic: OutboundTopic,
    #[serde(rename = "data")]
    pub payload: Value,
}

impl OutboundEvent {
    pub fn new(topic: OutboundTopic, payload: Value) -> Self {
        Self { topic, payload }
    }

    /// `live {count}`
    pub fn live(count: usize) -> Self {
        Self::new(OutboundTopic::Live, json!({ "count": count }))
    }

    /// `wheel_start <seconds>`
    pub fn wheel_start(seconds: u32) -> Self {
        Self::new(OutboundTopic::WheelStart, json!(seconds))
    }

    /// `wheel_roll {timer: {data}, roll: {data}}`
    pub fn wheel_roll(timer: u32, spin_value: i64) -> Self {
        Self::new(
            OutboundTopic::WheelRoll,
            json!({ "timer": { "data": timer }, "roll": { "data": spin_value } }),
        )
    }

    /// `wheel_clear {clear, last, game}`
    pub fn wheel_clear(last_color: &str, game_id: i64) -> Self {
        Self::new(
            OutboundTopic::WheelClear,
            json!({
                "clear": { "data": "clear_all" },
                "last": { "data": last_color },
                "game": { "id": game_id },
            }),
        )
    }

    /// `jackpot.timer {min, sec, time, timer}`
    pub fn jackpot_timer(min: i64, sec: i64, time: i64, total: i64) -> Self {
        Self::new(
            OutboundTopic::JackpotTimer,
            json!({ "min": min, "sec": sec, "time": time, "timer": total }),
        )
    }

    /// `jackpot.ngTimer {ngtime}`
    pub fn jackpot_ng_timer(ngtime: u32) -> Self {
        Self::new(OutboundTopic::JackpotNgTimer, json!({ "ngtime": ngtime }))
    }

    pub fn jackpot_slider(result: Value) -> Self {
        Self::new(OutboundTopic::JackpotSlider, result)
    }

    pub fn jackpot_new_game(result: Value) -> Self {
        Self::new(OutboundTopic::JackpotNewGame, result)
    }
}
