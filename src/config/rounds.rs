//! Round timing configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RoundsConfig {
    #[serde(default)]
    pub wheel: WheelRoundConfig,

    #[serde(default)]
    pub jackpot: JackpotRoundConfig,
}

impl RoundsConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.wheel.validate()?;
        self.jackpot.validate()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WheelRoundConfig {
    /// Betting countdown in seconds
    #[serde(default = "default_countdown")]
    pub countdown_secs: u32,

    /// Spin animation window in seconds
    #[serde(default = "default_spin")]
    pub spin_secs: u32,

    /// Delay between an admin stop and the restart
    #[serde(default = "default_stop_delay")]
    pub stop_delay_ms: u64,

    /// Call the backend's wheel start/open endpoints on each countdown
    #[serde(default)]
    pub announce_bet_window: bool,
}

impl WheelRoundConfig {
    pub fn stop_delay(&self) -> Duration {
        Duration::from_millis(self.stop_delay_ms)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.countdown_secs == 0 {
            return Err(ValidationError::InvalidRoundWindow("wheel.countdown_secs"));
        }
        if self.spin_secs == 0 {
            return Err(ValidationError::InvalidRoundWindow("wheel.spin_secs"));
        }
        Ok(())
    }
}

impl Default for WheelRoundConfig {
    fn default() -> Self {
        Self {
            countdown_secs: default_countdown(),
            spin_secs: default_spin(),
            stop_delay_ms: default_stop_delay(),
            announce_bet_window: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct JackpotRoundConfig {
    /// Length of the "new game" countdown between rounds
    #[serde(default = "default_build_up")]
    pub build_up_secs: u32,

    /// Remaining seconds at which the backend is told the round is closing
    #[serde(default = "default_pre_finish_threshold")]
    pub pre_finish_threshold_secs: i64,

    /// Wait between failed new-game attempts
    #[serde(default = "default_new_game_retry")]
    pub new_game_retry_ms: u64,

    /// Ask the backend for the current round at startup
    #[serde(default = "default_recover")]
    pub recover_on_startup: bool,
}

impl JackpotRoundConfig {
    pub fn new_game_retry(&self) -> Duration {
        Duration::from_millis(self.new_game_retry_ms)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.build_up_secs == 0 {
            return Err(ValidationError::InvalidRoundWindow("jackpot.build_up_secs"));
        }
        if self.new_game_retry_ms == 0 {
            return Err(ValidationError::InvalidRoundWindow("jackpot.new_game_retry_ms"));
        }
        Ok(())
    }
}

impl Default for JackpotRoundConfig {
    fn default() -> Self {
        Self {
            build_up_secs: default_build_up(),
            pre_finish_threshold_secs: default_pre_finish_threshold(),
            new_game_retry_ms: default_new_game_retry(),
            recover_on_startup: default_recover(),
        }
    }
}

fn default_countdown() -> u32 {
    15
}

fn default_spin() -> u32 {
    15
}

fn default_stop_delay() -> u64 {
    500
}

fn default_build_up() -> u32 {
    20
}

fn default_pre_finish_threshold() -> i64 {
    3
}

fn default_new_game_retry() -> u64 {
    1000
}

fn default_recover() -> bool {
    true
}
