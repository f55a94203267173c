//! The jackpot round aggregate.
//!
//! Like the wheel, this is pure state advanced one second at a time by the
//! scheduler.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{RoundEpoch, StateMachine, TransitionError};
use crate::domain::relay::OutboundEvent;

use super::phase::JackpotPhase;

/// Countdown parameters published on `jackpot.timer`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JackpotTimerRequest {
    pub min: i64,
    pub sec: i64,
    pub time: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JackpotSettings {
    /// Length of the "new game" countdown.
    pub build_up_secs: u32,
    /// `time` at or below which the pre-finish signal fires.
    pub pre_finish_threshold_secs: i64,
}

impl Default for JackpotSettings {
    fn default() -> Self {
        Self {
            build_up_secs: 20,
            pre_finish_threshold_secs: 3,
        }
    }
}

/// What one second of jackpot time produced.
#[derive(Debug, Clone, PartialEq)]
pub enum JackpotTick {
    /// Nothing should be ticking.
    Idle,
    /// Regular countdown second. When `pre_finish` is set the backend must
    /// be told the round is about to close; this happens once per round.
    Countdown {
        event: OutboundEvent,
        pre_finish: bool,
    },
    /// Time ran out: stop ticking and fetch the slider for `epoch`.
    Expired { pre_finish: bool, epoch: RoundEpoch },
    /// Build-up second: `jackpot.ngTimer`.
    BuildUp(OutboundEvent),
    /// Last build-up second: broadcast it, stop ticking, create the next game.
    BuildUpFinished {
        event: OutboundEvent,
        epoch: RoundEpoch,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JackpotSnapshot {
    pub phase: JackpotPhase,
    pub minutes: i64,
    pub seconds_in_minute: i64,
    pub time_remaining: i64,
    pub total_duration: i64,
    pub pre_finish_fired: bool,
    pub build_up_remaining: u32,
    pub epoch: RoundEpoch,
}

#[derive(Debug, Clone)]
pub struct JackpotRound {
    settings: JackpotSettings,
    phase: JackpotPhase,
    minutes: i64,
    seconds_in_minute: i64,
    time_remaining: i64,
    total_duration: i64,
    pre_finish_fired: bool,
    build_up_remaining: u32,
    epoch: RoundEpoch,
}

impl JackpotRound {
    pub fn new(settings: JackpotSettings) -> Self {
        Self {
            settings,
            phase: JackpotPhase::Idle,
            minutes: 0,
            seconds_in_minute: 0,
            time_remaining: 0,
            total_duration: 0,
            pre_finish_fired: false,
            build_up_remaining: 0,
            epoch: RoundEpoch::default(),
        }
    }

    pub fn phase(&self) -> JackpotPhase {
        self.phase
    }

    pub fn epoch(&self) -> RoundEpoch {
        self.epoch
    }

    /// Begin a countdown, superseding whatever the round was doing.
    pub fn start(&mut self, request: JackpotTimerRequest) -> Result<RoundEpoch, TransitionError> {
        self.enter(JackpotPhase::Counting)?;
        self.epoch = self.epoch.next();
        self.minutes = request.min;
        self.seconds_in_minute = request.sec;
        self.time_remaining = request.time;
        self.total_duration = request.time;
        self.pre_finish_fired = false;
        self.build_up_remaining = 0;
        Ok(self.epoch)
    }

    /// Advance one second.
    pub fn tick(&mut self) -> Result<JackpotTick, TransitionError> {
        match self.phase {
            JackpotPhase::Counting | JackpotPhase::PreFinish => self.tick_countdown(),
            JackpotPhase::BuildUp => {
                self.build_up_remaining = self.build_up_remaining.saturating_sub(1);
                let event = OutboundEvent::jackpot_ng_timer(self.build_up_remaining);
                if self.build_up_remaining == 0 {
                    self.enter(JackpotPhase::NewGamePending)?;
                    return Ok(JackpotTick::BuildUpFinished {
                        event,
                        epoch: self.epoch,
                    });
                }
                Ok(JackpotTick::BuildUp(event))
            }
            JackpotPhase::Idle | JackpotPhase::Expired | JackpotPhase::NewGamePending => {
                Ok(JackpotTick::Idle)
            }
        }
    }

    fn tick_countdown(&mut self) -> Result<JackpotTick, TransitionError> {
        self.time_remaining = self.time_remaining.saturating_sub(1);
        self.seconds_in_minute = self.seconds_in_minute.saturating_sub(1);

        let pre_finish =
            !self.pre_finish_fired && self.time_remaining <= self.settings.pre_finish_threshold_secs;
        if pre_finish {
            self.pre_finish_fired = true;
            self.enter(JackpotPhase::PreFinish)?;
        }

        if self.seconds_in_minute <= 0 {
            if self.minutes <= 0 {
                self.enter(JackpotPhase::Expired)?;
                return Ok(JackpotTick::Expired {
                    pre_finish,
                    epoch: self.epoch,
                });
            }
            self.minutes -= 1;
            self.seconds_in_minute = 60;
        }

        Ok(JackpotTick::Countdown {
            event: OutboundEvent::jackpot_timer(
                self.minutes,
                self.seconds_in_minute,
                self.time_remaining,
                self.total_duration,
            ),
            pre_finish,
        })
    }

    /// Start the build-up countdown after the slider for `epoch` went out.
    ///
    /// Returns false when the round has moved on since.
    pub fn begin_build_up(&mut self, epoch: RoundEpoch) -> Result<bool, TransitionError> {
        if epoch != self.epoch || self.phase != JackpotPhase::Expired {
            return Ok(false);
        }
        self.enter(JackpotPhase::BuildUp)?;
        self.build_up_remaining = self.settings.build_up_secs;
        Ok(true)
    }

    /// Jump straight to new-game creation (backend reports the previous
    /// round already finished).
    pub fn await_new_game(&mut self) -> Result<RoundEpoch, TransitionError> {
        self.enter(JackpotPhase::NewGamePending)?;
        self.epoch = self.epoch.next();
        Ok(self.epoch)
    }

    /// Whether a new-game call issued under `epoch` is still wanted.
    pub fn is_new_game_pending(&self, epoch: RoundEpoch) -> bool {
        epoch == self.epoch && self.phase == JackpotPhase::NewGamePending
    }

    /// Record that the successor round exists. Returns false if stale.
    pub fn finish_new_game(&mut self, epoch: RoundEpoch) -> Result<bool, TransitionError> {
        if !self.is_new_game_pending(epoch) {
            return Ok(false);
        }
        self.enter(JackpotPhase::Idle)?;
        Ok(true)
    }

    pub fn snapshot(&self) -> JackpotSnapshot {
        JackpotSnapshot {
            phase: self.phase,
            minutes: self.minutes,
            seconds_in_minute: self.seconds_in_minute,
            time_remaining: self.time_remaining,
            total_duration: self.total_duration,
            pre_finish_fired: self.pre_finish_fired,
            build_up_remaining: self.build_up_remaining,
            epoch: self.epoch,
        }
    }

    fn enter(&mut self, target: JackpotPhase) -> Result<(), TransitionError> {
        self.phase = self.phase.transition_to(target)?;
        Ok(())
    }
}
