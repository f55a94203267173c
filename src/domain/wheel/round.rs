//! The wheel round aggregate.
//!
//! Pure, clock-free state: the scheduler feeds it one `tick()` per second
//! and executes what comes back. Nothing here sleeps or performs I/O.

use serde::Serialize;

use crate::domain::foundation::{RoundEpoch, StateMachine, TransitionError};
use crate::domain::relay::OutboundEvent;

use super::phase::WheelPhase;

/// Round windows, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WheelSettings {
    /// Betting countdown before the spin.
    pub countdown_secs: u32,
    /// Spin animation window.
    pub spin_secs: u32,
}

impl Default for WheelSettings {
    fn default() -> Self {
        Self {
            countdown_secs: 15,
            spin_secs: 15,
        }
    }
}

/// Result of closing bets, as decided by the rules backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WheelOutcome {
    pub spin_value: i64,
    pub last_color: String,
    pub game_id: i64,
}

/// What one second of wheel time produced.
#[derive(Debug, Clone, PartialEq)]
pub enum WheelTick {
    /// No ticker should be running in this phase.
    Idle,
    /// Countdown second: `wheel_start(n)`.
    Countdown(OutboundEvent),
    /// Countdown hit zero: broadcast `wheel_start(0)`, stop ticking and
    /// close bets under `epoch`. The spin starts once the result is in.
    BetsClosing {
        event: OutboundEvent,
        epoch: RoundEpoch,
    },
    /// Spin second: `wheel_roll`.
    Roll(OutboundEvent),
    /// Final spin second. Broadcast it and reset the round.
    RoundOver(OutboundEvent),
}

/// Read-only view for health checks and tests.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WheelSnapshot {
    pub phase: WheelPhase,
    pub seconds_remaining: u32,
    pub spin_value: i64,
    pub last_color: String,
    pub game_id: i64,
    pub epoch: RoundEpoch,
}

/// In-memory wheel round state. Lives for the whole process and is reset,
/// never replaced, between rounds.
#[derive(Debug, Clone)]
pub struct WheelRound {
    settings: WheelSettings,
    phase: WheelPhase,
    seconds_remaining: u32,
    spin_value: i64,
    last_color: String,
    game_id: i64,
    epoch: RoundEpoch,
    awaiting_outcome: bool,
}

impl WheelRound {
    pub fn new(settings: WheelSettings) -> Self {
        Self {
            settings,
            phase: WheelPhase::Idle,
            seconds_remaining: 0,
            spin_value: 0,
            last_color: String::new(),
            game_id: 0,
            epoch: RoundEpoch::default(),
            awaiting_outcome: false,
        }
    }

    pub fn phase(&self) -> WheelPhase {
        self.phase
    }

    pub fn epoch(&self) -> RoundEpoch {
        self.epoch
    }

    pub fn seconds_remaining(&self) -> u32 {
        self.seconds_remaining
    }

    pub fn settings(&self) -> WheelSettings {
        self.settings
    }

    /// True once the wheel has left Idle. A plain start request is ignored
    /// while this holds.
    pub fn is_active(&self) -> bool {
        self.phase != WheelPhase::Idle
    }

    /// True between `BetsClosing` and the spin being armed.
    pub fn is_awaiting_outcome(&self) -> bool {
        self.awaiting_outcome
    }

    /// Start a fresh countdown from the full window, whatever the phase.
    ///
    /// Returns the opening `wheel_start(window)` event. The first tick
    /// reports one second less, so nobody loses a second to the ticker's
    /// initial latency.
    pub fn begin_countdown(&mut self) -> Result<OutboundEvent, TransitionError> {
        self.enter(WheelPhase::CountingDown)?;
        self.epoch = self.epoch.next();
        self.awaiting_outcome = false;
        self.seconds_remaining = self.settings.countdown_secs.saturating_sub(1);
        Ok(OutboundEvent::wheel_start(self.settings.countdown_secs))
    }

    /// Advance one second.
    pub fn tick(&mut self) -> Result<WheelTick, TransitionError> {
        match self.phase {
            WheelPhase::CountingDown => {
                if self.seconds_remaining >= 1 {
                    let event = OutboundEvent::wheel_start(self.seconds_remaining);
                    self.seconds_remaining -= 1;
                    return Ok(WheelTick::Countdown(event));
                }
                self.enter(WheelPhase::Spinning)?;
                self.awaiting_outcome = true;
                Ok(WheelTick::BetsClosing {
                    event: OutboundEvent::wheel_start(0),
                    epoch: self.epoch,
                })
            }
            WheelPhase::Spinning if !self.awaiting_outcome => {
                let event = OutboundEvent::wheel_roll(self.seconds_remaining, self.spin_value);
                if self.seconds_remaining == 0 {
                    return Ok(WheelTick::RoundOver(event));
                }
                self.seconds_remaining -= 1;
                Ok(WheelTick::Roll(event))
            }
            WheelPhase::Spinning | WheelPhase::Idle | WheelPhase::Resetting => Ok(WheelTick::Idle),
        }
    }

    /// Store a close-bets result issued under `epoch`.
    ///
    /// Returns false, leaving the round untouched, when the result belongs
    /// to a round that has since been restarted.
    pub fn record_outcome(&mut self, epoch: RoundEpoch, outcome: WheelOutcome) -> bool {
        if epoch != self.epoch {
            return false;
        }
        self.spin_value = outcome.spin_value;
        self.last_color = outcome.last_color;
        self.game_id = outcome.game_id;
        true
    }

    /// Arm the spin window once bets are closed (or failed to close).
    ///
    /// Returns false when there is no pending close for `epoch`, in which
    /// case the caller must not arm a spin ticker.
    pub fn begin_spin(&mut self, epoch: RoundEpoch) -> bool {
        if epoch != self.epoch || self.phase != WheelPhase::Spinning || !self.awaiting_outcome {
            return false;
        }
        self.awaiting_outcome = false;
        self.seconds_remaining = self.settings.spin_secs;
        true
    }

    /// Emergency stop. Returns the epoch the close-bets call belongs to.
    pub fn stop(&mut self) -> Result<RoundEpoch, TransitionError> {
        self.enter(WheelPhase::Resetting)?;
        self.awaiting_outcome = false;
        Ok(self.epoch)
    }

    /// Settle the round. Returns the `wheel_clear` event to broadcast.
    pub fn begin_reset(&mut self) -> Result<OutboundEvent, TransitionError> {
        self.enter(WheelPhase::Resetting)?;
        self.awaiting_outcome = false;
        self.seconds_remaining = self.settings.countdown_secs;
        Ok(OutboundEvent::wheel_clear(&self.last_color, self.game_id))
    }

    pub fn snapshot(&self) -> WheelSnapshot {
        WheelSnapshot {
            phase: self.phase,
            seconds_remaining: self.seconds_remaining,
            spin_value: self.spin_value,
            last_color: self.last_color.clone(),
            game_id: self.game_id,
            epoch: self.epoch,
        }
    }

    fn enter(&mut self, target: WheelPhase) -> Result<(), TransitionError> {
        self.phase = self.phase.transition_to(target)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::relay::OutboundTopic;
    use serde_json::json;

    fn outcome(spin: i64, color: &str, game: i64) -> WheelOutcome {
        WheelOutcome {
            spin_value: spin,
            last_color: color.to_string(),
            game_id: game,
        }
    }

    fn small_round() -> WheelRound {
        WheelRound::new(WheelSettings {
            countdown_secs: 3,
            spin_secs: 2,
        })
    }

    #[test]
    fn new_round_is_idle() {
        let round = WheelRound::new(WheelSettings::default());
        assert_eq!(round.phase(), WheelPhase::Idle);
        assert!(!round.is_active());
        assert_eq!(round.snapshot().game_id, 0);
    }

    #[test]
    fn idle_tick_does_nothing() {
        let mut round = small_round();
        assert_eq!(round.tick().unwrap(), WheelTick::Idle);
    }

    #[test]
    fn countdown_opens_with_full_window_then_counts_down() {
        let mut round = small_round();
        let opening = round.begin_countdown().unwrap();
        assert_eq!(opening, OutboundEvent::wheel_start(3));

        assert_eq!(
            round.tick().unwrap(),
            WheelTick::Countdown(OutboundEvent::wheel_start(2))
        );
        assert_eq!(
            round.tick().unwrap(),
            WheelTick::Countdown(OutboundEvent::wheel_start(1))
        );

        let epoch = round.epoch();
        assert_eq!(
            round.tick().unwrap(),
            WheelTick::BetsClosing {
                event: OutboundEvent::wheel_start(0),
                epoch
            }
        );
        assert_eq!(round.phase(), WheelPhase::Spinning);
        assert!(round.is_awaiting_outcome());
    }

    #[test]
    fn spin_waits_for_outcome() {
        let mut round = small_round();
        round.begin_countdown().unwrap();
        for _ in 0..3 {
            round.tick().unwrap();
        }

        assert_eq!(round.tick().unwrap(), WheelTick::Idle);

        let epoch = round.epoch();
        assert!(round.record_outcome(epoch, outcome(27, "red", 9)));
        assert!(round.begin_spin(epoch));
        assert!(!round.begin_spin(epoch));

        assert_eq!(
            round.tick().unwrap(),
            WheelTick::Roll(OutboundEvent::wheel_roll(2, 27))
        );
        assert_eq!(
            round.tick().unwrap(),
            WheelTick::Roll(OutboundEvent::wheel_roll(1, 27))
        );
        assert_eq!(
            round.tick().unwrap(),
            WheelTick::RoundOver(OutboundEvent::wheel_roll(0, 27))
        );
    }

    #[test]
    fn reset_reports_last_outcome() {
        let mut round = small_round();
        round.begin_countdown().unwrap();
        let epoch = round.epoch();
        round.record_outcome(epoch, outcome(5, "black", 311));

        let clear = round.begin_reset().unwrap();
        assert_eq!(clear.topic, OutboundTopic::WheelClear);
        assert_eq!(clear.payload["last"]["data"], json!("black"));
        assert_eq!(clear.payload["game"]["id"], json!(311));
        assert_eq!(round.phase(), WheelPhase::Resetting);
    }

    #[test]
    fn stale_outcome_is_discarded() {
        let mut round = small_round();
        round.begin_countdown().unwrap();
        let old = round.epoch();
        round.begin_countdown().unwrap();

        assert!(!round.record_outcome(old, outcome(1, "green", 2)));
        assert_eq!(round.snapshot().last_color, "");
        assert!(!round.begin_spin(old));
    }

    #[test]
    fn failed_close_still_spins_with_previous_values() {
        let mut round = small_round();
        round.begin_countdown().unwrap();
        let first = round.epoch();
        round.record_outcome(first, outcome(13, "red", 1));

        round.begin_countdown().unwrap();
        for _ in 0..3 {
            round.tick().unwrap();
        }
        let second = round.epoch();
        assert!(round.begin_spin(second));
        assert_eq!(
            round.tick().unwrap(),
            WheelTick::Roll(OutboundEvent::wheel_roll(2, 13))
        );
    }

    #[test]
    fn stop_moves_to_resetting_from_any_phase() {
        let mut round = small_round();
        assert!(round.stop().is_ok());
        assert_eq!(round.phase(), WheelPhase::Resetting);
        assert_eq!(round.tick().unwrap(), WheelTick::Idle);

        round.begin_countdown().unwrap();
        round.tick().unwrap();
        let epoch = round.stop().unwrap();
        assert_eq!(epoch, round.epoch());
    }

    #[test]
    fn reload_bumps_epoch_and_restarts_window() {
        let mut round = small_round();
        round.begin_countdown().unwrap();
        round.tick().unwrap();
        let before = round.epoch();

        round.begin_countdown().unwrap();
        assert!(round.epoch() > before);
        assert_eq!(round.seconds_remaining(), 2);
    }

    #[test]
    fn full_default_round_emits_n_plus_one_starts_and_m_plus_one_rolls() {
        let mut round = WheelRound::new(WheelSettings::default());
        let mut starts = 1; // opening event
        let mut rolls = 0;
        round.begin_countdown().unwrap();

        loop {
            match round.tick().unwrap() {
                WheelTick::Countdown(_) => starts += 1,
                WheelTick::BetsClosing { epoch, .. } => {
                    starts += 1;
                    round.begin_spin(epoch);
                }
                WheelTick::Roll(_) => rolls += 1,
                WheelTick::RoundOver(_) => {
                    rolls += 1;
                    break;
                }
                WheelTick::Idle => panic!("wheel stalled"),
            }
        }

        assert_eq!(starts, 16);
        assert_eq!(rolls, 16);
    }
}
