//! Jackpot game - countdown, pre-finish signal, build-up and new-game cycle.

mod phase;
mod round;

pub use phase::JackpotPhase;
pub use round::{JackpotRound, JackpotSettings, JackpotSnapshot, JackpotTick, JackpotTimerRequest};
