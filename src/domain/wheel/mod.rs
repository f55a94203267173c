//! Wheel game - timer-driven betting, spin and reset cycle.

mod phase;
mod round;

pub use phase::WheelPhase;
pub use round::{WheelOutcome, WheelRound, WheelSettings, WheelSnapshot, WheelTick};
