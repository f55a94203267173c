//! Wheel round phases.

use serde::Serialize;

use crate::domain::foundation::StateMachine;

/// Where the wheel is in its betting/spin/reset cycle.
///
/// ```text
/// Idle ──► CountingDown ──► Spinning ──► Resetting ──► CountingDown ...
///               ▲  └────────────┴──────────► Resetting   (stop)
///               └── any phase (reload)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WheelPhase {
    #[default]
    Idle,
    CountingDown,
    Spinning,
    Resetting,
}

impl StateMachine for WheelPhase {
    const NAME: &'static str = "wheel";

    fn can_transition_to(&self, target: &Self) -> bool {
        use WheelPhase::*;
        matches!(
            (self, target),
            (_, CountingDown) | (CountingDown, Spinning) | (_, Resetting)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use WheelPhase::*;
        match self {
            CountingDown => vec![CountingDown, Spinning, Resetting],
            Idle | Spinning | Resetting => vec![CountingDown, Resetting],
        }
    }
}
