//! Jackpot round phases.

use serde::Serialize;

use crate::domain::foundation::StateMachine;

/// Where the jackpot is between its countdown and the next round.
///
/// ```text
/// Idle ─► Counting ─► PreFinish ─► Expired ─► BuildUp ─► NewGamePending ─► Idle
///            └──────────────────────┘
/// (any) ─► Counting            Idle ─► NewGamePending   (startup recovery)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JackpotPhase {
    /// Waiting for the backend to publish a countdown.
    #[default]
    Idle,
    Counting,
    /// Final seconds; the backend has been told the round is closing.
    PreFinish,
    Expired,
    /// "New game" countdown between rounds.
    BuildUp,
    NewGamePending,
}

impl StateMachine for JackpotPhase {
    const NAME: &'static str = "jackpot";

    fn can_transition_to(&self, target: &Self) -> bool {
        use JackpotPhase::*;
        matches!(
            (self, target),
            (_, Counting)
                | (Counting, PreFinish)
                | (Counting | PreFinish, Expired)
                | (Expired, BuildUp)
                | (BuildUp | Idle, NewGamePending)
                | (NewGamePending, Idle)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use JackpotPhase::*;
        match self {
            Idle => vec![Counting, NewGamePending],
            Counting => vec![Counting, PreFinish, Expired],
            PreFinish => vec![Counting, Expired],
            Expired => vec![Counting, BuildUp],
            BuildUp => vec![Counting, NewGamePending],
            NewGamePending => vec![Counting, Idle],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [JackpotPhase; 6] = [
        JackpotPhase::Idle,
        JackpotPhase::Counting,
        JackpotPhase::PreFinish,
        JackpotPhase::Expired,
        JackpotPhase::BuildUp,
        JackpotPhase::NewGamePending,
    ];

    #[test]
    fn any_phase_can_restart_counting() {
        for phase in ALL {
            assert!(phase.can_transition_to(&JackpotPhase::Counting));
        }
    }

    #[test]
    fn build_up_only_after_expiry() {
        for phase in ALL {
            assert_eq!(
                phase.can_transition_to(&JackpotPhase::BuildUp),
                phase == JackpotPhase::Expired
            );
        }
    }

    #[test]
    fn valid_transitions_agree_with_predicate() {
        for phase in ALL {
            for target in phase.valid_transitions() {
                assert!(phase.can_transition_to(&target), "{:?} -> {:?}", phase, target);
            }
            for target in ALL {
                if phase.can_transition_to(&target) {
                    assert!(phase.valid_transitions().contains(&target));
                }
            }
        }
    }
}
