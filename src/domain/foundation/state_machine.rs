//! State machine trait for round phase enums.
//!
//! Provides a consistent interface for validating phase transitions across
//! the wheel and jackpot round machines.

use super::TransitionError;

/// Trait for phase enums that represent state machines.
///
/// Implementors define valid transitions and get validated transition
/// methods for free.
///
/// # Example
///
/// ```ignore
/// impl StateMachine for WheelPhase {
///     fn can_transition_to(&self, target: &Self) -> bool {
///         matches!((self, target), (CountingDown, Spinning) | (_, Resetting) /* ... */)
///     }
///     // ...
/// }
///
/// let next = round.phase().transition_to(WheelPhase::Spinning)?;
/// ```
pub trait StateMachine: Sized + Copy + PartialEq + std::fmt::Debug {
    /// Round name used in transition errors.
    const NAME: &'static str;

    /// Returns true if transition from self to target is valid.
    fn can_transition_to(&self, target: &Self) -> bool;

    /// Returns all valid target states from current state.
    fn valid_transitions(&self) -> Vec<Self>;

    /// Performs transition with validation, returning error if invalid.
    fn transition_to(&self, target: Self) -> Result<Self, TransitionError> {
        if self.can_transition_to(&target) {
            Ok(target)
        } else {
            Err(TransitionError {
                machine: Self::NAME,
                from: format!("{:?}", self),
                to: format!("{:?}", target),
            })
        }
    }

    /// Checks if current state is terminal (no valid outgoing transitions).
    fn is_terminal(&self) -> bool {
        self.valid_transitions().is_empty()
    }
}
