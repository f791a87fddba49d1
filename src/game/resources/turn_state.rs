//! Turn state management for game flow control
//!
//! Tracks which phase the game is in so the coordinator can serialize human
//! and engine turns and prevent race conditions such as a human move being
//! accepted while the engine is mid-search.

use serde::Serialize;
use tracing::error;

/// Coarse turn flow state
///
/// Prevents issues like:
/// - A human move landing while a search is outstanding
/// - A second search being requested before the first one answered
/// - Any move after the game has ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum TurnPhase {
    /// Human to move, or nothing pending
    ///
    /// Valid transitions: → AwaitingEngine, → Terminal
    #[default]
    Idle,

    /// One search is outstanding on the engine, tagged with its generation
    ///
    /// Valid transitions: → Idle, → AwaitingEngine (re-request), → Terminal
    AwaitingEngine { generation: u64 },

    /// Game has ended (checkmate or draw)
    ///
    /// Left only through a reset.
    Terminal,
}

impl TurnPhase {
    /// Check if this state allows human input
    pub fn accepts_input(&self) -> bool {
        matches!(self, TurnPhase::Idle)
    }

    /// Check if a search is outstanding
    pub fn is_awaiting_engine(&self) -> bool {
        matches!(self, TurnPhase::AwaitingEngine { .. })
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, TurnPhase::Terminal)
    }
}

/// Current turn phase plus a running count of transitions
#[derive(Debug, Clone, Default)]
pub struct TurnStateContext {
    /// What phase of the turn are we in?
    pub phase: TurnPhase,

    /// Number of searches requested this game
    pub searches_requested: u32,
}

impl TurnStateContext {
    /// Transition to the next turn phase
    ///
    /// Invalid transitions are logged and refused. Returns whether the
    /// transition happened.
    pub fn transition_to(&mut self, next_phase: TurnPhase) -> bool {
        let valid = match (self.phase, next_phase) {
            (TurnPhase::Idle, TurnPhase::AwaitingEngine { .. }) => true,
            (TurnPhase::Idle, TurnPhase::Terminal) => true,
            (TurnPhase::AwaitingEngine { .. }, TurnPhase::Idle) => true,
            (TurnPhase::AwaitingEngine { .. }, TurnPhase::AwaitingEngine { .. }) => true,
            (TurnPhase::AwaitingEngine { .. }, TurnPhase::Terminal) => true,
            (TurnPhase::Terminal, _) => false, // Terminal state
            _ => false,
        };

        if !valid {
            error!(
                "[TURN] Invalid turn state transition: {:?} -> {:?}",
                self.phase, next_phase
            );
            return false;
        }

        if next_phase.is_awaiting_engine() {
            self.searches_requested += 1;
        }
        self.phase = next_phase;
        true
    }

    /// Back to `Idle` for a new game
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turn_phase_accepts_input() {
        assert!(TurnPhase::Idle.accepts_input());
        assert!(!TurnPhase::AwaitingEngine { generation: 1 }.accepts_input());
        assert!(!TurnPhase::Terminal.accepts_input());
    }

    #[test]
    fn test_turn_state_context_default() {
        let ctx = TurnStateContext::default();
        assert_eq!(ctx.phase, TurnPhase::Idle);
        assert_eq!(ctx.searches_requested, 0);
    }

    #[test]
    fn test_valid_transitions() {
        let mut ctx = TurnStateContext::default();

        assert!(ctx.transition_to(TurnPhase::AwaitingEngine { generation: 1 }));
        assert!(ctx.transition_to(TurnPhase::AwaitingEngine { generation: 1 }));
        assert!(ctx.transition_to(TurnPhase::Idle));
        assert!(ctx.transition_to(TurnPhase::Terminal));
        assert_eq!(ctx.searches_requested, 2);
    }

    #[test]
    fn test_terminal_refuses_everything() {
        //! Only reset leaves Terminal
        let mut ctx = TurnStateContext::default();
        ctx.transition_to(TurnPhase::Terminal);

        assert!(!ctx.transition_to(TurnPhase::Idle));
        assert!(!ctx.transition_to(TurnPhase::AwaitingEngine { generation: 1 }));
        assert_eq!(ctx.phase, TurnPhase::Terminal);

        ctx.reset();
        assert_eq!(ctx.phase, TurnPhase::Idle);
    }

    #[test]
    fn test_idle_to_idle_is_refused() {
        let mut ctx = TurnStateContext::default();
        assert!(!ctx.transition_to(TurnPhase::Idle));
    }
}
