//! Game over state tracking and result management
//!
//! Terminal status is derived from the position after every accepted move,
//! never stored independently of it. What *is* stored is the banner: the
//! first terminal status observed in a game is frozen so presentation can
//! show it exactly once and keep showing the same result on every later
//! render, until an explicit reset.
//!
//! # Game Over Conditions
//!
//! ## Checkmate
//! - The side to move is in check with no legal moves; the other side wins
//!
//! ## Draw Conditions
//! - **Stalemate**: side to move has no legal moves but is NOT in check
//! - **InsufficientMaterial**: neither player can deliver checkmate (e.g., K vs K)
//! - **ThreefoldRepetition**: the same position with the same side to move and
//!   the same rights has occurred three times
//! - **FiftyMove**: one hundred plies without a capture or pawn move
//!
//! # Integration
//!
//! - [`crate::game::resources::PositionStore::terminal_reason`] computes the status
//! - [`crate::game::coordinator::TurnCoordinator`] freezes it into the banner
//! - [`crate::game::session::GameSession::take_game_over_notice`] hands it out once
//!
//! # Reference
//!
//! FIDE Laws of Chess: https://www.fide.com/FIDE/handbook/LawsOfChess.pdf
//! - Article 5: Checkmate, stalemate, draws
//! - Article 9: Threefold repetition and the fifty-move rule

use crate::game::rules::Side;
use serde::Serialize;

/// Why a drawn game ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DrawReason {
    /// One hundred plies without a capture or pawn move
    FiftyMove,
    /// Side to move has no legal moves and is not in check
    Stalemate,
    /// Same position occurred for the third time
    ThreefoldRepetition,
    /// Neither side can force mate
    InsufficientMaterial,
}

/// Result of a finished game
///
/// # State Transitions
///
/// ```text
/// (in progress) → Checkmate { winner } / Draw(reason)
/// ```
///
/// Both variants are terminal; only a session reset leaves them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TerminalStatus {
    /// The side to move was mated
    Checkmate { winner: Side },
    /// The game was drawn
    Draw { reason: DrawReason },
}

impl TerminalStatus {
    /// Get a human-readable message describing the game result
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// if let Some(status) = session.take_game_over_notice() {
    ///     println!("{}", status.message());
    ///     // Displays: "White wins by checkmate!" or "Draw by stalemate", etc.
    /// }
    /// ```
    pub fn message(&self) -> &'static str {
        match self {
            TerminalStatus::Checkmate { winner: Side::White } => "White wins by checkmate!",
            TerminalStatus::Checkmate { winner: Side::Black } => "Black wins by checkmate!",
            TerminalStatus::Draw { reason } => match reason {
                DrawReason::FiftyMove => "Draw by the fifty-move rule",
                DrawReason::Stalemate => "Draw by stalemate",
                DrawReason::ThreefoldRepetition => "Draw by threefold repetition",
                DrawReason::InsufficientMaterial => "Draw by insufficient material",
            },
        }
    }

    /// Get the winner of the game, if there is one
    ///
    /// # Returns
    ///
    /// - `Some(side)` - that side delivered checkmate
    /// - `None` - the game was drawn
    pub fn winner(&self) -> Option<Side> {
        match self {
            TerminalStatus::Checkmate { winner } => Some(*winner),
            TerminalStatus::Draw { .. } => None,
        }
    }

    pub fn is_draw(&self) -> bool {
        matches!(self, TerminalStatus::Draw { .. })
    }
}

/// Frozen terminal status plus whether presentation has been told about it
///
/// `freeze` keeps the first status it sees; later calls in the same game are
/// ignored so repeated renders cannot change or re-announce the result.
#[derive(Debug, Default, Clone)]
pub struct GameOverBanner {
    status: Option<TerminalStatus>,
    announced: bool,
}

impl GameOverBanner {
    /// Record the terminal status. Returns `true` only the first time.
    pub fn freeze(&mut self, status: TerminalStatus) -> bool {
        if self.status.is_some() {
            return false;
        }
        self.status = Some(status);
        self.announced = false;
        true
    }

    /// The frozen result, if the game is over
    pub fn status(&self) -> Option<TerminalStatus> {
        self.status
    }

    pub fn is_frozen(&self) -> bool {
        self.status.is_some()
    }

    /// Hand out the result once; `None` on every later call
    pub fn take_notice(&mut self) -> Option<TerminalStatus> {
        match self.status {
            Some(status) if !self.announced => {
                self.announced = true;
                Some(status)
            }
            _ => None,
        }
    }

    /// Forget the result (new game)
    pub fn clear(&mut self) {
        self.status = None;
        self.announced = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_banner_starts_empty() {
        let mut banner = GameOverBanner::default();
        assert!(!banner.is_frozen());
        assert_eq!(banner.take_notice(), None);
    }

    #[test]
    fn test_notice_is_delivered_once() {
        //! Repeated polling after the first notice must not re-trigger
        let mut banner = GameOverBanner::default();
        let mate = TerminalStatus::Checkmate { winner: Side::Black };

        assert!(banner.freeze(mate));
        assert_eq!(banner.take_notice(), Some(mate));
        assert_eq!(banner.take_notice(), None);
        assert_eq!(banner.status(), Some(mate), "Status stays frozen for display");
    }

    #[test]
    fn test_first_status_wins() {
        let mut banner = GameOverBanner::default();
        let mate = TerminalStatus::Checkmate { winner: Side::White };
        let draw = TerminalStatus::Draw { reason: DrawReason::Stalemate };

        assert!(banner.freeze(mate));
        assert!(!banner.freeze(draw));
        assert_eq!(banner.status(), Some(mate));
    }

    #[test]
    fn test_clear_allows_new_result() {
        let mut banner = GameOverBanner::default();
        banner.freeze(TerminalStatus::Draw { reason: DrawReason::FiftyMove });
        banner.take_notice();

        banner.clear();
        assert!(!banner.is_frozen());
        assert_eq!(banner.take_notice(), None, "Old result must not resurface");

        let draw = TerminalStatus::Draw { reason: DrawReason::InsufficientMaterial };
        assert!(banner.freeze(draw));
        assert_eq!(banner.take_notice(), Some(draw));
    }

    #[test]
    fn test_messages_and_winner() {
        let mate = TerminalStatus::Checkmate { winner: Side::Black };
        assert_eq!(mate.message(), "Black wins by checkmate!");
        assert_eq!(mate.winner(), Some(Side::Black));
        assert!(!mate.is_draw());

        let draw = TerminalStatus::Draw { reason: DrawReason::ThreefoldRepetition };
        assert_eq!(draw.message(), "Draw by threefold repetition");
        assert_eq!(draw.winner(), None);
        assert!(draw.is_draw());
    }
}
