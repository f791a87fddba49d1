//! Position & history store
//!
//! The single authoritative game record. Holds the current `shakmaty`
//! position, the move history, and the repetition keys needed for
//! threefold detection. Every mutation goes through [`PositionStore::try_apply_move`],
//! which asks the rules oracle first and only then commits; a rejected move
//! leaves the store untouched.
//!
//! # Invariant
//!
//! Replaying `history()` from `initial()` through the oracle reproduces
//! `position()` exactly. [`PositionStore::replay`] performs that replay.

use super::game_over::{DrawReason, TerminalStatus};
use super::history::{HistoryEntry, MoveHistory, MoveRecord};
use crate::game::error::SessionResult;
use crate::game::rules::{self, Chess, Piece, Role, Side, Square};

/// Occurrences of one position that end the game as a draw
const REPETITION_LIMIT: usize = 3;

#[derive(Debug, Clone)]
pub struct PositionStore {
    initial: Chess,
    /// Start FEN when the game did not begin from the standard position
    start_fen: Option<String>,
    position: Chess,
    history: MoveHistory,
    /// Repetition key of every position reached, including the initial one
    seen: Vec<String>,
}

impl Default for PositionStore {
    fn default() -> Self {
        Self::from_initial(Chess::default(), None)
    }
}

impl PositionStore {
    /// Store starting from a FEN, or the standard position when `None`
    pub fn new(start_fen: Option<&str>) -> SessionResult<Self> {
        match start_fen {
            Some(fen) => {
                let initial = rules::position_from_fen(fen)?;
                Ok(Self::from_initial(initial, Some(fen.to_string())))
            }
            None => Ok(Self::default()),
        }
    }

    fn from_initial(initial: Chess, start_fen: Option<String>) -> Self {
        let seen = vec![rules::repetition_key(&initial)];
        Self {
            position: initial.clone(),
            initial,
            start_fen,
            history: MoveHistory::default(),
            seen,
        }
    }

    /// Validate a move with the oracle and commit it on success
    ///
    /// On rejection nothing changes and `IllegalMoveRejected` is returned.
    pub fn try_apply_move(
        &mut self,
        from: Square,
        to: Square,
        promotion: Option<Role>,
    ) -> SessionResult<MoveRecord> {
        let (next, record) = rules::apply_move(&self.position, from, to, promotion)?;
        self.seen.push(rules::repetition_key(&next));
        self.position = next;
        self.history.add_move(record.clone());
        Ok(record)
    }

    pub fn current_turn(&self) -> Side {
        rules::side_to_move(&self.position)
    }

    pub fn is_terminal(&self) -> bool {
        self.terminal_reason().is_some()
    }

    /// Why the game is over, or `None` while it is still in progress
    ///
    /// Checked in order: checkmate, stalemate, insufficient material,
    /// threefold repetition, fifty-move rule.
    pub fn terminal_reason(&self) -> Option<TerminalStatus> {
        let state = &self.position;
        if rules::is_checkmate(state) {
            return Some(TerminalStatus::Checkmate {
                winner: self.current_turn().opposite(),
            });
        }
        let reason = if rules::is_stalemate(state) {
            DrawReason::Stalemate
        } else if rules::is_insufficient_material(state) {
            DrawReason::InsufficientMaterial
        } else if self.is_threefold_repetition() {
            DrawReason::ThreefoldRepetition
        } else if rules::is_fifty_move_draw(state) {
            DrawReason::FiftyMove
        } else {
            return None;
        };
        Some(TerminalStatus::Draw { reason })
    }

    pub fn is_threefold_repetition(&self) -> bool {
        self.seen
            .last()
            .map(|current| self.seen.iter().filter(|key| *key == current).count())
            .is_some_and(|count| count >= REPETITION_LIMIT)
    }

    /// Back to the start position with an empty history
    pub fn reset(&mut self) {
        self.position = self.initial.clone();
        self.history.clear();
        self.seen = vec![rules::repetition_key(&self.initial)];
    }

    pub fn position(&self) -> &Chess {
        &self.position
    }

    pub fn initial(&self) -> &Chess {
        &self.initial
    }

    /// FEN of the custom start position, `None` for the standard one
    pub fn start_fen(&self) -> Option<&str> {
        self.start_fen.as_deref()
    }

    /// Current position as FEN
    pub fn fen(&self) -> String {
        rules::serialize(&self.position)
    }

    pub fn history(&self) -> &MoveHistory {
        &self.history
    }

    /// History view numbered from the start position's move counter
    pub fn history_entries(&self) -> Vec<HistoryEntry> {
        self.history.entries_from(
            rules::fullmove_number(&self.initial),
            rules::side_to_move(&self.initial),
        )
    }

    pub fn ply_count(&self) -> usize {
        self.history.len()
    }

    pub fn legal_destinations(&self, square: Square) -> Vec<Square> {
        rules::legal_destinations(&self.position, square)
    }

    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        rules::piece_at(&self.position, square)
    }

    /// Replay the history from the initial position through the oracle
    ///
    /// Fails if any recorded move is rejected on replay.
    pub fn replay(&self) -> SessionResult<Chess> {
        let mut state = self.initial.clone();
        for record in self.history.iter() {
            let (next, _) = rules::apply_move(&state, record.from, record.to, record.promotion)?;
            state = next;
        }
        Ok(state)
    }
}
