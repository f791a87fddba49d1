//! Move history tracking
//!
//! Maintains the chronological record of every accepted move. The record is
//! append-only during play and cleared wholesale on reset, so replaying it
//! from the start position always reproduces the current position.
//!
//! # Architecture
//!
//! `MoveHistory` stores a `Vec<MoveRecord>` where each record contains:
//! - From/to squares and the promotion piece, if any
//! - The moving role and side
//! - Captured role (if any)
//! - A [`MoveFlag`] classifying the move (quiet, capture, castle, ...)
//! - SAN with check/mate suffix for the move list display
//!
//! # Integration
//!
//! Written only by [`crate::game::resources::PositionStore`] after the rules
//! oracle accepts a move. Read by the engine bridge (UCI move list) and by
//! the session facade (move list and move descriptions).

use crate::game::rules::{Role, Side, Square};
use serde::Serialize;

/// How a move changed the board
///
/// Mirrors the classic single-letter move flags (n, b, e, c, p, k, q, pc).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveFlag {
    /// Non-capturing move
    Quiet,
    /// Pawn advanced two squares
    BigPawnPush,
    /// Pawn captured en passant
    EnPassant,
    /// Ordinary capture
    Capture,
    /// Pawn promoted without capturing
    Promotion,
    /// Pawn captured on the last rank and promoted
    PromotionCapture,
    /// King castled toward the h-file
    KingsideCastle,
    /// King castled toward the a-file
    QueensideCastle,
}

impl MoveFlag {
    /// Human-readable description for the side that moved
    pub fn description(self, side: Side) -> String {
        let color = side.letter();
        match self {
            MoveFlag::Quiet => format!("{color} made a non-capture"),
            MoveFlag::BigPawnPush => format!("{color} made a pawn push of two squares"),
            MoveFlag::EnPassant => format!("{color} made an en passant capture"),
            MoveFlag::Capture => format!("{color} made a standard capture"),
            MoveFlag::Promotion => format!("{color} made a promotion"),
            MoveFlag::KingsideCastle => format!("{color} made a kingside castling"),
            MoveFlag::QueensideCastle => format!("{color} made a queenside castling"),
            MoveFlag::PromotionCapture => {
                format!("{color}'s pawn captured a piece on the 8th rank and promoted.")
            }
        }
    }

    pub fn is_capture(self) -> bool {
        matches!(
            self,
            MoveFlag::Capture | MoveFlag::EnPassant | MoveFlag::PromotionCapture
        )
    }
}

/// One accepted move. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveRecord {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<Role>,
    pub captured: Option<Role>,
    pub role: Role,
    pub flag: MoveFlag,
    pub side: Side,
    pub san: String,
}

impl MoveRecord {
    /// UCI token, e.g. `e2e4` or `e7e8q`
    pub fn uci(&self) -> String {
        match self.promotion {
            Some(role) => format!("{}{}{}", self.from, self.to, role.char()),
            None => format!("{}{}", self.from, self.to),
        }
    }

    pub fn is_capture(&self) -> bool {
        self.captured.is_some()
    }

    pub fn description(&self) -> String {
        self.flag.description(self.side)
    }
}

/// Serializable view of one history entry for presentation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    /// Zero-based ply index
    pub ply: usize,
    /// "1." on White's moves, empty on Black's ("5..." if the game opens with Black)
    pub move_number: String,
    pub san: String,
    pub uci: String,
    pub side: Side,
    pub flag: MoveFlag,
    pub description: String,
    pub captured: bool,
}

/// Complete move history for the current game
///
/// Index 0 = first ply played from the start position.
#[derive(Debug, Default, Clone)]
pub struct MoveHistory {
    moves: Vec<MoveRecord>,
}

impl MoveHistory {
    /// Append an accepted move
    pub fn add_move(&mut self, record: MoveRecord) {
        self.moves.push(record);
    }

    pub fn last_move(&self) -> Option<&MoveRecord> {
        self.moves.last()
    }

    /// Number of plies played
    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    /// Clear all move history (for starting a new game)
    pub fn clear(&mut self) {
        self.moves.clear();
    }

    pub fn get_move(&self, index: usize) -> Option<&MoveRecord> {
        self.moves.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MoveRecord> {
        self.moves.iter()
    }

    pub fn as_slice(&self) -> &[MoveRecord] {
        &self.moves
    }

    /// UCI tokens in play order, as sent after `position ... moves`
    pub fn uci_moves(&self) -> Vec<String> {
        self.moves.iter().map(MoveRecord::uci).collect()
    }

    /// Presentation view for a game from the standard start position
    pub fn entries(&self) -> Vec<HistoryEntry> {
        self.entries_from(1, Side::White)
    }

    /// Presentation view with move numbers on White's plies
    ///
    /// `first_move_number` and `first_side` describe the position the first
    /// recorded ply was played from. A game that opens with Black's ply
    /// labels it `"N..."`.
    pub fn entries_from(&self, first_move_number: u32, first_side: Side) -> Vec<HistoryEntry> {
        let offset = usize::from(first_side == Side::Black);
        self.moves
            .iter()
            .enumerate()
            .map(|(ply, record)| {
                let number = first_move_number as usize + (ply + offset) / 2;
                let move_number = match record.side {
                    Side::White => format!("{number}."),
                    Side::Black if ply == 0 => format!("{number}..."),
                    Side::Black => String::new(),
                };
                HistoryEntry {
                    ply,
                    move_number,
                    san: record.san.clone(),
                    uci: record.uci(),
                    side: record.side,
                    flag: record.flag,
                    description: record.description(),
                    captured: record.is_capture(),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pawn_push(from: Square, to: Square, side: Side, san: &str) -> MoveRecord {
        MoveRecord {
            from,
            to,
            promotion: None,
            captured: None,
            role: Role::Pawn,
            flag: MoveFlag::BigPawnPush,
            side,
            san: san.to_string(),
        }
    }

    #[test]
    fn test_move_history_default() {
        //! Verifies MoveHistory starts empty
        let history = MoveHistory::default();

        assert!(history.is_empty());
        assert_eq!(history.len(), 0);
        assert!(history.last_move().is_none());
    }

    #[test]
    fn test_add_and_clear() {
        let mut history = MoveHistory::default();
        history.add_move(pawn_push(Square::E2, Square::E4, Side::White, "e4"));
        history.add_move(pawn_push(Square::E7, Square::E5, Side::Black, "e5"));

        assert_eq!(history.len(), 2);
        assert_eq!(history.last_move().unwrap().san, "e5");
        assert_eq!(history.get_move(0).unwrap().from, Square::E2);

        history.clear();
        assert!(history.is_empty());
    }

    #[test]
    fn test_uci_moves_in_play_order() {
        let mut history = MoveHistory::default();
        history.add_move(pawn_push(Square::E2, Square::E4, Side::White, "e4"));
        history.add_move(pawn_push(Square::E7, Square::E5, Side::Black, "e5"));

        assert_eq!(history.uci_moves(), vec!["e2e4", "e7e5"]);
    }

    #[test]
    fn test_promotion_token_carries_piece_letter() {
        let record = MoveRecord {
            from: Square::E7,
            to: Square::E8,
            promotion: Some(Role::Queen),
            captured: None,
            role: Role::Pawn,
            flag: MoveFlag::Promotion,
            side: Side::White,
            san: "e8=Q".to_string(),
        };
        assert_eq!(record.uci(), "e7e8q");
    }

    #[test]
    fn test_entries_number_white_plies() {
        let mut history = MoveHistory::default();
        history.add_move(pawn_push(Square::E2, Square::E4, Side::White, "e4"));
        history.add_move(pawn_push(Square::E7, Square::E5, Side::Black, "e5"));
        history.add_move(pawn_push(Square::D2, Square::D4, Side::White, "d4"));

        let entries = history.entries();
        assert_eq!(entries[0].move_number, "1.");
        assert_eq!(entries[1].move_number, "");
        assert_eq!(entries[2].move_number, "2.");
        assert_eq!(entries[1].description, "B made a pawn push of two squares");
    }

    #[test]
    fn test_entries_from_black_to_move_start() {
        //! Black's opening ply in move 12 reads "12...", White's reply "13."
        let mut history = MoveHistory::default();
        history.add_move(pawn_push(Square::E7, Square::E5, Side::Black, "e5"));
        history.add_move(pawn_push(Square::D2, Square::D4, Side::White, "d4"));
        history.add_move(pawn_push(Square::D7, Square::D5, Side::Black, "d5"));

        let entries = history.entries_from(12, Side::Black);
        assert_eq!(entries[0].move_number, "12...");
        assert_eq!(entries[1].move_number, "13.");
        assert_eq!(entries[2].move_number, "");
    }

    #[test]
    fn test_flag_descriptions() {
        assert_eq!(
            MoveFlag::Quiet.description(Side::White),
            "W made a non-capture"
        );
        assert_eq!(
            MoveFlag::QueensideCastle.description(Side::Black),
            "B made a queenside castling"
        );
        assert_eq!(
            MoveFlag::PromotionCapture.description(Side::White),
            "W's pawn captured a piece on the 8th rank and promoted."
        );
    }

    #[test]
    fn test_capture_flags() {
        assert!(MoveFlag::EnPassant.is_capture());
        assert!(MoveFlag::PromotionCapture.is_capture());
        assert!(!MoveFlag::BigPawnPush.is_capture());
        assert!(!MoveFlag::KingsideCastle.is_capture());
    }
}
