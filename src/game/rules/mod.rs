//! Chess rules module - the rules oracle consumed by the session
//!
//! Legality, resulting positions and terminal conditions are all delegated to
//! `shakmaty`. Nothing in the session generates moves itself; every move,
//! human or engine, is resolved through [`apply_move`].
//!
//! # Module Structure
//!
//! - `oracle` - Pure functions over `shakmaty::Chess` positions
//!
//! Squares, roles and pieces are `shakmaty` types throughout the crate so the
//! oracle boundary needs no coordinate conversion.

pub mod oracle;


use serde::{Deserialize, Serialize};
use shakmaty::Color;

pub use oracle::{
    apply_move, fullmove_number, is_checkmate, is_fifty_move_draw, is_insufficient_material,
    is_stalemate, legal_destinations, piece_at, position_from_fen, repetition_key, serialize,
    side_to_move,
};
pub use shakmaty::{Chess, Piece, Role, Square};

/// One of the two players
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    White,
    Black,
}

impl Side {
    pub fn opposite(self) -> Self {
        match self {
            Side::White => Side::Black,
            Side::Black => Side::White,
        }
    }

    /// Single-letter tag used in move descriptions ("W made a capture")
    pub fn letter(self) -> char {
        match self {
            Side::White => 'W',
            Side::Black => 'B',
        }
    }
}

impl From<Color> for Side {
    fn from(color: Color) -> Self {
        match color {
            Color::White => Side::White,
            Color::Black => Side::Black,
        }
    }
}

impl From<Side> for Color {
    fn from(side: Side) -> Self {
        match side {
            Side::White => Color::White,
            Side::Black => Color::Black,
        }
    }
}
