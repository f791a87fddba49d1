//! Rules oracle over `shakmaty` positions
//!
//! Every function here is pure: positions go in, positions or answers come
//! out. The position store is the only caller that keeps state.

use super::Side;
use crate::game::error::{SessionError, SessionResult};
use crate::game::resources::history::{MoveFlag, MoveRecord};
use shakmaty::fen::Fen;
use shakmaty::san::San;
use shakmaty::uci::UciMove;
use shakmaty::{
    CastlingMode, Chess, EnPassantMode, Move, Piece, Position, Rank, Role, Square,
};

/// Halfmove clock value at which the fifty-move rule applies
const FIFTY_MOVE_HALFMOVES: u32 = 100;

/// Parse a FEN string into a playable position
pub fn position_from_fen(fen: &str) -> SessionResult<Chess> {
    let parsed: Fen = fen.parse().map_err(|e| SessionError::InvalidPosition {
        message: format!("{fen}: {e}"),
    })?;
    parsed
        .into_position(CastlingMode::Standard)
        .map_err(|e| SessionError::InvalidPosition {
            message: format!("{fen}: {e}"),
        })
}

/// Validate and play a move given as from/to squares
///
/// `promotion` is only consulted when the move actually promotes; a missing
/// hint promotes to a queen. Returns the resulting position together with the
/// move record describing what happened.
pub fn apply_move(
    state: &Chess,
    from: Square,
    to: Square,
    promotion: Option<Role>,
) -> SessionResult<(Chess, MoveRecord)> {
    let legal = find_legal(state, from, to, promotion)
        .ok_or(SessionError::IllegalMoveRejected { from, to })?;

    let side = side_to_move(state);
    let san = San::from_move(state, &legal).to_string();

    let mut next = state.clone();
    next.play_unchecked(&legal);

    let suffix = if next.is_checkmate() {
        "#"
    } else if next.is_check() {
        "+"
    } else {
        ""
    };

    let record = MoveRecord {
        from,
        to,
        promotion: legal.promotion(),
        captured: legal.capture(),
        role: legal.role(),
        flag: classify(&legal),
        side,
        san: format!("{san}{suffix}"),
    };

    Ok((next, record))
}

/// Every square the piece on `square` may legally move to
///
/// Castling is reported with the king's destination (e1 → g1), and the four
/// promotion choices to one square collapse into a single entry.
pub fn legal_destinations(state: &Chess, square: Square) -> Vec<Square> {
    let mut destinations: Vec<Square> = state
        .legal_moves()
        .into_iter()
        .filter_map(|m| match m.to_uci(CastlingMode::Standard) {
            UciMove::Normal { from, to, .. } if from == square => Some(to),
            _ => None,
        })
        .collect();
    destinations.sort();
    destinations.dedup();
    destinations
}

pub fn side_to_move(state: &Chess) -> Side {
    state.turn().into()
}

/// Fullmove counter of the position, starting at 1
pub fn fullmove_number(state: &Chess) -> u32 {
    state.fullmoves().get()
}

pub fn piece_at(state: &Chess, square: Square) -> Option<Piece> {
    state.board().piece_at(square)
}

/// Full FEN of the position
pub fn serialize(state: &Chess) -> String {
    Fen::from_position(state.clone(), EnPassantMode::Legal).to_string()
}

/// Placement, side to move, castling rights and capturable en passant square
///
/// Two positions with the same key count as the same position for
/// threefold repetition.
pub fn repetition_key(state: &Chess) -> String {
    serialize(state)
        .split_whitespace()
        .take(4)
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn is_checkmate(state: &Chess) -> bool {
    state.is_checkmate()
}

pub fn is_stalemate(state: &Chess) -> bool {
    state.is_stalemate()
}

pub fn is_insufficient_material(state: &Chess) -> bool {
    state.is_insufficient_material()
}

pub fn is_fifty_move_draw(state: &Chess) -> bool {
    state.halfmoves() >= FIFTY_MOVE_HALFMOVES
}

fn find_legal(
    state: &Chess,
    from: Square,
    to: Square,
    promotion: Option<Role>,
) -> Option<Move> {
    let wanted = promotion.unwrap_or(Role::Queen);
    state.legal_moves().into_iter().find(|m| {
        match m.to_uci(CastlingMode::Standard) {
            UciMove::Normal {
                from: f,
                to: t,
                promotion: p,
            } => f == from && t == to && p.map_or(true, |role| role == wanted),
            _ => false,
        }
    })
}

fn classify(m: &Move) -> MoveFlag {
    match *m {
        Move::Castle { king, rook } => {
            if rook.file() > king.file() {
                MoveFlag::KingsideCastle
            } else {
                MoveFlag::QueensideCastle
            }
        }
        Move::EnPassant { .. } => MoveFlag::EnPassant,
        Move::Normal {
            role,
            from,
            to,
            capture,
            promotion,
        } => match (promotion.is_some(), capture.is_some()) {
            (true, true) => MoveFlag::PromotionCapture,
            (true, false) => MoveFlag::Promotion,
            (false, true) => MoveFlag::Capture,
            (false, false) if role == Role::Pawn && is_double_push(from, to) => {
                MoveFlag::BigPawnPush
            }
            (false, false) => MoveFlag::Quiet,
        },
        Move::Put { .. } => MoveFlag::Quiet,
    }
}

fn is_double_push(from: Square, to: Square) -> bool {
    matches!(
        (from.rank(), to.rank()),
        (Rank::Second, Rank::Fourth) | (Rank::Seventh, Rank::Fifth)
    )
}
