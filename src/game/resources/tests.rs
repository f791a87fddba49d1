//! Resource module unit tests
//!
//! Exercises the resources together the way the coordinator uses them:
//! the store feeds destinations to the selection, accepted moves land in the
//! history, and terminal positions freeze the banner. No engine involved.

use super::*;
use crate::game::rules::{Role, Side, Square};

// ============================================================================
// Selection + Store Tests
// ============================================================================

#[test]
fn test_selection_uses_store_destinations() {
    //! Clicking a piece highlights exactly the oracle's destinations,
    //! and clicking one of them yields a move the store accepts.
    let mut store = PositionStore::default();
    let mut selection = Selection::default();

    let outcome = selection.select(Square::G1, |sq| store.legal_destinations(sq));
    assert_eq!(outcome, SelectOutcome::Selected);
    assert_eq!(selection.highlighted(), &[Square::F3, Square::H3]);

    let outcome = selection.select(Square::F3, |sq| store.legal_destinations(sq));
    let SelectOutcome::Commit { from, to } = outcome else {
        panic!("expected a commit, got {outcome:?}");
    };
    let record = store.try_apply_move(from, to, None).unwrap();

    assert_eq!(record.san, "Nf3");
    assert_eq!(store.current_turn(), Side::Black);
    assert!(!selection.is_selected());
}

#[test]
fn test_selecting_opponent_piece_clears() {
    let store = PositionStore::default();
    let mut selection = Selection::default();

    let outcome = selection.select(Square::E7, |sq| store.legal_destinations(sq));
    assert_eq!(outcome, SelectOutcome::Cleared);
}

// ============================================================================
// History Tests
// ============================================================================

#[test]
fn test_history_records_flags_in_order() {
    let mut store = PositionStore::default();
    store.try_apply_move(Square::E2, Square::E4, None).unwrap();
    store.try_apply_move(Square::D7, Square::D5, None).unwrap();
    store.try_apply_move(Square::E4, Square::D5, None).unwrap();

    let flags: Vec<MoveFlag> = store.history().iter().map(|m| m.flag).collect();
    assert_eq!(
        flags,
        vec![MoveFlag::BigPawnPush, MoveFlag::BigPawnPush, MoveFlag::Capture]
    );
    assert_eq!(store.history().uci_moves(), vec!["e2e4", "d7d5", "e4d5"]);

    let entries = store.history().entries();
    assert_eq!(entries[2].san, "exd5");
    assert_eq!(entries[2].description, "W made a standard capture");
    assert!(entries[2].captured);
}

#[test]
fn test_promotion_recorded_with_role() {
    let mut store = PositionStore::new(Some("k7/4P3/8/8/8/8/8/4K3 w - - 0 1")).unwrap();
    let record = store.try_apply_move(Square::E7, Square::E8, None).unwrap();

    assert_eq!(record.flag, MoveFlag::Promotion);
    assert_eq!(record.promotion, Some(Role::Queen));
    assert_eq!(store.history().last_move(), Some(&record));
}

// ============================================================================
// Banner Tests
// ============================================================================

#[test]
fn test_banner_freezes_store_result() {
    let mut store = PositionStore::default();
    for (from, to) in [
        (Square::F2, Square::F3),
        (Square::E7, Square::E5),
        (Square::G2, Square::G4),
        (Square::D8, Square::H4),
    ] {
        store.try_apply_move(from, to, None).unwrap();
    }

    let mut banner = GameOverBanner::default();
    let status = store.terminal_reason().unwrap();
    assert!(banner.freeze(status));
    assert_eq!(banner.take_notice().map(|s| s.winner()), Some(Some(Side::Black)));

    store.reset();
    banner.clear();
    assert!(store.terminal_reason().is_none());
    assert!(banner.take_notice().is_none());
}
