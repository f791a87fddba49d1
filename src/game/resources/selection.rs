//! Selection & highlight manager
//!
//! Tracks the square the human has clicked and the legal destinations that
//! are highlighted for it. The state is transient: recomputed on every
//! selection event, cleared when a move completes or the game resets.
//!
//! Clicking works as a small state machine:
//!
//! ```text
//! nothing selected ──click piece with moves──▶ selected(sq, dests)
//! selected ──click one of dests──▶ Commit(from, to), cleared
//! selected ──click same square──▶ cleared
//! selected ──click another movable piece──▶ selected(other, dests)
//! any ──click square without moves──▶ cleared
//! ```
//!
//! Legality is never decided here; destinations come from the rules oracle
//! through the closure passed to [`Selection::select`].

use crate::game::rules::Square;
use serde::Serialize;
use std::collections::BTreeMap;

/// Source square fill
const SELECTED_BACKGROUND: &str = "rgba(255, 255, 0, 0.4)";
/// Destination dot
const DESTINATION_BACKGROUND: &str = "radial-gradient(circle, #fffc00 36%, transparent 40%)";
/// Drop-target fill for the four centre squares
const CENTER_DROP_COLOR: &str = "cornFlowerBlue";
/// Drop-target outline everywhere else
const EDGE_DROP_SHADOW: &str = "inset 0 0 1px 4px rgb(255, 255, 0)";

/// Declarative style record handed to the board renderer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SquareStyle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub box_shadow: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_radius: Option<String>,
}

/// What a click on a square amounted to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectOutcome {
    /// A piece is now selected and its destinations highlighted
    Selected,
    /// Selection was cleared without a move
    Cleared,
    /// The click landed on a highlighted destination; play `from` → `to`
    Commit { from: Square, to: Square },
}

/// Currently selected square and its highlighted destinations
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    selected: Option<Square>,
    highlighted: Vec<Square>,
}

impl Selection {
    /// React to a click on `square`
    ///
    /// `destinations` is only consulted when the click starts a new
    /// selection. A `Commit` outcome clears the selection; the caller is
    /// responsible for submitting the move.
    pub fn select<F>(&mut self, square: Square, destinations: F) -> SelectOutcome
    where
        F: FnOnce(Square) -> Vec<Square>,
    {
        if let Some(from) = self.selected {
            if self.highlighted.contains(&square) {
                self.clear();
                return SelectOutcome::Commit { from, to: square };
            }
            if from == square {
                self.clear();
                return SelectOutcome::Cleared;
            }
        }

        let destinations = destinations(square);
        if destinations.is_empty() {
            self.clear();
            return SelectOutcome::Cleared;
        }

        self.selected = Some(square);
        self.highlighted = destinations;
        SelectOutcome::Selected
    }

    /// Whether the piece on `square` may be picked up
    ///
    /// Refused once the game is over, and refused for any square other than
    /// the selected one or its destinations while a selection is active.
    pub fn allow_pickup(&self, square: Square, terminal: bool) -> bool {
        if terminal {
            return false;
        }
        match self.selected {
            Some(from) => from == square || self.highlighted.contains(&square),
            None => true,
        }
    }

    pub fn clear(&mut self) {
        self.selected = None;
        self.highlighted.clear();
    }

    pub fn selected(&self) -> Option<Square> {
        self.selected
    }

    pub fn highlighted(&self) -> &[Square] {
        &self.highlighted
    }

    pub fn is_selected(&self) -> bool {
        self.selected.is_some()
    }

    /// Style per square name ("e2") for the current selection
    pub fn square_styles(&self) -> BTreeMap<String, SquareStyle> {
        let mut styles = BTreeMap::new();
        let Some(from) = self.selected else {
            return styles;
        };

        styles.insert(
            from.to_string(),
            SquareStyle {
                background: Some(SELECTED_BACKGROUND.to_string()),
                border_radius: Some("0".to_string()),
                ..Default::default()
            },
        );
        for dest in &self.highlighted {
            styles.insert(
                dest.to_string(),
                SquareStyle {
                    background: Some(DESTINATION_BACKGROUND.to_string()),
                    border_radius: Some("50%".to_string()),
                    ..Default::default()
                },
            );
        }
        styles
    }
}

/// Highlight for a square while a piece is dragged over it
pub fn drop_square_style_for(square: Square) -> SquareStyle {
    match square {
        Square::D4 | Square::E4 | Square::D5 | Square::E5 => SquareStyle {
            background_color: Some(CENTER_DROP_COLOR.to_string()),
            ..Default::default()
        },
        _ => SquareStyle {
            box_shadow: Some(EDGE_DROP_SHADOW.to_string()),
            ..Default::default()
        },
    }
}
