//! Engine status shown next to the board
//!
//! Written only by the bridge's reply handlers; everything else reads it.
//! Telemetry never feeds back into game state.

use super::protocol::SearchInfo;
use crate::game::rules::Side;
use serde::Serialize;
use std::fmt;

/// Score magnitude as reported by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "unit", content = "value", rename_all = "snake_case")]
pub enum ScoreKind {
    Centipawns(i32),
    /// Moves to mate; negative when the side the score belongs to is mated
    Mate(i32),
}

/// Whether the score is exact or only a bound found during the search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreBound {
    Exact,
    /// The true score is at most this value
    Upper,
    /// The true score is at least this value
    Lower,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Score {
    pub kind: ScoreKind,
    pub bound: ScoreBound,
}

impl Score {
    /// Re-express an engine score (side to move's view) from White's view
    ///
    /// Negating the value also swaps the direction of a bound.
    pub fn from_white(self, side_to_move: Side) -> Score {
        if side_to_move == Side::White {
            return self;
        }
        let kind = match self.kind {
            ScoreKind::Centipawns(cp) => ScoreKind::Centipawns(-cp),
            ScoreKind::Mate(n) => ScoreKind::Mate(-n),
        };
        let bound = match self.bound {
            ScoreBound::Exact => ScoreBound::Exact,
            ScoreBound::Upper => ScoreBound::Lower,
            ScoreBound::Lower => ScoreBound::Upper,
        };
        Score { kind, bound }
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.bound {
            ScoreBound::Exact => {}
            ScoreBound::Upper => write!(f, "<= ")?,
            ScoreBound::Lower => write!(f, ">= ")?,
        }
        match self.kind {
            ScoreKind::Centipawns(cp) => write!(f, "{:.2}", f64::from(cp) / 100.0),
            ScoreKind::Mate(n) => write!(f, "Mate in {}", n.unsigned_abs()),
        }
    }
}

/// Depth and speed of the latest search iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SearchSummary {
    pub depth: u32,
    pub nps: u64,
}

impl fmt::Display for SearchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Depth: {} Nps: {}", self.depth, self.nps)
    }
}

/// Handshake progress and latest telemetry
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineStatus {
    /// Search channel acknowledged `uci`
    pub loaded: bool,
    /// Search channel acknowledged `isready`
    pub ready: bool,
    pub last_search: Option<SearchSummary>,
    /// Latest search score, from White's point of view
    pub last_score: Option<Score>,
    /// Latest static evaluation from the evaluation channel, in pawns
    pub static_eval: Option<f32>,
}

impl EngineStatus {
    /// Fold an `info` line into the status
    ///
    /// The search summary needs both depth and nps on the same line; the
    /// score is normalized with the side that was to move when it arrived.
    pub fn record_info(&mut self, info: &SearchInfo, side_to_move: Side) {
        if let (Some(depth), Some(nps)) = (info.depth, info.nps) {
            self.last_search = Some(SearchSummary { depth, nps });
        }
        if let Some(score) = info.score {
            self.last_score = Some(score.from_white(side_to_move));
        }
    }

    /// Score as shown to the player ("0.35", "<= -1.20", "Mate in 3")
    pub fn score_text(&self) -> Option<String> {
        self.last_score.map(|score| score.to_string())
    }

    pub fn search_text(&self) -> Option<String> {
        self.last_search.map(|summary| summary.to_string())
    }
}
