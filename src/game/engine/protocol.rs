//! UCI wire format
//!
//! Outbound commands render through `Display` so the transport can write
//! `format!("{cmd}\n")` directly. Inbound lines are classified by
//! [`parse_line`]; anything the session has no use for (id lines, option
//! listings, `info string`) comes back as [`EngineLine::Ignored`].
//!
//! # Commands
//!
//! ```text
//! uci
//! ucinewgame
//! isready
//! position startpos [moves e2e4 e7e5 ...]
//! position fen <fen> [moves ...]
//! go depth 12
//! go wtime 3000 winc 1500 btime 3000 binc 1500
//! eval
//! quit
//! ```
//!
//! # Replies
//!
//! ```text
//! uciok
//! readyok
//! bestmove e7e8q [ponder ...]
//! info depth 10 seldepth 14 nodes 81234 nps 400000 score cp -23 upperbound pv ...
//! Final evaluation       +0.25 (white side)
//! ```

use super::status::{Score, ScoreBound, ScoreKind};
use crate::game::error::{SessionError, SessionResult};
use crate::game::rules::{Role, Square};
use std::fmt;

/// Labels of the static evaluation summary printed in reply to `eval`
const EVALUATION_LABELS: [&str; 2] = ["Final evaluation", "Total evaluation"];

/// Command sent to the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UciCommand {
    Uci,
    UciNewGame,
    IsReady,
    /// Full replay of the game: start position plus every move played
    Position {
        fen: Option<String>,
        moves: Vec<String>,
    },
    Go(GoParams),
    /// Ask for a static evaluation of the current position
    Eval,
    Quit,
}

/// Search budget for a `go` command
///
/// Either a fixed limit (depth and/or nodes) or both clocks with their
/// increments; [`GoParams::limited`] and [`GoParams::clocked`] build the two
/// shapes the session uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GoParams {
    pub depth: Option<u32>,
    pub nodes: Option<u64>,
    pub wtime: Option<u64>,
    pub winc: Option<u64>,
    pub btime: Option<u64>,
    pub binc: Option<u64>,
}

impl GoParams {
    /// Fixed depth/node search, no clock
    pub fn limited(depth: Option<u32>, nodes: Option<u64>) -> Self {
        Self {
            depth,
            nodes,
            ..Default::default()
        }
    }

    /// Clock-based search
    pub fn clocked(wtime: u64, winc: u64, btime: u64, binc: u64) -> Self {
        Self {
            wtime: Some(wtime),
            winc: Some(winc),
            btime: Some(btime),
            binc: Some(binc),
            ..Default::default()
        }
    }
}

impl fmt::Display for GoParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "go")?;
        if let Some(depth) = self.depth {
            write!(f, " depth {depth}")?;
        }
        if let Some(nodes) = self.nodes {
            write!(f, " nodes {nodes}")?;
        }
        let clock = [
            ("wtime", self.wtime),
            ("winc", self.winc),
            ("btime", self.btime),
            ("binc", self.binc),
        ];
        for (name, value) in clock {
            if let Some(value) = value {
                write!(f, " {name} {value}")?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for UciCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UciCommand::Uci => write!(f, "uci"),
            UciCommand::UciNewGame => write!(f, "ucinewgame"),
            UciCommand::IsReady => write!(f, "isready"),
            UciCommand::Position { fen, moves } => {
                match fen {
                    Some(fen) => write!(f, "position fen {fen}")?,
                    None => write!(f, "position startpos")?,
                }
                if !moves.is_empty() {
                    write!(f, " moves {}", moves.join(" "))?;
                }
                Ok(())
            }
            UciCommand::Go(params) => write!(f, "{params}"),
            UciCommand::Eval => write!(f, "eval"),
            UciCommand::Quit => write!(f, "quit"),
        }
    }
}

/// Telemetry carried by an `info` line
///
/// The score is in the engine's frame: from the point of view of the side
/// to move.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchInfo {
    pub depth: Option<u32>,
    pub seldepth: Option<u32>,
    pub nodes: Option<u64>,
    pub nps: Option<u64>,
    pub score: Option<Score>,
    pub pv: Vec<String>,
}

/// Classified engine output line
#[derive(Debug, Clone, PartialEq)]
pub enum EngineLine {
    UciOk,
    ReadyOk,
    BestMove {
        from: Square,
        to: Square,
        promotion: Option<Role>,
    },
    Info(SearchInfo),
    /// Static evaluation in pawns, from White's point of view
    Evaluation(f32),
    Ignored,
}

/// Classify one line of engine output
///
/// A `bestmove` line whose move token is malformed fails with
/// `EngineMoveInvalid`; an `info` line with unparseable numbers fails with
/// `EngineProtocolAnomaly`. Everything unrecognised is `Ignored`.
pub fn parse_line(line: &str) -> SessionResult<EngineLine> {
    let line = line.trim();
    let mut tokens = line.split_whitespace();

    match tokens.next() {
        Some("uciok") => Ok(EngineLine::UciOk),
        Some("readyok") => Ok(EngineLine::ReadyOk),
        Some("bestmove") => parse_bestmove(tokens.next().unwrap_or("")),
        Some("info") => parse_info(line, tokens.collect()),
        Some(_) => Ok(parse_evaluation(line).map_or(EngineLine::Ignored, EngineLine::Evaluation)),
        None => Ok(EngineLine::Ignored),
    }
}

/// Parse a move token such as `e2e4` or `e7e8q`
pub fn parse_move_token(token: &str) -> Option<(Square, Square, Option<Role>)> {
    if !token.is_ascii() || !(4..=5).contains(&token.len()) {
        return None;
    }
    let from: Square = token[0..2].parse().ok()?;
    let to: Square = token[2..4].parse().ok()?;
    let promotion = match token[4..].chars().next() {
        None => None,
        Some(c @ ('q' | 'r' | 'b' | 'n')) => Some(Role::from_char(c)?),
        Some(_) => return None,
    };
    Some((from, to, promotion))
}

fn parse_bestmove(token: &str) -> SessionResult<EngineLine> {
    parse_move_token(token)
        .map(|(from, to, promotion)| EngineLine::BestMove {
            from,
            to,
            promotion,
        })
        .ok_or_else(|| SessionError::EngineMoveInvalid {
            token: token.to_string(),
        })
}

fn parse_info(line: &str, parts: Vec<&str>) -> SessionResult<EngineLine> {
    if parts.first() == Some(&"string") {
        return Ok(EngineLine::Ignored);
    }

    let anomaly = || SessionError::EngineProtocolAnomaly {
        line: line.to_string(),
    };
    let mut info = SearchInfo::default();
    let mut i = 0;

    while i < parts.len() {
        match parts[i] {
            "depth" => {
                i += 1;
                info.depth = Some(number(parts.get(i)).ok_or_else(anomaly)?);
            }
            "seldepth" => {
                i += 1;
                info.seldepth = Some(number(parts.get(i)).ok_or_else(anomaly)?);
            }
            "nodes" => {
                i += 1;
                info.nodes = Some(number(parts.get(i)).ok_or_else(anomaly)?);
            }
            "nps" => {
                i += 1;
                info.nps = Some(number(parts.get(i)).ok_or_else(anomaly)?);
            }
            "score" => {
                let kind = parts.get(i + 1).copied();
                let value: i32 = number(parts.get(i + 2)).ok_or_else(anomaly)?;
                i += 2;
                let kind = match kind {
                    Some("cp") => ScoreKind::Centipawns(value),
                    Some("mate") => ScoreKind::Mate(value),
                    _ => return Err(anomaly()),
                };
                let bound = match parts.get(i + 1).copied() {
                    Some("upperbound") => {
                        i += 1;
                        ScoreBound::Upper
                    }
                    Some("lowerbound") => {
                        i += 1;
                        ScoreBound::Lower
                    }
                    _ => ScoreBound::Exact,
                };
                info.score = Some(Score { kind, bound });
            }
            "pv" => {
                info.pv = parts[i + 1..].iter().map(|s| s.to_string()).collect();
                break;
            }
            _ => {}
        }
        i += 1;
    }

    if info.depth.is_none() && info.nps.is_none() && info.score.is_none() {
        return Ok(EngineLine::Ignored);
    }
    Ok(EngineLine::Info(info))
}

fn number<T: std::str::FromStr>(token: Option<&&str>) -> Option<T> {
    token.and_then(|t| t.parse().ok())
}

/// `Final evaluation       +0.25 (white side)` → `0.25`
fn parse_evaluation(line: &str) -> Option<f32> {
    let rest = EVALUATION_LABELS
        .iter()
        .find_map(|label| line.strip_prefix(label))?;
    let value = rest.trim_start_matches(':').split_whitespace().next()?;
    value.trim_start_matches('+').parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========================================================================
    // Command Rendering
    // ========================================================================

    #[test]
    fn test_position_command_rendering() {
        let startpos = UciCommand::Position {
            fen: None,
            moves: Vec::new(),
        };
        assert_eq!(startpos.to_string(), "position startpos");

        let with_moves = UciCommand::Position {
            fen: None,
            moves: vec!["e2e4".into(), "e7e5".into()],
        };
        assert_eq!(with_moves.to_string(), "position startpos moves e2e4 e7e5");

        let from_fen = UciCommand::Position {
            fen: Some("k7/4P3/8/8/8/8/8/4K3 w - - 0 1".into()),
            moves: Vec::new(),
        };
        assert_eq!(
            from_fen.to_string(),
            "position fen k7/4P3/8/8/8/8/8/4K3 w - - 0 1"
        );
    }

    #[test]
    fn test_go_command_rendering() {
        assert_eq!(
            UciCommand::Go(GoParams::limited(Some(12), None)).to_string(),
            "go depth 12"
        );
        assert_eq!(
            UciCommand::Go(GoParams::clocked(3000, 1500, 2800, 1500)).to_string(),
            "go wtime 3000 winc 1500 btime 2800 binc 1500"
        );
        assert_eq!(UciCommand::Go(GoParams::default()).to_string(), "go");
    }

    #[test]
    fn test_simple_commands() {
        assert_eq!(UciCommand::Uci.to_string(), "uci");
        assert_eq!(UciCommand::UciNewGame.to_string(), "ucinewgame");
        assert_eq!(UciCommand::IsReady.to_string(), "isready");
        assert_eq!(UciCommand::Eval.to_string(), "eval");
        assert_eq!(UciCommand::Quit.to_string(), "quit");
    }

    // ========================================================================
    // Reply Parsing
    // ========================================================================

    #[test]
    fn test_parse_acks() {
        assert_eq!(parse_line("uciok").unwrap(), EngineLine::UciOk);
        assert_eq!(parse_line("readyok\r").unwrap(), EngineLine::ReadyOk);
        assert_eq!(parse_line("").unwrap(), EngineLine::Ignored);
        assert_eq!(
            parse_line("option name Hash type spin default 16").unwrap(),
            EngineLine::Ignored
        );
    }

    #[test]
    fn test_parse_bestmove() {
        assert_eq!(
            parse_line("bestmove e2e4 ponder e7e5").unwrap(),
            EngineLine::BestMove {
                from: Square::E2,
                to: Square::E4,
                promotion: None
            }
        );
        assert_eq!(
            parse_line("bestmove e7e8q").unwrap(),
            EngineLine::BestMove {
                from: Square::E7,
                to: Square::E8,
                promotion: Some(Role::Queen)
            }
        );
    }

    #[test]
    fn test_malformed_bestmove_is_invalid_move() {
        //! Out-of-board squares and junk tokens are invalid moves, not ignored lines
        for line in ["bestmove (none)", "bestmove i9a1", "bestmove e7e8k", "bestmove"] {
            assert!(
                matches!(parse_line(line), Err(SessionError::EngineMoveInvalid { .. })),
                "{line} should be rejected"
            );
        }
    }

    #[test]
    fn test_parse_info_line() {
        let line = "info depth 10 seldepth 14 multipv 1 score cp -23 upperbound nodes 81234 nps 400000 pv e7e5 g1f3";
        let EngineLine::Info(info) = parse_line(line).unwrap() else {
            panic!("expected info");
        };

        assert_eq!(info.depth, Some(10));
        assert_eq!(info.seldepth, Some(14));
        assert_eq!(info.nodes, Some(81234));
        assert_eq!(info.nps, Some(400000));
        assert_eq!(
            info.score,
            Some(Score {
                kind: ScoreKind::Centipawns(-23),
                bound: ScoreBound::Upper
            })
        );
        assert_eq!(info.pv, vec!["e7e5", "g1f3"]);
    }

    #[test]
    fn test_parse_mate_score() {
        let EngineLine::Info(info) = parse_line("info depth 5 score mate 3 pv d8h4").unwrap() else {
            panic!("expected info");
        };
        assert_eq!(info.score.unwrap().kind, ScoreKind::Mate(3));
    }

    #[test]
    fn test_info_string_and_currmove_ignored() {
        assert_eq!(parse_line("info string NNUE enabled").unwrap(), EngineLine::Ignored);
        assert_eq!(
            parse_line("info currmove e2e4 currmovenumber 1").unwrap(),
            EngineLine::Ignored
        );
    }

    #[test]
    fn test_bad_info_numbers_are_anomalies() {
        assert!(matches!(
            parse_line("info depth x"),
            Err(SessionError::EngineProtocolAnomaly { .. })
        ));
        assert!(matches!(
            parse_line("info score wdl 10"),
            Err(SessionError::EngineProtocolAnomaly { .. })
        ));
    }

    #[test]
    fn test_parse_evaluation_summary() {
        assert_eq!(
            parse_line("Final evaluation       +0.25 (white side) [with scaled NNUE]").unwrap(),
            EngineLine::Evaluation(0.25)
        );
        assert_eq!(
            parse_line("Total evaluation: -1.10 (white side)").unwrap(),
            EngineLine::Evaluation(-1.10)
        );
        assert_eq!(
            parse_line("Final evaluation: none (in check)").unwrap(),
            EngineLine::Ignored
        );
    }

    #[test]
    fn test_move_token_parsing() {
        assert_eq!(
            parse_move_token("g7g8n"),
            Some((Square::G7, Square::G8, Some(Role::Knight)))
        );
        assert_eq!(parse_move_token("e2e"), None);
        assert_eq!(parse_move_token("e2e4qq"), None);
    }
}
