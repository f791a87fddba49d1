//! Turn coordinator - the session's state machine
//!
//! Owns the position store, the clock, the turn phase, the game-over banner
//! and the engine bridge, and is the only thing that mutates any of them.
//! Human moves come in through [`TurnCoordinator::submit_human_move`],
//! engine output through [`TurnCoordinator::handle_engine_event`]; both end
//! in the same oracle-validated [`PositionStore::try_apply_move`].
//!
//! # States
//!
//! ```text
//!            engine to move, not terminal
//!   Idle ─────────────────────────────────▶ AwaitingEngine{gen}
//!    ▲   ◀─────────────────────────────────     │  ▲
//!    │     valid engine move, human to move     │  │ invalid move: re-request
//!    │                                          ▼  │
//!    │ reset                     Terminal ◀──── any accepted move that ends the game
//! ```
//!
//! # Invariants
//!
//! - At most one search is outstanding; requests while `AwaitingEngine` or
//!   `Terminal` are no-ops.
//! - Human moves are refused while a search is outstanding, so the replayed
//!   `position` command can never fall out of step with the store.
//! - Engine output tagged with an older generation is dropped.
//!
//! # Clock
//!
//! The engine's clock runs from the moment a search is requested until its
//! move is applied, and only once two plies have been played and no fixed
//! depth/node budget is configured.

use crate::core::config::{SearchLimit, SessionConfig};
use crate::game::engine::{
    BridgeOutcome, EngineBridge, EngineConnector, EngineEvent, EngineStatus, GoParams, UciCommand,
};
use crate::game::error::{SessionError, SessionResult};
use crate::game::resources::{
    GameClock, GameOverBanner, MoveRecord, PositionStore, TerminalStatus, TurnPhase,
    TurnStateContext,
};
use crate::game::rules::{Role, Side, Square};
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Plies that must be on the board before the clock engages
const CLOCK_START_PLY: usize = 2;

/// What handling an engine event did to the game
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineReaction {
    /// The engine's move was validated and applied
    Moved(MoveRecord),
    /// Engine status changed; game state did not
    Updated,
    /// The event was dropped (stale, unexpected or invalid)
    Discarded,
}

pub struct TurnCoordinator {
    engine_side: Side,
    search_limit: SearchLimit,
    store: PositionStore,
    clock: GameClock,
    turn: TurnStateContext,
    banner: GameOverBanner,
    bridge: EngineBridge,
    generation: u64,
}

impl TurnCoordinator {
    /// Build the coordinator, open the engine channels and take the first turn
    pub fn new(config: &SessionConfig, connector: Box<dyn EngineConnector>) -> SessionResult<Self> {
        let store = PositionStore::new(config.start_position.as_deref())?;
        let mut coordinator = Self {
            engine_side: config.engine_side,
            search_limit: config.search,
            store,
            clock: GameClock::new(config.time_control),
            turn: TurnStateContext::default(),
            banner: GameOverBanner::default(),
            bridge: EngineBridge::new(connector),
            generation: 1,
        };
        coordinator.bridge.start(coordinator.generation)?;
        coordinator.advance(Instant::now());
        Ok(coordinator)
    }

    // ========================================================================
    // Human Side
    // ========================================================================

    /// Whether a human move would currently be considered
    pub fn accepts_human_input(&self) -> bool {
        self.turn.phase.accepts_input()
            && self.store.current_turn() != self.engine_side
            && !self.store.is_terminal()
    }

    /// Validate and apply a human move, then hand the turn on
    pub fn submit_human_move(
        &mut self,
        from: Square,
        to: Square,
        promotion: Option<Role>,
        now: Instant,
    ) -> SessionResult<MoveRecord> {
        if self.turn.phase.is_terminal() || self.store.is_terminal() {
            return Err(SessionError::GameOver);
        }
        if !self.accepts_human_input() {
            return Err(SessionError::NotHumanTurn);
        }

        let record = self.store.try_apply_move(from, to, promotion)?;
        info!("[TURN] Human played {} ({})", record.san, record.uci());
        self.advance(now);
        Ok(record)
    }

    // ========================================================================
    // Engine Side
    // ========================================================================

    /// Ask the engine for a move if, and only if, it is its turn
    ///
    /// Returns whether a search was issued. A no-op while a search is already
    /// outstanding, after the game ended, or on the human's turn.
    pub fn request_engine_move(&mut self, now: Instant) -> bool {
        if self.turn.phase != TurnPhase::Idle {
            debug!("[TURN] Search not requested in phase {:?}", self.turn.phase);
            return false;
        }
        if self.store.current_turn() != self.engine_side || self.store.is_terminal() {
            return false;
        }
        if !self.bridge.is_connected() {
            warn!("[TURN] No engine channels open, search not requested");
            return false;
        }

        let go = self.go_params(now);
        if self.clock_engages() {
            self.clock.start(self.engine_side, now);
        }
        if !self.turn.transition_to(TurnPhase::AwaitingEngine {
            generation: self.generation,
        }) {
            return false;
        }
        self.bridge.request_move(self.position_command(), go);
        info!(
            "[TURN] Engine ({:?}) to move, search requested (generation {})",
            self.engine_side, self.generation
        );
        true
    }

    /// Route one engine event through the bridge and act on the outcome
    pub fn handle_engine_event(&mut self, event: EngineEvent, now: Instant) -> EngineReaction {
        let side_to_move = self.store.current_turn();
        match self.bridge.handle_event(event, side_to_move) {
            BridgeOutcome::BestMove {
                from,
                to,
                promotion,
            } => self.apply_engine_move(from, to, promotion, now),
            BridgeOutcome::InvalidBestMove { token } => {
                let invalid = SessionError::EngineMoveInvalid { token };
                warn!("[TURN] Dropped engine reply: {}", invalid);
                self.repoll(now);
                EngineReaction::Discarded
            }
            BridgeOutcome::Updated => EngineReaction::Updated,
            BridgeOutcome::Closed(channel) => {
                warn!("[TURN] Engine {} channel is gone", channel);
                EngineReaction::Discarded
            }
            BridgeOutcome::Stale | BridgeOutcome::Ignored => EngineReaction::Discarded,
        }
    }

    /// Next raw event from the engine channels
    pub async fn next_engine_event(&mut self) -> Option<EngineEvent> {
        self.bridge.recv().await
    }

    fn apply_engine_move(
        &mut self,
        from: Square,
        to: Square,
        promotion: Option<Role>,
        now: Instant,
    ) -> EngineReaction {
        if !self.turn.phase.is_awaiting_engine() {
            warn!(
                "[TURN] Unrequested engine move {}{} in phase {:?}",
                from, to, self.turn.phase
            );
            return EngineReaction::Discarded;
        }

        let record = match self.store.try_apply_move(from, to, promotion) {
            Ok(record) => record,
            Err(e) => {
                warn!("[TURN] Engine move rejected by rules: {}", e);
                self.repoll(now);
                return EngineReaction::Discarded;
            }
        };

        info!("[TURN] Engine played {} ({})", record.san, record.uci());
        self.clock.stop(now);
        self.turn.transition_to(TurnPhase::Idle);
        self.bridge.request_evaluation(self.position_command());
        self.advance(now);
        EngineReaction::Moved(record)
    }

    /// Re-send the outstanding search after a dropped reply
    ///
    /// The clock is left running and the increment is not credited again.
    fn repoll(&mut self, now: Instant) {
        let TurnPhase::AwaitingEngine { generation } = self.turn.phase else {
            return;
        };
        let go = self.go_params(now);
        self.turn.transition_to(TurnPhase::AwaitingEngine { generation });
        self.bridge.request_move(self.position_command(), go);
        debug!("[TURN] Search re-requested");
    }

    // ========================================================================
    // Transitions
    // ========================================================================

    /// Re-check the position after a move or (re)start
    fn advance(&mut self, now: Instant) {
        if let Some(status) = self.store.terminal_reason() {
            self.enter_terminal(status, now);
            return;
        }
        if self.store.current_turn() == self.engine_side {
            self.request_engine_move(now);
        }
    }

    fn enter_terminal(&mut self, status: TerminalStatus, now: Instant) {
        self.clock.stop(now);
        if !self.turn.phase.is_terminal() {
            self.turn.transition_to(TurnPhase::Terminal);
        }
        if self.banner.freeze(status) {
            info!("[TURN] Game over: {}", status.message());
        }
    }

    /// Start a new game
    ///
    /// Restores the start position, history, clock, phase and banner, bumps
    /// the generation and reopens both engine channels, then takes the first
    /// turn. If the engine cannot be reopened the game is still reset and
    /// left `Idle` with no search outstanding; a later reset retries.
    pub fn reset(&mut self, now: Instant) -> SessionResult<()> {
        self.store.reset();
        self.clock.reset();
        self.turn.reset();
        self.banner.clear();
        self.generation += 1;
        info!("[TURN] Reset to generation {}", self.generation);

        if let Err(e) = self.bridge.restart(self.generation) {
            warn!("[TURN] Engine unavailable after reset: {}", e);
            return Err(e);
        }
        self.advance(now);
        Ok(())
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn store(&self) -> &PositionStore {
        &self.store
    }

    pub fn clock(&self) -> &GameClock {
        &self.clock
    }

    pub fn phase(&self) -> TurnPhase {
        self.turn.phase
    }

    pub fn turn_state(&self) -> &TurnStateContext {
        &self.turn
    }

    pub fn engine_status(&self) -> &EngineStatus {
        self.bridge.status()
    }

    pub fn engine_side(&self) -> Side {
        self.engine_side
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Frozen result of the current game, if it is over
    pub fn terminal_status(&self) -> Option<TerminalStatus> {
        self.banner.status()
    }

    pub fn take_game_over_notice(&mut self) -> Option<TerminalStatus> {
        self.banner.take_notice()
    }

    fn clock_engages(&self) -> bool {
        self.store.ply_count() >= CLOCK_START_PLY && !self.search_limit.bypasses_clock()
    }

    fn go_params(&self, now: Instant) -> GoParams {
        if self.search_limit.bypasses_clock() {
            return GoParams::limited(self.search_limit.depth, self.search_limit.nodes);
        }
        GoParams::clocked(
            self.clock.remaining_ms(Side::White, now),
            self.clock.increment_ms(Side::White),
            self.clock.remaining_ms(Side::Black, now),
            self.clock.increment_ms(Side::Black),
        )
    }

    /// Full replay of the game for the engine
    fn position_command(&self) -> UciCommand {
        UciCommand::Position {
            fen: self.store.start_fen().map(str::to_string),
            moves: self.store.history().uci_moves(),
        }
    }
}
