//! Session facade - everything presentation needs, in one object
//!
//! A [`GameSession`] is an explicitly constructed game: it owns its turn
//! coordinator and selection state, carries its own id, and can coexist
//! with any number of other sessions. It performs no game logic itself;
//! every call is delegation plus read-combination.
//!
//! # Presentation Contract
//!
//! [`GameSession::render`] hands the renderer a [`BoardProps`] holding a
//! serializable [`RenderState`] snapshot and the action entry points
//! (`on_drop`, `on_square_select`, `on_reset`, `allow_pickup`,
//! `drop_square_style_for`).
//!
//! # Event Pump
//!
//! ```rust,ignore
//! let mut session = GameSession::with_process_engine(SessionConfig::load_or_default())?;
//! loop {
//!     match session.next_event().await {
//!         SessionEvent::EngineMoved(record) => redraw(&session),
//!         SessionEvent::ClockTick(clock) => redraw_clock(clock),
//!         SessionEvent::EngineUpdate => redraw_status(&session),
//!         SessionEvent::Discarded => {}
//!     }
//!     if let Some(result) = session.take_game_over_notice() {
//!         show_modal(result.message());
//!     }
//! }
//! ```

use crate::core::config::SessionConfig;
use crate::game::coordinator::{EngineReaction, TurnCoordinator};
use crate::game::engine::{EngineConnector, EngineEvent, EngineStatus, ProcessConnector};
use crate::game::error::{SessionError, SessionResult};
use crate::game::resources::{
    drop_square_style_for, ClockView, HistoryEntry, MoveRecord, SelectOutcome, Selection,
    SquareStyle, TerminalStatus, TurnPhase,
};
use crate::game::rules::{Piece, Role, Side, Square};
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Duration;
use tokio::time::Instant;
use tracing::info;
use uuid::Uuid;

/// Whose turn the status line announces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnIndicator {
    Computer,
    Player,
}

impl TurnIndicator {
    /// Possessive label, as in "Computer's turn"
    pub fn label(self) -> &'static str {
        match self {
            TurnIndicator::Computer => "Computer's",
            TurnIndicator::Player => "Your",
        }
    }
}

/// Render-ready snapshot of the session
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderState {
    pub session_id: Uuid,
    /// Current position as FEN
    pub position: String,
    pub history: Vec<HistoryEntry>,
    pub current_turn: Side,
    pub turn_indicator: TurnIndicator,
    pub phase: TurnPhase,
    pub square_styles: BTreeMap<String, SquareStyle>,
    pub engine: EngineStatus,
    pub score: Option<String>,
    pub search: Option<String>,
    pub clock: ClockView,
    pub game_over: Option<TerminalStatus>,
}

/// What woke up [`GameSession::next_event`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// The engine's move was applied
    EngineMoved(MoveRecord),
    /// Engine status changed
    EngineUpdate,
    /// The running clock crossed a whole second
    ClockTick(ClockView),
    /// Engine output that changed nothing
    Discarded,
}

pub struct GameSession {
    id: Uuid,
    config: SessionConfig,
    coordinator: TurnCoordinator,
    selection: Selection,
}

impl GameSession {
    /// Start a session talking to engines produced by `connector`
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(config: SessionConfig, connector: impl EngineConnector + 'static) -> SessionResult<Self> {
        config.validate()?;
        let id = Uuid::new_v4();
        let coordinator = TurnCoordinator::new(&config, Box::new(connector))?;
        info!(
            "[SESSION] {} started: engine plays {:?}, human plays {:?}",
            id,
            config.engine_side,
            config.human_side()
        );
        Ok(Self {
            id,
            config,
            coordinator,
            selection: Selection::default(),
        })
    }

    /// Start a session that launches the configured engine executable
    pub fn with_process_engine(config: SessionConfig) -> SessionResult<Self> {
        let connector = ProcessConnector::new(config.engine.clone());
        Self::new(config, connector)
    }

    // ========================================================================
    // Actions
    // ========================================================================

    /// Drag-and-drop move; promotions become queens
    pub fn on_drop(&mut self, from: Square, to: Square) -> SessionResult<MoveRecord> {
        self.submit_move(from, to, None)
    }

    /// Human move with an explicit promotion choice
    pub fn submit_move(
        &mut self,
        from: Square,
        to: Square,
        promotion: Option<Role>,
    ) -> SessionResult<MoveRecord> {
        let record = self
            .coordinator
            .submit_human_move(from, to, promotion, Instant::now())?;
        self.selection.clear();
        Ok(record)
    }

    /// Click on a square: select, deselect, or complete a move
    ///
    /// Returns the move record when the click completed a move.
    pub fn on_square_select(&mut self, square: Square) -> SessionResult<Option<MoveRecord>> {
        if self.coordinator.store().is_terminal() {
            self.selection.clear();
            return Err(SessionError::GameOver);
        }
        if !self.coordinator.accepts_human_input() {
            self.selection.clear();
            return Err(SessionError::NotHumanTurn);
        }

        let store = self.coordinator.store();
        match self.selection.select(square, |sq| store.legal_destinations(sq)) {
            SelectOutcome::Commit { from, to } => self.submit_move(from, to, None).map(Some),
            SelectOutcome::Selected | SelectOutcome::Cleared => Ok(None),
        }
    }

    /// New game with the same configuration
    pub fn on_reset(&mut self) -> SessionResult<()> {
        self.selection.clear();
        self.coordinator.reset(Instant::now())?;
        info!(
            "[SESSION] {} reset (generation {})",
            self.id,
            self.coordinator.generation()
        );
        Ok(())
    }

    /// Whether the human may pick up `piece` from `square`
    pub fn allow_pickup(&self, square: Square, piece: Option<Piece>) -> bool {
        let terminal = self.coordinator.store().is_terminal();
        let own_piece = piece.is_some_and(|p| Side::from(p.color) == self.config.human_side());
        own_piece
            && self.coordinator.accepts_human_input()
            && self.selection.allow_pickup(square, terminal)
    }

    /// Highlight for a square while a piece is dragged over it
    pub fn drop_square_style_for(&self, square: Square) -> SquareStyle {
        drop_square_style_for(square)
    }

    /// Ask for an engine move; no-op unless it is the engine's turn and idle
    pub fn request_engine_move(&mut self) -> bool {
        self.coordinator.request_engine_move(Instant::now())
    }

    // ========================================================================
    // Engine Events
    // ========================================================================

    /// Apply one engine event to the session
    pub fn handle_engine_event(&mut self, event: EngineEvent) -> SessionEvent {
        match self.coordinator.handle_engine_event(event, Instant::now()) {
            EngineReaction::Moved(record) => {
                self.selection.clear();
                SessionEvent::EngineMoved(record)
            }
            EngineReaction::Updated => SessionEvent::EngineUpdate,
            EngineReaction::Discarded => SessionEvent::Discarded,
        }
    }

    /// Wait for the next engine line or clock tick and apply it
    pub async fn next_event(&mut self) -> SessionEvent {
        let delay = self.coordinator.clock().next_tick_delay(Instant::now());

        let woke = tokio::select! {
            event = self.coordinator.next_engine_event() => event,
            _ = tick(delay) => None,
        };

        match woke {
            Some(event) => self.handle_engine_event(event),
            None => SessionEvent::ClockTick(self.coordinator.clock().view(Instant::now())),
        }
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// The game result, handed out once per game
    pub fn take_game_over_notice(&mut self) -> Option<TerminalStatus> {
        self.coordinator.take_game_over_notice()
    }

    pub fn turn_indicator(&self) -> TurnIndicator {
        if self.coordinator.store().current_turn() == self.config.engine_side {
            TurnIndicator::Computer
        } else {
            TurnIndicator::Player
        }
    }

    pub fn render_state(&self) -> RenderState {
        let store = self.coordinator.store();
        let engine = self.coordinator.engine_status().clone();
        RenderState {
            session_id: self.id,
            position: store.fen(),
            history: store.history_entries(),
            current_turn: store.current_turn(),
            turn_indicator: self.turn_indicator(),
            phase: self.coordinator.phase(),
            square_styles: self.selection.square_styles(),
            score: engine.score_text(),
            search: engine.search_text(),
            engine,
            clock: self.coordinator.clock().view(Instant::now()),
            game_over: self.coordinator.terminal_status(),
        }
    }

    /// Hand the renderer a snapshot plus the action entry points
    pub fn render<F, R>(&mut self, render: F) -> R
    where
        F: FnOnce(BoardProps<'_>) -> R,
    {
        let state = self.render_state();
        render(BoardProps {
            state,
            session: self,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn coordinator(&self) -> &TurnCoordinator {
        &self.coordinator
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }
}

/// Snapshot and callbacks passed to the renderer
pub struct BoardProps<'a> {
    pub state: RenderState,
    session: &'a mut GameSession,
}

impl BoardProps<'_> {
    pub fn on_drop(&mut self, from: Square, to: Square) -> SessionResult<MoveRecord> {
        self.session.on_drop(from, to)
    }

    pub fn on_square_select(&mut self, square: Square) -> SessionResult<Option<MoveRecord>> {
        self.session.on_square_select(square)
    }

    pub fn on_reset(&mut self) -> SessionResult<()> {
        self.session.on_reset()
    }

    pub fn allow_pickup(&self, square: Square, piece: Option<Piece>) -> bool {
        self.session.allow_pickup(square, piece)
    }

    pub fn drop_square_style_for(&self, square: Square) -> SquareStyle {
        self.session.drop_square_style_for(square)
    }
}

/// Sleep for `delay`, or forever when no clock is running
async fn tick(delay: Option<Duration>) {
    match delay {
        Some(delay) => tokio::time::sleep(delay).await,
        None => std::future::pending().await,
    }
}
