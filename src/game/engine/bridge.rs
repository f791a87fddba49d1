//! Engine bridge - two engine channels behind one interface
//!
//! The bridge owns the search and evaluation channels, the shared event
//! queue their reader tasks feed, and the [`EngineStatus`] telemetry. It
//! knows nothing about turns: the coordinator decides *when* to search and
//! what to do with a best move, the bridge only turns requests into
//! commands and lines into [`BridgeOutcome`]s.
//!
//! # Generations
//!
//! Every channel is opened for one game generation and every event it
//! produces carries that number. [`EngineBridge::restart`] closes both
//! channels and reopens them with a fresh handshake for the next
//! generation; anything still in flight from the old ones is reported as
//! [`BridgeOutcome::Stale`] and must be discarded.
//!
//! # Channel Roles
//!
//! | Channel    | Sends                        | Uses from replies         |
//! |------------|------------------------------|---------------------------|
//! | Search     | `position`, `go`             | `bestmove`, `info`        |
//! | Evaluation | `position`, `eval`           | evaluation summary line   |

use super::protocol::{parse_line, EngineLine, GoParams, UciCommand};
use super::status::EngineStatus;
use super::transport::{ChannelKind, EngineChannel, EngineConnector, EngineEvent, Handshake};
use crate::game::error::{SessionError, SessionResult};
use crate::game::rules::{Role, Side, Square};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// What an engine event amounted to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeOutcome {
    /// The search channel proposed a move (not yet validated)
    BestMove {
        from: Square,
        to: Square,
        promotion: Option<Role>,
    },
    /// The search channel answered with an unusable move token
    InvalidBestMove { token: String },
    /// Status changed (handshake progress or telemetry)
    Updated,
    /// Event from a previous generation
    Stale,
    /// A channel's output ended
    Closed(ChannelKind),
    /// Nothing of interest
    Ignored,
}

pub struct EngineBridge {
    connector: Box<dyn EngineConnector>,
    generation: u64,
    search: Option<EngineChannel>,
    evaluation: Option<EngineChannel>,
    events_tx: mpsc::UnboundedSender<EngineEvent>,
    events_rx: mpsc::UnboundedReceiver<EngineEvent>,
    status: EngineStatus,
}

impl EngineBridge {
    /// Bridge with no channels open yet
    pub fn new(connector: Box<dyn EngineConnector>) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            connector,
            generation: 0,
            search: None,
            evaluation: None,
            events_tx,
            events_rx,
            status: EngineStatus::default(),
        }
    }

    /// Open both channels for `generation` and start their handshakes
    ///
    /// Either both channels come up or neither stays open.
    pub fn start(&mut self, generation: u64) -> SessionResult<()> {
        self.generation = generation;
        let search = self.open(ChannelKind::Search)?;
        let evaluation = match self.open(ChannelKind::Evaluation) {
            Ok(channel) => channel,
            Err(e) => {
                search.close();
                return Err(e);
            }
        };
        self.search = Some(search);
        self.evaluation = Some(evaluation);
        info!("[ENGINE] Channels opened for generation {}", generation);
        Ok(())
    }

    /// Tear down both channels and reopen them for a new generation
    pub fn restart(&mut self, generation: u64) -> SessionResult<()> {
        self.shutdown();
        self.status = EngineStatus::default();
        self.start(generation)
    }

    /// Close both channels
    pub fn shutdown(&mut self) {
        if let Some(channel) = self.search.take() {
            channel.close();
        }
        if let Some(channel) = self.evaluation.take() {
            channel.close();
        }
    }

    /// Ask the search channel for a move and the evaluation channel for a score
    ///
    /// `position` must be the full replay of the game so far.
    pub fn request_move(&mut self, position: UciCommand, go: GoParams) {
        debug!("[ENGINE] Requesting move: {} / {}", position, go);
        if let Some(search) = self.search.as_mut() {
            search.send(position.clone());
            search.send(UciCommand::Go(go));
        }
        self.request_evaluation(position);
    }

    /// Best-effort static evaluation of `position`
    pub fn request_evaluation(&mut self, position: UciCommand) {
        if let Some(evaluation) = self.evaluation.as_mut() {
            evaluation.send(position);
            evaluation.send(UciCommand::Eval);
        }
    }

    /// Next event from either channel
    ///
    /// Never resolves to `None` while the bridge is alive, since the bridge
    /// holds a sender of its own queue.
    pub async fn recv(&mut self) -> Option<EngineEvent> {
        self.events_rx.recv().await
    }

    /// Interpret one engine event
    ///
    /// `side_to_move` is the side the position had when the event is
    /// handled; search scores are normalized against it.
    pub fn handle_event(&mut self, event: EngineEvent, side_to_move: Side) -> BridgeOutcome {
        if event.generation != self.generation {
            let stale = SessionError::StaleReply {
                generation: event.generation,
                current: self.generation,
            };
            debug!("[ENGINE] {} ({:?})", stale, event.line);
            return BridgeOutcome::Stale;
        }

        let Some(line) = event.line else {
            warn!("[ENGINE] {} channel closed its output", event.channel);
            return BridgeOutcome::Closed(event.channel);
        };

        let parsed = match parse_line(&line) {
            Ok(parsed) => parsed,
            Err(SessionError::EngineMoveInvalid { token }) if event.channel == ChannelKind::Search => {
                return BridgeOutcome::InvalidBestMove { token };
            }
            Err(e) => {
                debug!("[ENGINE] Ignoring {} line: {}", event.channel, e);
                return BridgeOutcome::Ignored;
            }
        };

        match (event.channel, parsed) {
            (channel, EngineLine::UciOk) => {
                self.acknowledge(channel, Handshake::Loaded);
                BridgeOutcome::Updated
            }
            (channel, EngineLine::ReadyOk) => {
                self.acknowledge(channel, Handshake::Ready);
                BridgeOutcome::Updated
            }
            (ChannelKind::Search, EngineLine::BestMove { from, to, promotion }) => {
                BridgeOutcome::BestMove { from, to, promotion }
            }
            (ChannelKind::Search, EngineLine::Info(info)) => {
                self.status.record_info(&info, side_to_move);
                BridgeOutcome::Updated
            }
            (ChannelKind::Evaluation, EngineLine::Evaluation(value)) => {
                self.status.static_eval = Some(value);
                BridgeOutcome::Updated
            }
            _ => BridgeOutcome::Ignored,
        }
    }

    /// Whether the channels of the current generation are open
    pub fn is_connected(&self) -> bool {
        self.search.is_some() && self.evaluation.is_some()
    }

    pub fn status(&self) -> &EngineStatus {
        &self.status
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn acknowledge(&mut self, kind: ChannelKind, ack: Handshake) {
        let channel = match kind {
            ChannelKind::Search => self.search.as_mut(),
            ChannelKind::Evaluation => self.evaluation.as_mut(),
        };
        if let Some(channel) = channel {
            channel.on_ack(ack);
        }
        if kind == ChannelKind::Search {
            match ack {
                Handshake::Loaded => self.status.loaded = true,
                Handshake::Ready => self.status.ready = true,
            }
            info!("[ENGINE] Search channel {:?}", ack);
        }
    }

    fn open(&mut self, kind: ChannelKind) -> SessionResult<EngineChannel> {
        let channel = EngineChannel::open(
            kind,
            self.generation,
            self.connector.as_mut(),
            self.events_tx.clone(),
        )?;
        Ok(channel)
    }
}

impl Drop for EngineBridge {
    fn drop(&mut self) {
        self.shutdown();
    }
}
