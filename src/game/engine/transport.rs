//! Engine channel transport
//!
//! One [`EngineChannel`] per conversation with the engine. Each channel
//! runs two tasks:
//!
//! - **writer**: drains an unbounded command queue onto the engine's stdin,
//!   one line per command, flushing after each so the engine never waits on
//!   a partially written command
//! - **reader**: reads stdout line by line and forwards every line, tagged
//!   with the channel kind and game generation, into the session's shared
//!   event queue. End of stream is forwarded as `line: None`.
//!
//! The channel also owns the handshake. Commands issued before the engine
//! has answered `readyok` are held in a backlog and flushed in order once it
//! does, so callers never need to know whether the engine is ready yet.
//!
//! # Connectors
//!
//! [`EngineConnector`] hides where the byte streams come from.
//! [`ProcessConnector`] launches the configured engine executable; tests
//! plug in in-memory duplex pipes instead.

use super::protocol::UciCommand;
use crate::core::config::EngineCommand;
use std::fmt;
use std::io;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

/// Time a closed engine process gets to exit on `quit` before it is killed
const QUIT_GRACE: Duration = Duration::from_secs(1);

/// Which of the two engine conversations a line belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelKind {
    /// Produces move decisions
    Search,
    /// Produces best-effort position scores
    Evaluation,
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelKind::Search => write!(f, "search"),
            ChannelKind::Evaluation => write!(f, "evaluation"),
        }
    }
}

/// One line of engine output, tagged with where and when it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineEvent {
    /// Game generation the channel was opened for
    pub generation: u64,
    pub channel: ChannelKind,
    /// `None` once the engine closed its output
    pub line: Option<String>,
}

pub type EngineReader = Box<dyn AsyncRead + Send + Unpin>;
pub type EngineWriter = Box<dyn AsyncWrite + Send + Unpin>;

/// Byte streams of a connected engine, plus its process if there is one
pub struct EngineIo {
    pub reader: EngineReader,
    pub writer: EngineWriter,
    pub child: Option<Child>,
}

/// Source of engine connections
///
/// Called once per channel each time the bridge (re)opens its channels.
pub trait EngineConnector: Send {
    fn connect(&mut self, channel: ChannelKind) -> io::Result<EngineIo>;
}

/// Launches the engine executable with piped stdin/stdout
pub struct ProcessConnector {
    command: EngineCommand,
}

impl ProcessConnector {
    pub fn new(command: EngineCommand) -> Self {
        Self { command }
    }
}

impl EngineConnector for ProcessConnector {
    fn connect(&mut self, channel: ChannelKind) -> io::Result<EngineIo> {
        let mut child = Command::new(&self.command.program)
            .args(&self.command.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| io::Error::other("engine stdin not captured"))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| io::Error::other("engine stdout not captured"))?;

        debug!(
            "[ENGINE] Spawned {} for {} channel (pid {:?})",
            self.command.program,
            channel,
            child.id()
        );

        Ok(EngineIo {
            reader: Box::new(stdout),
            writer: Box::new(stdin),
            child: Some(child),
        })
    }
}

/// Handshake progress reported by [`EngineChannel::on_ack`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handshake {
    /// `uciok` received; new-game and readiness probe sent
    Loaded,
    /// `readyok` received; backlog flushed
    Ready,
}

/// A live conversation with one engine instance
pub struct EngineChannel {
    kind: ChannelKind,
    generation: u64,
    commands: mpsc::UnboundedSender<UciCommand>,
    reader_task: JoinHandle<()>,
    child: Option<Child>,
    loaded: bool,
    ready: bool,
    backlog: Vec<UciCommand>,
}

impl EngineChannel {
    /// Connect, start the reader/writer tasks and send `uci`
    pub fn open(
        kind: ChannelKind,
        generation: u64,
        connector: &mut dyn EngineConnector,
        events: mpsc::UnboundedSender<EngineEvent>,
    ) -> io::Result<Self> {
        let EngineIo {
            reader,
            writer,
            child,
        } = connector.connect(kind)?;

        let (commands, queue) = mpsc::unbounded_channel();
        tokio::spawn(write_commands(kind, writer, queue));
        let reader_task = tokio::spawn(forward_lines(kind, generation, reader, events));

        let channel = Self {
            kind,
            generation,
            commands,
            reader_task,
            child,
            loaded: false,
            ready: false,
            backlog: Vec::new(),
        };
        channel.write(UciCommand::Uci);
        Ok(channel)
    }

    /// Send a command, holding it back until the engine is ready
    pub fn send(&mut self, command: UciCommand) {
        if self.ready {
            self.write(command);
        } else {
            trace!("[ENGINE] {} not ready, queued: {}", self.kind, command);
            self.backlog.push(command);
        }
    }

    /// Advance the handshake on `uciok` / `readyok`
    pub fn on_ack(&mut self, ack: Handshake) {
        match ack {
            Handshake::Loaded => {
                self.loaded = true;
                self.write(UciCommand::UciNewGame);
                self.write(UciCommand::IsReady);
            }
            Handshake::Ready => {
                self.ready = true;
                for command in std::mem::take(&mut self.backlog) {
                    self.write(command);
                }
            }
        }
    }

    pub fn kind(&self) -> ChannelKind {
        self.kind
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Commands waiting for the handshake to finish
    pub fn pending(&self) -> usize {
        self.backlog.len()
    }

    /// Say `quit`, stop forwarding output and reap the process
    pub fn close(mut self) {
        debug!(
            "[ENGINE] Closing {} channel (generation {})",
            self.kind, self.generation
        );
        self.write(UciCommand::Quit);
        self.reader_task.abort();
        let Some(mut child) = self.child.take() else {
            return;
        };
        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                runtime.spawn(async move {
                    if tokio::time::timeout(QUIT_GRACE, child.wait()).await.is_err() {
                        let _ = child.start_kill();
                    }
                });
            }
            // No runtime left to wait on; kill_on_drop takes care of it
            Err(_) => drop(child),
        }
    }

    fn write(&self, command: UciCommand) {
        if self.commands.send(command).is_err() {
            warn!("[ENGINE] {} writer has stopped", self.kind);
        }
    }
}

impl Drop for EngineChannel {
    fn drop(&mut self) {
        self.reader_task.abort();
    }
}

async fn write_commands(
    kind: ChannelKind,
    mut writer: EngineWriter,
    mut queue: mpsc::UnboundedReceiver<UciCommand>,
) {
    while let Some(command) = queue.recv().await {
        trace!("[ENGINE] {} <- {}", kind, command);
        let line = format!("{command}\n");
        let written = async {
            writer.write_all(line.as_bytes()).await?;
            writer.flush().await
        };
        if let Err(e) = written.await {
            warn!("[ENGINE] Failed to write to {} channel: {}", kind, e);
            return;
        }
    }
}

async fn forward_lines(
    kind: ChannelKind,
    generation: u64,
    reader: EngineReader,
    events: mpsc::UnboundedSender<EngineEvent>,
) {
    let mut lines = BufReader::new(reader).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => Some(line),
            Ok(None) => None,
            Err(e) => {
                warn!("[ENGINE] Failed to read {} channel: {}", kind, e);
                None
            }
        };
        let closed = line.is_none();
        if let Some(text) = &line {
            trace!("[ENGINE] {} -> {}", kind, text);
        }

        let event = EngineEvent {
            generation,
            channel: kind,
            line,
        };
        if events.send(event).is_err() || closed {
            return;
        }
    }
}
