//! Shared helpers for the integration tests
//!
//! [`DuplexConnector`] stands in for the engine executable: every connect
//! creates an in-memory pipe and hands the engine's end to the test as a
//! [`ScriptedEngine`], which reads the session's commands and writes replies.

#![allow(dead_code)]

use std::io;
use std::time::Duration;
use tokio::io::{
    duplex, split, AsyncBufReadExt, AsyncWriteExt, BufReader, DuplexStream, Lines, ReadHalf,
    WriteHalf,
};
use tokio::sync::mpsc;
use tokio::time::timeout;
use xfchess_session::game::engine::{ChannelKind, EngineConnector, EngineIo};
use xfchess_session::{GameSession, SessionConfig, SessionEvent};

/// How long a test waits for a single line or event before failing
const STEP_TIMEOUT: Duration = Duration::from_secs(5);

/// Engine side of one channel
pub struct ScriptedEngine {
    pub kind: ChannelKind,
    lines: Lines<BufReader<ReadHalf<DuplexStream>>>,
    writer: WriteHalf<DuplexStream>,
}

impl ScriptedEngine {
    /// Next command the session sent
    pub async fn next_command(&mut self) -> String {
        timeout(STEP_TIMEOUT, self.lines.next_line())
            .await
            .expect("timed out waiting for an engine command")
            .expect("engine pipe failed")
            .expect("session closed the engine pipe")
    }

    pub async fn expect(&mut self, command: &str) {
        assert_eq!(self.next_command().await, command, "{:?} channel", self.kind);
    }

    pub async fn reply(&mut self, line: &str) {
        self.writer
            .write_all(format!("{line}\n").as_bytes())
            .await
            .expect("engine pipe failed");
    }
}

/// Connector that records the engine end of every channel it opens
pub struct DuplexConnector {
    ends: mpsc::UnboundedSender<ScriptedEngine>,
    connects: usize,
    /// 1-based connect attempt that fails as if the engine could not start
    fail_on: Option<usize>,
}

impl EngineConnector for DuplexConnector {
    fn connect(&mut self, channel: ChannelKind) -> io::Result<EngineIo> {
        self.connects += 1;
        if self.fail_on == Some(self.connects) {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                "engine executable not found",
            ));
        }

        let (session_end, engine_end) = duplex(64 * 1024);
        let (reader, writer) = split(session_end);
        let (engine_read, engine_write) = split(engine_end);

        self.ends
            .send(ScriptedEngine {
                kind: channel,
                lines: BufReader::new(engine_read).lines(),
                writer: engine_write,
            })
            .map_err(|_| io::Error::other("test dropped the engine receiver"))?;

        Ok(EngineIo {
            reader: Box::new(reader),
            writer: Box::new(writer),
            child: None,
        })
    }
}

/// Engine ends handed out by a [`DuplexConnector`], in connect order
pub struct EngineEnds {
    rx: mpsc::UnboundedReceiver<ScriptedEngine>,
}

impl EngineEnds {
    /// The search and evaluation ends of the next generation
    pub async fn next_pair(&mut self) -> (ScriptedEngine, ScriptedEngine) {
        let search = self.rx.recv().await.expect("no search channel opened");
        let evaluation = self.rx.recv().await.expect("no evaluation channel opened");
        assert_eq!(search.kind, ChannelKind::Search);
        assert_eq!(evaluation.kind, ChannelKind::Evaluation);
        (search, evaluation)
    }
}

pub fn connector() -> (DuplexConnector, EngineEnds) {
    connector_failing_on(None)
}

/// Connector whose `attempt`-th connect fails
pub fn connector_failing_on(attempt: Option<usize>) -> (DuplexConnector, EngineEnds) {
    let (ends, rx) = mpsc::unbounded_channel();
    let connector = DuplexConnector {
        ends,
        connects: 0,
        fail_on: attempt,
    };
    (connector, EngineEnds { rx })
}

/// Session plus the engine ends of its first generation
pub async fn start_session(
    config: SessionConfig,
) -> (GameSession, ScriptedEngine, ScriptedEngine, EngineEnds) {
    xfchess_session::init_tracing();
    let (connector, mut ends) = connector();
    let session = GameSession::new(config, connector).expect("session should start");
    let (search, evaluation) = ends.next_pair().await;
    (session, search, evaluation, ends)
}

/// Next event that is not a clock tick
pub async fn next_engine_event(session: &mut GameSession) -> SessionEvent {
    loop {
        let event = timeout(STEP_TIMEOUT, session.next_event())
            .await
            .expect("timed out waiting for a session event");
        if !matches!(event, SessionEvent::ClockTick(_)) {
            return event;
        }
    }
}

/// Drive the `uci` / `isready` handshake on one channel to completion
pub async fn handshake(session: &mut GameSession, engine: &mut ScriptedEngine) {
    engine.expect("uci").await;
    engine.reply("uciok").await;
    assert_eq!(next_engine_event(session).await, SessionEvent::EngineUpdate);
    engine.expect("ucinewgame").await;
    engine.expect("isready").await;
    engine.reply("readyok").await;
    assert_eq!(next_engine_event(session).await, SessionEvent::EngineUpdate);
}

/// Reply with a best move and wait until the session has applied it
pub async fn play_engine_move(
    session: &mut GameSession,
    engine: &mut ScriptedEngine,
    token: &str,
) -> xfchess_session::game::resources::MoveRecord {
    engine.reply(&format!("bestmove {token}")).await;
    match next_engine_event(session).await {
        SessionEvent::EngineMoved(record) => record,
        other => panic!("expected the engine move {token} to apply, got {other:?}"),
    }
}
