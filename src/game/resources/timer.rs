//! Game clock with Fischer increments
//!
//! A per-side countdown that only runs while the engine is deliberating.
//! The remaining budgets are what the engine sees in its `go wtime ...`
//! command; the clock never forfeits a game and never gates move legality.
//!
//! # Timing
//!
//! All methods take `now` explicitly so the clock has no hidden time
//! source. The session passes `tokio::time::Instant::now()`, which lets
//! tests pause and advance time deterministically.
//!
//! # Tick
//!
//! [`GameClock::next_tick_delay`] returns the delay until the active side's
//! remaining time crosses the next whole second, so a display refreshed on
//! every tick stays aligned with second boundaries instead of drifting.

use crate::core::config::TimeControl;
use crate::game::rules::Side;
use serde::Serialize;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// Display snapshot of both clocks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClockView {
    pub white_ms: u64,
    pub black_ms: u64,
    pub active: Option<Side>,
}

#[derive(Debug, Clone)]
pub struct GameClock {
    control: TimeControl,
    white_remaining_ms: u64,
    black_remaining_ms: u64,
    active: Option<Side>,
    started_at: Option<Instant>,
}

impl GameClock {
    pub fn new(control: TimeControl) -> Self {
        Self {
            control,
            white_remaining_ms: control.white_ms,
            black_remaining_ms: control.black_ms,
            active: None,
            started_at: None,
        }
    }

    /// Start `side`'s clock, crediting its increment
    ///
    /// Returns `false` without touching anything if that side is already
    /// running, so a repeated start cannot double-count the increment. If
    /// the other side was running it is stopped first.
    pub fn start(&mut self, side: Side, now: Instant) -> bool {
        if self.active == Some(side) {
            return false;
        }
        if self.active.is_some() {
            self.stop(now);
        }

        let increment = self.control.increment(side);
        *self.stored_mut(side) += increment;
        self.active = Some(side);
        self.started_at = Some(now);
        debug!(
            "[CLOCK] {:?} started with {} ms (+{} ms)",
            side,
            self.stored(side),
            increment
        );
        true
    }

    /// Stop the running clock and charge the elapsed time
    ///
    /// Remaining time is floored at zero. Returns the elapsed milliseconds,
    /// or `None` if no clock was running.
    pub fn stop(&mut self, now: Instant) -> Option<u64> {
        let side = self.active.take()?;
        let started = self.started_at.take()?;
        let elapsed = elapsed_ms(started, now);
        let remaining = self.stored_mut(side);
        *remaining = remaining.saturating_sub(elapsed);
        debug!("[CLOCK] {:?} stopped after {} ms, {} ms left", side, elapsed, *remaining);
        Some(elapsed)
    }

    /// Remaining time for `side` as of `now`
    pub fn remaining_ms(&self, side: Side, now: Instant) -> u64 {
        let stored = self.stored(side);
        match (self.active, self.started_at) {
            (Some(active), Some(started)) if active == side => {
                stored.saturating_sub(elapsed_ms(started, now))
            }
            _ => stored,
        }
    }

    pub fn increment_ms(&self, side: Side) -> u64 {
        self.control.increment(side)
    }

    pub fn active(&self) -> Option<Side> {
        self.active
    }

    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    /// Delay until the active side's display should next change
    pub fn next_tick_delay(&self, now: Instant) -> Option<Duration> {
        let side = self.active?;
        let remaining = self.remaining_ms(side, now);
        Some(Duration::from_millis(remaining % 1000 + 1))
    }

    pub fn view(&self, now: Instant) -> ClockView {
        ClockView {
            white_ms: self.remaining_ms(Side::White, now),
            black_ms: self.remaining_ms(Side::Black, now),
            active: self.active,
        }
    }

    /// Restore the initial budgets and stop
    pub fn reset(&mut self) {
        *self = Self::new(self.control);
    }

    fn stored(&self, side: Side) -> u64 {
        match side {
            Side::White => self.white_remaining_ms,
            Side::Black => self.black_remaining_ms,
        }
    }

    fn stored_mut(&mut self, side: Side) -> &mut u64 {
        match side {
            Side::White => &mut self.white_remaining_ms,
            Side::Black => &mut self.black_remaining_ms,
        }
    }
}

fn elapsed_ms(started: Instant, now: Instant) -> u64 {
    u64::try_from(now.saturating_duration_since(started).as_millis()).unwrap_or(u64::MAX)
}
