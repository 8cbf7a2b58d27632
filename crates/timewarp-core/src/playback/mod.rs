//! Scrub/playback state machine.
//!
//! Two axes: the scrub position (`0..=100`) and whether autoplay is running.
//!
//! ```text
//!            play (pos < 100)
//!   Idle  ─────────────────────▶  Playing
//!    ▲  ◀─────────────────────     │  tick: pos += increment
//!    │   pause / seek / step /     │
//!    │   tick reaching 100         │
//!    └── seek / step ──┘           ▼
//! ```
//!
//! Every position change re-runs the replay synchronously and caches the
//! result, so [`PlaybackController::snapshot`] always matches the current
//! position. The controller owns its [`Scheduler`]: the timer runs exactly
//! while `playing` is true and is stopped when the controller is closed or
//! dropped.

pub mod scheduler;

pub use scheduler::{IntervalTimer, ManualScheduler, Scheduler, Tick};

use serde::Serialize;

use crate::config::PlaybackConfig;
use crate::machine::TimeMachine;
use crate::replay::Snapshot;
use crate::timeline::{POSITION_MAX, clamp_position};

/// Scrub position plus play/pause flag.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlaybackState {
    pub position: f64,
    pub playing: bool,
}

/// Result of delivering one timer tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Not playing; the tick was stale and ignored.
    Ignored,
    /// Position advanced; playback continues.
    Advanced,
    /// Position reached the end; playback stopped.
    Finished,
}

pub struct PlaybackController<S: Scheduler> {
    machine: TimeMachine,
    scheduler: S,
    settings: PlaybackConfig,
    state: PlaybackState,
    snapshot: Snapshot,
    replays: usize,
}

impl<S: Scheduler> std::fmt::Debug for PlaybackController<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackController")
            .field("state", &self.state)
            .field("settings", &self.settings)
            .field("replays", &self.replays)
            .finish_non_exhaustive()
    }
}

impl<S: Scheduler> PlaybackController<S> {
    /// Open a session at position 100 ("now"), idle.
    ///
    /// Non-finite or non-positive increment/step settings fall back to the
    /// defaults.
    pub fn new(machine: TimeMachine, scheduler: S, settings: PlaybackConfig) -> Self {
        let settings = sanitize(settings);
        let snapshot = machine.snapshot_at(POSITION_MAX);
        Self {
            machine,
            scheduler,
            settings,
            state: PlaybackState {
                position: POSITION_MAX,
                playing: false,
            },
            snapshot,
            replays: 1,
        }
    }

    /// Move the initial position without counting as user interaction.
    #[must_use]
    pub fn starting_at(mut self, position: f64) -> Self {
        self.set_position(position);
        self
    }

    #[must_use]
    pub const fn state(&self) -> PlaybackState {
        self.state
    }

    #[must_use]
    pub const fn position(&self) -> f64 {
        self.state.position
    }

    #[must_use]
    pub const fn is_playing(&self) -> bool {
        self.state.playing
    }

    /// Snapshot for the current position.
    #[must_use]
    pub const fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    #[must_use]
    pub const fn machine(&self) -> &TimeMachine {
        &self.machine
    }

    #[must_use]
    pub const fn scheduler(&self) -> &S {
        &self.scheduler
    }

    #[must_use]
    pub const fn settings(&self) -> &PlaybackConfig {
        &self.settings
    }

    /// How many reconstructions this controller has run.
    #[must_use]
    pub const fn replay_count(&self) -> usize {
        self.replays
    }

    /// Jump to `position` (clamped). Cancels autoplay.
    pub fn seek(&mut self, position: f64) {
        self.halt();
        self.set_position(position);
    }

    /// Step forward by the configured step. Cancels autoplay.
    pub fn step_forward(&mut self) {
        self.seek(self.state.position + self.settings.step);
    }

    /// Step back by the configured step. Cancels autoplay.
    pub fn step_back(&mut self) {
        self.seek(self.state.position - self.settings.step);
    }

    /// Start autoplay from the current position.
    ///
    /// Returns false (and stays idle) when already at the end: playback
    /// never wraps around.
    pub fn play(&mut self) -> bool {
        if self.state.playing {
            return true;
        }
        if self.state.position >= POSITION_MAX {
            tracing::debug!("play requested at end of timeline; staying idle");
            return false;
        }
        self.state.playing = true;
        self.scheduler.start(self.settings.interval());
        tracing::debug!(position = self.state.position, "playback started");
        true
    }

    /// Stop autoplay, keeping the position.
    pub fn pause(&mut self) {
        self.halt();
    }

    /// Play if idle, pause if playing.
    pub fn toggle(&mut self) {
        if self.state.playing {
            self.pause();
        } else {
            self.play();
        }
    }

    /// Deliver one timer tick.
    pub fn tick(&mut self) -> TickOutcome {
        if !self.state.playing {
            return TickOutcome::Ignored;
        }

        let next = self.state.position + self.settings.increment;
        if next >= POSITION_MAX {
            self.halt();
            self.set_position(POSITION_MAX);
            tracing::debug!("playback reached the end of the timeline");
            TickOutcome::Finished
        } else {
            self.set_position(next);
            TickOutcome::Advanced
        }
    }

    /// Tear down the session: stop the timer and hand back the scheduler.
    pub fn close(mut self) -> S
    where
        S: Default,
    {
        self.halt();
        std::mem::take(&mut self.scheduler)
    }

    fn halt(&mut self) {
        if self.state.playing {
            tracing::debug!(position = self.state.position, "playback stopped");
        }
        self.state.playing = false;
        self.scheduler.stop();
    }

    fn set_position(&mut self, position: f64) {
        let position = clamp_position(position);
        self.state.position = position;
        self.snapshot = self.machine.snapshot_at(position);
        self.replays += 1;
    }
}

impl<S: Scheduler> Drop for PlaybackController<S> {
    fn drop(&mut self) {
        self.scheduler.stop();
    }
}

fn sanitize(settings: PlaybackConfig) -> PlaybackConfig {
    let defaults = PlaybackConfig::default();
    let positive = |value: f64, fallback: f64| {
        if value.is_finite() && value > 0.0 {
            value
        } else {
            tracing::warn!(value, fallback, "ignoring invalid playback setting");
            fallback
        }
    };
    PlaybackConfig {
        interval_ms: settings.interval_ms.max(1),
        increment: positive(settings.increment, defaults.increment),
        step: positive(settings.step, defaults.step),
    }
}
