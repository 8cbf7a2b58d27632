use anyhow::{Context as _, Result};
use clap::Args;
use serde::Serialize;
use std::io::{self, Write};
use std::time::Duration;
use timewarp_core::playback::{IntervalTimer, Scheduler};
use timewarp_core::{PlaybackController, StatusCounts, TickOutcome};

use super::{Context, InputArgs, open_session};
use crate::output::{Renderable, render_item, status_bar};

/// Arguments for `tw play`.
#[derive(Args, Debug)]
pub struct PlayArgs {
    #[command(flatten)]
    pub inputs: InputArgs,

    /// Scrub position to start from.
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub from: f64,

    /// Milliseconds between frames (overrides `playback.interval_ms`).
    #[arg(long, value_name = "MS")]
    pub interval_ms: Option<u64>,

    /// Position advance per frame (overrides `playback.increment`).
    #[arg(long)]
    pub increment: Option<f64>,
}

/// One rendered playback step.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Frame {
    pub position: f64,
    pub label: String,
    pub event_count: usize,
    pub counts: StatusCounts,
}

impl Frame {
    pub fn capture<S: Scheduler>(controller: &PlaybackController<S>) -> Self {
        let snapshot = controller.snapshot();
        let view = controller.machine().view(snapshot);
        Self {
            position: controller.position(),
            label: snapshot.label.clone(),
            event_count: snapshot.event_count,
            counts: view.counts,
        }
    }
}

impl Renderable for Frame {
    fn render_human(&self, w: &mut dyn Write) -> io::Result<()> {
        writeln!(
            w,
            "{:>5.1}  {:<13} {}  {} events",
            self.position,
            self.label,
            status_bar(&self.counts),
            self.event_count
        )
    }

    fn render_json(&self, w: &mut dyn Write) -> io::Result<()> {
        serde_json::to_writer(w, self).map_err(io::Error::from)
    }

    fn render_table(&self, w: &mut dyn Write) -> io::Result<()> {
        writeln!(
            w,
            "{:.1}\t{}\t{}\t{}\t{}\t{}",
            self.position,
            self.label,
            self.counts.todo,
            self.counts.in_progress,
            self.counts.done,
            self.event_count
        )
    }
}

/// Autoplay from `--from` to the end of the timeline, one frame per tick.
///
/// # Errors
///
/// Returns an error if the inputs cannot be loaded, output fails, or the
/// timer stops delivering ticks.
pub fn run_play(args: &PlayArgs, ctx: &Context) -> Result<()> {
    let machine = open_session(&args.inputs, ctx)?;

    let mut settings = ctx.config.playback.clone();
    if let Some(interval_ms) = args.interval_ms {
        settings.interval_ms = interval_ms;
    }
    if let Some(increment) = args.increment {
        settings.increment = increment;
    }

    let (timer, ticks) = IntervalTimer::new();
    let mut controller = PlaybackController::new(machine, timer, settings).starting_at(args.from);
    let patience = controller.settings().interval() * 20 + Duration::from_secs(1);

    let frames = drive(
        &mut controller,
        || {
            ticks
                .recv_timeout(patience)
                .context("playback timer stopped delivering ticks")
        },
        |frame| render_item(frame, ctx.output),
    )?;
    tracing::debug!(frames, "playback finished");
    Ok(())
}

/// Emit the opening frame, start playback and emit a frame per tick until
/// the end of the timeline. Returns the number of frames emitted.
fn drive<S: Scheduler, T>(
    controller: &mut PlaybackController<S>,
    mut wait: impl FnMut() -> Result<T>,
    mut emit: impl FnMut(&Frame) -> io::Result<()>,
) -> Result<usize> {
    emit(&Frame::capture(controller))?;
    let mut frames = 1;

    if !controller.play() {
        tracing::info!("already at the end of the timeline; nothing to play");
        return Ok(frames);
    }

    loop {
        wait()?;
        match controller.tick() {
            TickOutcome::Ignored => {}
            TickOutcome::Advanced => {
                emit(&Frame::capture(controller))?;
                frames += 1;
            }
            TickOutcome::Finished => {
                emit(&Frame::capture(controller))?;
                return Ok(frames + 1);
            }
        }
    }
}
