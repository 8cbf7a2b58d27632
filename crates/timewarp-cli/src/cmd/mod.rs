pub mod completions;
pub mod index;
pub mod play;
pub mod snapshot;

use anyhow::Result;
use chrono::{FixedOffset, NaiveDate};
use clap::Args;
use std::path::PathBuf;
use timewarp_core::config::TimewarpConfig;
use timewarp_core::feed::{load_events, load_roster};
use timewarp_core::{DefaultBaseline, Roster, TimeMachine};

use crate::output::OutputMode;

/// Everything a command needs besides its own arguments.
#[derive(Debug, Clone)]
pub struct Context {
    pub config: TimewarpConfig,
    pub zone: FixedOffset,
    /// Pinned "today"; the wall clock is used when absent.
    pub today: Option<NaiveDate>,
    pub output: OutputMode,
}

/// Input files shared by every reconstruction command.
#[derive(Args, Debug, Clone)]
pub struct InputArgs {
    /// Activity feed: JSON array or JSON Lines of change events.
    #[arg(short, long, value_name = "PATH")]
    pub events: PathBuf,

    /// Task roster: JSON array or JSON Lines of tasks.
    #[arg(short, long, value_name = "PATH")]
    pub tasks: PathBuf,
}

/// Load both inputs and open a reconstruction session.
///
/// # Errors
///
/// Returns an error if either input cannot be read or parsed.
pub fn open_session(inputs: &InputArgs, ctx: &Context) -> Result<TimeMachine> {
    let events = load_events(&inputs.events)?;
    let roster = load_roster(&inputs.tasks)?;
    if events.skipped + roster.skipped > 0 {
        tracing::warn!(
            events = events.skipped,
            tasks = roster.skipped,
            "ignored malformed input records"
        );
    }

    let machine = TimeMachine::new(Roster::new(roster.records), events.records, ctx.zone)
        .with_baseline(DefaultBaseline::from(&ctx.config.baseline));
    Ok(match ctx.today {
        Some(today) => machine.with_today(today),
        None => machine,
    })
}
