use anyhow::Result;
use chrono::NaiveDate;
use clap::Args;
use serde::Serialize;
use std::io::{self, Write};
use timewarp_core::timeline::{POSITION_MAX, clamp_position};
use timewarp_core::{StatusBucket, SnapshotView, TimeMachine};

use super::{Context, InputArgs, open_session};
use crate::output::{percent, pretty_kv, pretty_section, render_mode, status_bar};

/// Arguments for `tw snapshot`.
#[derive(Args, Debug)]
pub struct SnapshotArgs {
    #[command(flatten)]
    pub inputs: InputArgs,

    /// Scrub position from 0 (earliest date) to 100 (today). Defaults to 100.
    #[arg(short, long, allow_negative_numbers = true, conflicts_with = "date")]
    pub position: Option<f64>,

    /// Calendar date (YYYY-MM-DD); state as of the end of that day.
    #[arg(short, long)]
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotReport {
    pub position: f64,
    pub date: NaiveDate,
    #[serde(flatten)]
    pub view: SnapshotView,
}

impl SnapshotReport {
    /// Reconstruct at a date when given, otherwise at a scrub position.
    pub fn build(machine: &TimeMachine, position: Option<f64>, date: Option<NaiveDate>) -> Self {
        let index = machine.index();
        let (position, date, snapshot) = match date {
            Some(date) => (index.position_of(date), date, machine.snapshot_on(date)),
            None => {
                let position = clamp_position(position.unwrap_or(POSITION_MAX));
                (
                    position,
                    index.date_at(position),
                    machine.snapshot_at(position),
                )
            }
        };

        Self {
            position,
            date,
            view: machine.view(&snapshot),
        }
    }
}

/// Print the reconstructed state of every task at one point in time.
///
/// # Errors
///
/// Returns an error if the inputs cannot be loaded or output fails.
pub fn run_snapshot(args: &SnapshotArgs, ctx: &Context) -> Result<()> {
    let machine = open_session(&args.inputs, ctx)?;
    let report = SnapshotReport::build(&machine, args.position, args.date);
    tracing::debug!(
        position = report.position,
        date = %report.date,
        events = report.view.event_count,
        "snapshot ready"
    );
    render_mode(ctx.output, &report, render_text, render_pretty)
}

fn render_text(report: &SnapshotReport, w: &mut dyn Write) -> io::Result<()> {
    for group in &report.view.groups {
        for row in &group.tasks {
            writeln!(
                w,
                "{}\t{}\t{}\t{}\t{}",
                row.id, row.status, row.priority, row.assigned_user, row.title
            )?;
        }
    }
    Ok(())
}

fn render_pretty(report: &SnapshotReport, w: &mut dyn Write) -> io::Result<()> {
    let view = &report.view;
    let counts = &view.counts;

    pretty_section(
        w,
        &format!("Snapshot: {}  (position {:.1})", view.label, report.position),
    )?;
    pretty_kv(w, "Events", format!("{} applied", view.event_count))?;
    pretty_kv(w, "Status", status_bar(counts))?;
    let other = if counts.other > 0 {
        format!(" · other {}", counts.other)
    } else {
        String::new()
    };
    let summary = format!(
        "todo {} ({}) · in progress {} ({}) · done {} ({}){other}",
        counts.todo,
        percent(counts, StatusBucket::Todo),
        counts.in_progress,
        percent(counts, StatusBucket::InProgress),
        counts.done,
        percent(counts, StatusBucket::Done),
    );
    writeln!(w, "{:<12} {summary}", "")?;

    for group in &view.groups {
        writeln!(w)?;
        writeln!(w, "{} ({})", group.status, group.tasks.len())?;
        for row in &group.tasks {
            let title = if row.title.is_empty() { "-" } else { &row.title };
            writeln!(
                w,
                "  {:<8} {:<40} [{}]  {}",
                row.id, title, row.priority, row.assigned_user
            )?;
        }
    }

    if view.groups.is_empty() {
        writeln!(w)?;
        writeln!(w, "(no tasks)")?;
    }
    Ok(())
}
