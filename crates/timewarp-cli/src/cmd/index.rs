use anyhow::Result;
use chrono::NaiveDate;
use clap::Args;
use serde::Serialize;
use std::io::{self, Write};
use timewarp_core::TimeMachine;
use timewarp_core::timeline::date_label;

use super::{Context, InputArgs, open_session};
use crate::output::{pretty_kv, pretty_section, render_mode};

/// Arguments for `tw index`.
#[derive(Args, Debug)]
pub struct IndexArgs {
    #[command(flatten)]
    pub inputs: InputArgs,
}

/// One scrub stop on the timeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Anchor {
    pub index: usize,
    pub position: f64,
    pub date: NaiveDate,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexReport {
    pub zone: String,
    pub tasks: usize,
    pub events: usize,
    pub skipped_events: usize,
    pub anchors: Vec<Anchor>,
}

impl IndexReport {
    pub fn from_machine(machine: &TimeMachine) -> Self {
        let index = machine.index();
        let anchors = index
            .dates()
            .iter()
            .enumerate()
            .map(|(i, date)| Anchor {
                index: i,
                position: index.position_of_index(i),
                date: *date,
                label: date_label(*date),
            })
            .collect();

        Self {
            zone: machine.zone().to_string(),
            tasks: machine.roster().len(),
            events: machine.log().len(),
            skipped_events: machine.log().skipped(),
            anchors,
        }
    }
}

/// List the anchor dates and the scrub position of each.
///
/// # Errors
///
/// Returns an error if the inputs cannot be loaded or output fails.
pub fn run_index(args: &IndexArgs, ctx: &Context) -> Result<()> {
    let machine = open_session(&args.inputs, ctx)?;
    let report = IndexReport::from_machine(&machine);
    render_mode(ctx.output, &report, render_text, render_pretty)
}

fn render_text(report: &IndexReport, w: &mut dyn Write) -> io::Result<()> {
    for anchor in &report.anchors {
        writeln!(w, "{:.1}\t{}", anchor.position, anchor.date)?;
    }
    Ok(())
}

fn render_pretty(report: &IndexReport, w: &mut dyn Write) -> io::Result<()> {
    pretty_section(w, "Timeline")?;
    pretty_kv(w, "Zone", &report.zone)?;
    pretty_kv(w, "Tasks", report.tasks.to_string())?;
    let events = if report.skipped_events == 0 {
        report.events.to_string()
    } else {
        format!("{} ({} skipped)", report.events, report.skipped_events)
    };
    pretty_kv(w, "Events", events)?;
    writeln!(w)?;
    for anchor in &report.anchors {
        writeln!(w, "  {:>5.1}  {}", anchor.position, anchor.label)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;
    use timewarp_core::{Event, FieldName, Roster, Task};

    fn report() -> IndexReport {
        let zone = FixedOffset::east_opt(0).expect("utc");
        let machine = TimeMachine::new(
            Roster::new(vec![Task::new(1).with_created_at("2024-01-01")]),
            vec![
                Event::change(1, FieldName::Status, "inprogress", "2024-01-02T10:00:00Z"),
                Event::change(1, FieldName::Status, "done", "2024-01-05T09:00:00Z"),
            ],
            zone,
        )
        .with_today(NaiveDate::from_ymd_opt(2024, 1, 9).expect("date"));
        IndexReport::from_machine(&machine)
    }

    #[test]
    fn anchors_carry_evenly_spread_positions() {
        let report = report();
        let positions: Vec<f64> = report.anchors.iter().map(|a| a.position).collect();
        assert_eq!(positions.len(), 4);
        assert!((positions[0]).abs() < f64::EPSILON);
        assert!((positions[3] - 100.0).abs() < f64::EPSILON);
        assert_eq!(report.anchors[1].label, "Jan 2, 2024");
        assert_eq!(report.zone, "+00:00");
    }

    #[test]
    fn text_rows_are_tab_separated() {
        let mut buf = Vec::new();
        render_text(&report(), &mut buf).expect("render");
        let text = String::from_utf8(buf).expect("utf8");
        assert_eq!(text.lines().next(), Some("0.0\t2024-01-01"));
        assert_eq!(text.lines().last(), Some("100.0\t2024-01-09"));
    }
}
