//! One reconstruction session: roster, log, baseline and timeline index.
//!
//! A [`TimeMachine`] owns read-only copies of the collaborator's inputs for
//! the lifetime of a scrub session and answers "what did everything look
//! like at position p / on date d". Every query is a pure function of the
//! session inputs, so repeated or dropped queries are always safe.

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};

use crate::baseline::{Baseline, DefaultBaseline};
use crate::event::{Event, EventLog};
use crate::model::Roster;
use crate::replay::{Snapshot, reconstruct};
use crate::timeline::{TimelineIndex, end_of_day};
use crate::view::SnapshotView;

pub struct TimeMachine {
    roster: Roster,
    log: EventLog,
    index: TimelineIndex,
    baseline: Box<dyn Baseline + Send>,
    zone: FixedOffset,
}

impl std::fmt::Debug for TimeMachine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimeMachine")
            .field("tasks", &self.roster.len())
            .field("events", &self.log.len())
            .field("anchors", &self.index.len())
            .field("zone", &self.zone)
            .finish_non_exhaustive()
    }
}

impl TimeMachine {
    /// Start a session with the default baseline and today's date from the
    /// wall clock.
    pub fn new(roster: Roster, events: Vec<Event>, zone: FixedOffset) -> Self {
        let log = EventLog::new(events, zone);
        let index = TimelineIndex::build(&log, &roster, zone);
        tracing::info!(
            tasks = roster.len(),
            events = log.len(),
            skipped = log.skipped(),
            anchors = index.len(),
            "time machine session ready"
        );
        Self {
            roster,
            log,
            index,
            baseline: Box::new(DefaultBaseline::default()),
            zone,
        }
    }

    /// Replace the baseline used for every reconstruction.
    #[must_use]
    pub fn with_baseline(mut self, baseline: impl Baseline + Send + 'static) -> Self {
        self.baseline = Box::new(baseline);
        self
    }

    /// Rebuild the timeline index with an explicit "today".
    #[must_use]
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.index = TimelineIndex::build_as_of(&self.log, &self.roster, today, self.zone);
        self
    }

    #[must_use]
    pub const fn roster(&self) -> &Roster {
        &self.roster
    }

    #[must_use]
    pub const fn log(&self) -> &EventLog {
        &self.log
    }

    #[must_use]
    pub const fn index(&self) -> &TimelineIndex {
        &self.index
    }

    #[must_use]
    pub const fn zone(&self) -> FixedOffset {
        self.zone
    }

    /// State as of the end of the anchor day selected by `position`.
    #[must_use]
    pub fn snapshot_at(&self, position: f64) -> Snapshot {
        self.snapshot_at_instant(self.index.position_to_instant(position))
    }

    /// State as of the end of `date`, which need not be an anchor date.
    #[must_use]
    pub fn snapshot_on(&self, date: NaiveDate) -> Snapshot {
        self.snapshot_at_instant(end_of_day(date, self.zone))
    }

    #[must_use]
    pub fn snapshot_at_instant(&self, target: DateTime<Utc>) -> Snapshot {
        reconstruct(&self.roster, self.baseline.as_ref(), &self.log, target, self.zone)
    }

    /// Aggregate a snapshot from this session for display.
    #[must_use]
    pub fn view(&self, snapshot: &Snapshot) -> SnapshotView {
        SnapshotView::new(snapshot, &self.roster)
    }
}
