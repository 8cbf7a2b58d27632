//! Timeline index: the anchor dates a scrub position maps onto.
//!
//! The index is the sorted, deduplicated union of
//!
//! - the calendar date of every event in the log,
//! - the creation date of every roster task that reports one,
//! - today.
//!
//! It is never empty, so every scrub position resolves to some instant.
//!
//! # Position mapping
//!
//! A position `p` in `0..=100` selects `dates[round(p / 100 * (len - 1))]`
//! and resolves to the last instant of that day in the index's zone. Using
//! the end of the day means "state as of the end of this day": anything
//! logged during the selected day is included.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::Serialize;

use crate::event::EventLog;
use crate::event::timestamp::parse_date;
use crate::model::Roster;

/// Lowest scrub position.
pub const POSITION_MIN: f64 = 0.0;
/// Highest scrub position ("now").
pub const POSITION_MAX: f64 = 100.0;

/// Clamp a scrub position into `0..=100`. NaN maps to the start.
#[must_use]
pub fn clamp_position(position: f64) -> f64 {
    if position.is_nan() {
        POSITION_MIN
    } else {
        position.clamp(POSITION_MIN, POSITION_MAX)
    }
}

/// Sorted anchor dates for one reconstruction session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimelineIndex {
    dates: Vec<NaiveDate>,
    #[serde(skip)]
    zone: FixedOffset,
}

impl TimelineIndex {
    /// Build the index with today taken from the wall clock in `zone`.
    #[must_use]
    pub fn build(log: &EventLog, roster: &Roster, zone: FixedOffset) -> Self {
        let today = Utc::now().with_timezone(&zone).date_naive();
        Self::build_as_of(log, roster, today, zone)
    }

    /// Build the index with an explicit "today".
    #[must_use]
    pub fn build_as_of(
        log: &EventLog,
        roster: &Roster,
        today: NaiveDate,
        zone: FixedOffset,
    ) -> Self {
        let event_dates = log.iter().map(|e| e.at.with_timezone(&zone).date_naive());

        let creation_dates = roster.tasks().iter().filter_map(|task| {
            let raw = task.created_at.as_deref()?;
            let date = parse_date(raw, zone);
            if date.is_none() {
                tracing::debug!(task = %task.id, created_at = raw, "skipping malformed creation date");
            }
            date
        });

        let mut dates: Vec<NaiveDate> = event_dates
            .chain(creation_dates)
            .chain(std::iter::once(today))
            .collect();
        dates.sort_unstable();
        dates.dedup();

        Self { dates, zone }
    }

    /// Anchor dates, strictly increasing.
    #[must_use]
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    #[must_use]
    pub const fn zone(&self) -> FixedOffset {
        self.zone
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    /// Always false; kept for API symmetry with `len`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Index into [`dates`](Self::dates) selected by a scrub position.
    #[must_use]
    pub fn index_at(&self, position: f64) -> usize {
        let last = self.dates.len().saturating_sub(1);
        if last == 0 {
            return 0;
        }
        let fraction = clamp_position(position) / POSITION_MAX;
        #[allow(
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss,
            clippy::cast_precision_loss
        )]
        let index = (fraction * last as f64).round() as usize;
        index.min(last)
    }

    /// Anchor date selected by a scrub position.
    #[must_use]
    pub fn date_at(&self, position: f64) -> NaiveDate {
        self.dates[self.index_at(position)]
    }

    /// Target instant for a scrub position: end of the selected day.
    #[must_use]
    pub fn position_to_instant(&self, position: f64) -> DateTime<Utc> {
        end_of_day(self.date_at(position), self.zone)
    }

    /// Scrub position of the anchor at `index` (inverse of [`index_at`](Self::index_at)).
    #[must_use]
    pub fn position_of_index(&self, index: usize) -> f64 {
        let last = self.dates.len().saturating_sub(1);
        if last == 0 {
            return POSITION_MAX;
        }
        #[allow(clippy::cast_precision_loss)]
        let position = index.min(last) as f64 / last as f64 * POSITION_MAX;
        position
    }

    /// Scrub position of the latest anchor on or before `date`.
    ///
    /// Dates before the first anchor map to position 0.
    #[must_use]
    pub fn position_of(&self, date: NaiveDate) -> f64 {
        let at_or_before = self.dates.partition_point(|d| *d <= date);
        self.position_of_index(at_or_before.saturating_sub(1))
    }
}

/// Last representable instant of `date` in `zone` (23:59:59.999999999).
#[must_use]
pub fn end_of_day(date: NaiveDate, zone: FixedOffset) -> DateTime<Utc> {
    let last = NaiveTime::from_hms_nano_opt(23, 59, 59, 999_999_999).unwrap_or(NaiveTime::MIN);
    zone.from_local_datetime(&date.and_time(last))
        .single()
        .map_or_else(
            || date.and_time(last).and_utc(),
            |ts| ts.with_timezone(&Utc),
        )
}

/// Human label for a target date, e.g. `Jan 5, 2024`.
#[must_use]
pub fn date_label(date: NaiveDate) -> String {
    date.format("%b %-d, %Y").to_string()
}
