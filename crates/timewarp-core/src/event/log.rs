//! Time-ordered, immutable event log for one reconstruction session.
//!
//! # Ordering
//!
//! Entries are sorted by `(at, seq)` where `at` is the parsed timestamp and
//! `seq` is the record's position in the feed. Events sharing a timestamp
//! therefore replay in feed order; later-inserted events overwrite earlier
//! ones for the same field.
//!
//! The sort happens once, when the log is built. Every reconstruction then
//! finds its cut point with a binary search, see [`EventLog::upto`].

use chrono::{DateTime, FixedOffset, Utc};

use super::Event;
use super::timestamp::parse_instant;

/// An event accepted into the log, with its resolved instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggedEvent {
    /// Position of the record in the original feed. Secondary sort key.
    pub seq: usize,
    /// Parsed timestamp. Primary sort key.
    pub at: DateTime<Utc>,
    pub event: Event,
}

/// Sorted event log. Records with malformed timestamps are left out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventLog {
    entries: Vec<LoggedEvent>,
    skipped: usize,
}

impl EventLog {
    /// Build a log from feed records.
    ///
    /// Timestamps without an explicit offset are interpreted in `zone`.
    /// Records whose timestamp cannot be parsed are dropped and counted in
    /// [`EventLog::skipped`].
    pub fn new(events: Vec<Event>, zone: FixedOffset) -> Self {
        let mut skipped = 0usize;
        let mut entries: Vec<LoggedEvent> = events
            .into_iter()
            .enumerate()
            .filter_map(|(seq, event)| {
                if let Some(at) = parse_instant(&event.timestamp, zone) {
                    Some(LoggedEvent { seq, at, event })
                } else {
                    tracing::debug!(
                        seq,
                        task = %event.task_id,
                        timestamp = %event.timestamp,
                        "skipping event with malformed timestamp"
                    );
                    skipped += 1;
                    None
                }
            })
            .collect();

        entries.sort_by(|a, b| a.at.cmp(&b.at).then_with(|| a.seq.cmp(&b.seq)));

        if skipped > 0 {
            tracing::warn!(skipped, kept = entries.len(), "event log has malformed timestamps");
        }

        Self { entries, skipped }
    }

    /// All entries in replay order.
    #[must_use]
    pub fn entries(&self) -> &[LoggedEvent] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &LoggedEvent> {
        self.entries.iter()
    }

    /// The prefix of the log with `at <= target`.
    ///
    /// Because entries are sorted, this is exactly the set a
    /// filter-then-apply pass would select, in the same order.
    #[must_use]
    pub fn upto(&self, target: DateTime<Utc>) -> &[LoggedEvent] {
        let cut = self.entries.partition_point(|entry| entry.at <= target);
        &self.entries[..cut]
    }

    /// Number of accepted entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of feed records dropped for malformed timestamps.
    #[must_use]
    pub const fn skipped(&self) -> usize {
        self.skipped
    }

    #[must_use]
    pub fn first_at(&self) -> Option<DateTime<Utc>> {
        self.entries.first().map(|e| e.at)
    }

    #[must_use]
    pub fn last_at(&self) -> Option<DateTime<Utc>> {
        self.entries.last().map(|e| e.at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::FieldName;

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).expect("utc")
    }

    fn status(task: u64, value: &str, ts: &str) -> Event {
        Event::change(task, FieldName::Status, value, ts)
    }

    fn at(raw: &str) -> DateTime<Utc> {
        parse_instant(raw, utc()).expect("instant")
    }

    #[test]
    fn sorts_by_timestamp() {
        let log = EventLog::new(
            vec![
                status(1, "done", "2024-01-05T09:00:00Z"),
                status(1, "inprogress", "2024-01-02T10:00:00Z"),
            ],
            utc(),
        );
        let values: Vec<_> = log
            .iter()
            .map(|e| e.event.new_value.as_deref().unwrap_or_default())
            .collect();
        assert_eq!(values, ["inprogress", "done"]);
        assert_eq!(log.first_at(), Some(at("2024-01-02T10:00:00Z")));
        assert_eq!(log.last_at(), Some(at("2024-01-05T09:00:00Z")));
    }

    #[test]
    fn equal_timestamps_keep_feed_order() {
        let ts = "2024-01-02T10:00:00Z";
        let log = EventLog::new(
            vec![
                status(1, "a", "2024-01-03T00:00:00Z"),
                status(1, "b", ts),
                status(1, "c", ts),
                status(1, "d", ts),
            ],
            utc(),
        );
        let values: Vec<_> = log
            .iter()
            .map(|e| e.event.new_value.as_deref().unwrap_or_default())
            .collect();
        assert_eq!(values, ["b", "c", "d", "a"]);
        let seqs: Vec<_> = log.iter().map(|e| e.seq).collect();
        assert_eq!(seqs, [1, 2, 3, 0]);
    }

    #[test]
    fn malformed_timestamps_are_skipped() {
        let log = EventLog::new(
            vec![
                status(1, "inprogress", "not a date"),
                status(1, "done", "2024-01-05T09:00:00Z"),
                status(2, "done", ""),
            ],
            utc(),
        );
        assert_eq!(log.len(), 1);
        assert_eq!(log.skipped(), 2);
    }

    #[test]
    fn upto_is_inclusive_prefix() {
        let log = EventLog::new(
            vec![
                status(1, "a", "2024-01-01T00:00:00Z"),
                status(1, "b", "2024-01-02T00:00:00Z"),
                status(1, "c", "2024-01-03T00:00:00Z"),
            ],
            utc(),
        );
        assert!(log.upto(at("2023-12-31T23:59:59Z")).is_empty());
        assert_eq!(log.upto(at("2024-01-02T00:00:00Z")).len(), 2);
        assert_eq!(log.upto(at("2030-01-01T00:00:00Z")).len(), 3);
    }

    #[test]
    fn empty_log() {
        let log = EventLog::new(Vec::new(), utc());
        assert!(log.is_empty());
        assert_eq!(log.first_at(), None);
        assert!(log.upto(Utc::now()).is_empty());
    }
}
