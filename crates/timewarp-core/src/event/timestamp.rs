//! Lenient timestamp parsing for activity-log and roster fields.
//!
//! Accepted forms, tried in order:
//!
//! 1. RFC 3339 with offset: `2024-01-02T10:00:00Z`, `2024-01-02T10:00:00.5+02:00`
//! 2. Naive date-time (`T` or space separated, optional fraction):
//!    `2024-01-02T10:00:00`, `2024-01-02 10:00:00.123`, interpreted in `zone`
//! 3. Bare calendar date `2024-01-02`: start of that day in `zone`
//!
//! Anything else yields `None`; callers skip the record.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parse a timestamp into an absolute instant.
///
/// Forms without an explicit offset are interpreted in `zone`.
#[must_use]
pub fn parse_instant(raw: &str, zone: FixedOffset) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return local_to_utc(naive, zone);
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .and_then(|naive| local_to_utc(naive, zone))
}

/// Calendar date of `raw` as seen from `zone`.
#[must_use]
pub fn parse_date(raw: &str, zone: FixedOffset) -> Option<NaiveDate> {
    parse_instant(raw, zone).map(|ts| ts.with_timezone(&zone).date_naive())
}

fn local_to_utc(naive: NaiveDateTime, zone: FixedOffset) -> Option<DateTime<Utc>> {
    zone.from_local_datetime(&naive)
        .single()
        .map(|ts| ts.with_timezone(&Utc))
}
