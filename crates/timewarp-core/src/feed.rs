//! Loading collaborator hand-offs: the event feed and the task roster.
//!
//! Both files hold records either as one JSON array or as JSON Lines (one
//! object per line, blank lines ignored). A document that is not JSON at all
//! is an error; an individual record that does not fit the expected shape is
//! skipped with a warning so one bad entry never hides the rest.

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::path::{Path, PathBuf};

use crate::error::ErrorCode;
use crate::event::Event;
use crate::model::Task;

/// Errors from reading or parsing an input file.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {what} from {origin}: {source}")]
    Parse {
        what: &'static str,
        origin: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{what} from {origin} must be a JSON array or JSON Lines, found {found}")]
    Shape {
        what: &'static str,
        origin: String,
        found: &'static str,
    },
}

impl FeedError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Read { .. } => ErrorCode::FeedReadFailed,
            Self::Parse { .. } | Self::Shape { .. } => ErrorCode::FeedParseError,
        }
    }
}

/// Records accepted from one input, plus how many were dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Loaded<T> {
    pub records: Vec<T>,
    pub skipped: usize,
}

/// Read the event feed from `path`.
///
/// # Errors
///
/// Returns [`FeedError`] if the file cannot be read or is not JSON/JSON Lines.
pub fn load_events(path: &Path) -> Result<Loaded<Event>, FeedError> {
    let text = read(path)?;
    parse_records(&text, "events", &path.display().to_string())
}

/// Read the task roster from `path`.
///
/// # Errors
///
/// Returns [`FeedError`] if the file cannot be read or is not JSON/JSON Lines.
pub fn load_roster(path: &Path) -> Result<Loaded<Task>, FeedError> {
    let text = read(path)?;
    parse_records(&text, "tasks", &path.display().to_string())
}

fn read(path: &Path) -> Result<String, FeedError> {
    std::fs::read_to_string(path).map_err(|source| FeedError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Parse records of type `T` from a JSON array or JSON Lines document.
///
/// `what` and `origin` only label errors and log lines.
///
/// # Errors
///
/// Returns [`FeedError::Parse`] for a malformed array document and
/// [`FeedError::Shape`] for a JSON document that is not an array.
pub fn parse_records<T: DeserializeOwned>(
    text: &str,
    what: &'static str,
    origin: &str,
) -> Result<Loaded<T>, FeedError> {
    let trimmed = text.trim_start();
    if trimmed.is_empty() {
        return Ok(Loaded {
            records: Vec::new(),
            skipped: 0,
        });
    }

    let values: Vec<(usize, Value)> = if trimmed.starts_with('[') {
        let doc: Value = serde_json::from_str(trimmed).map_err(|source| FeedError::Parse {
            what,
            origin: origin.to_string(),
            source,
        })?;
        match doc {
            Value::Array(items) => items.into_iter().enumerate().collect(),
            other => {
                return Err(FeedError::Shape {
                    what,
                    origin: origin.to_string(),
                    found: kind_of(&other),
                });
            }
        }
    } else {
        json_lines(text, what, origin)?
    };

    let mut skipped = 0usize;
    let mut records = Vec::with_capacity(values.len());
    for (at, value) in values {
        match serde_json::from_value::<T>(value) {
            Ok(record) => records.push(record),
            Err(err) => {
                skipped += 1;
                tracing::warn!(what, origin, record = at, error = %err, "skipping malformed record");
            }
        }
    }

    tracing::debug!(what, origin, loaded = records.len(), skipped, "parsed input");
    Ok(Loaded { records, skipped })
}

/// Split JSON Lines into values. Lines that are not JSON are skipped, unless
/// no line parses at all, which means the document is not JSON Lines.
fn json_lines(
    text: &str,
    what: &'static str,
    origin: &str,
) -> Result<Vec<(usize, Value)>, FeedError> {
    let mut values = Vec::new();
    let mut first_error = None;
    for (line_no, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<Value>(line) {
            Ok(Value::Object(map)) => values.push((line_no + 1, Value::Object(map))),
            Ok(other) => {
                tracing::warn!(what, origin, line = line_no + 1, found = kind_of(&other), "skipping non-object line");
            }
            Err(err) => {
                tracing::warn!(what, origin, line = line_no + 1, error = %err, "skipping unparseable line");
                first_error.get_or_insert(err);
            }
        }
    }

    match (values.is_empty(), first_error) {
        (true, Some(source)) => Err(FeedError::Parse {
            what,
            origin: origin.to_string(),
            source,
        }),
        _ => Ok(values),
    }
}

const fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
