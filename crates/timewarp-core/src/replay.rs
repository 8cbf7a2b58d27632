//! Point-in-time reconstruction of task state from the event log.
//!
//! # Algorithm
//!
//! 1. Seed every roster task with its [`Baseline`] state.
//! 2. Walk the log in replay order (timestamp, then feed order), stopping at
//!    the first event later than the target instant.
//! 3. For each event on a tracked task and a tracked field, overwrite that
//!    field with the event's new value.
//!
//! Forward iteration with overwrite gives last-write-wins per
//! `(task, field)` without special cases, and re-applying a value is a no-op.
//!
//! # Data quality
//!
//! Reconstruction never fails. Events for tasks missing from the roster,
//! untracked field names and status/priority changes without a new value are
//! skipped; they are not counted as applied.

use chrono::{DateTime, FixedOffset, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::baseline::{Baseline, UNASSIGNED};
use crate::event::{EventLog, FieldName, LoggedEvent};
use crate::model::{Roster, TaskId, TaskState};
use crate::timeline::date_label;

/// Reconstructed state of every roster task at one instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// Per-task state, keyed by task id.
    pub tasks: BTreeMap<TaskId, TaskState>,
    /// Number of events applied to reach this state.
    ///
    /// Only events that set a tracked field on a roster task count. Events
    /// on untracked fields and status/priority events without a new value
    /// are left out, so at position 100 this can be lower than the number of
    /// logged events for known tasks.
    pub event_count: usize,
    /// The instant the snapshot describes.
    pub target: DateTime<Utc>,
    /// Display label for the target date, e.g. `Jan 5, 2024`.
    pub label: String,
}

impl Snapshot {
    #[must_use]
    pub fn get(&self, id: &TaskId) -> Option<&TaskState> {
        self.tasks.get(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

/// Fold the log onto baseline state up to and including `target`.
///
/// `zone` only affects the date shown in [`Snapshot::label`].
pub fn reconstruct<B: Baseline + ?Sized>(
    roster: &Roster,
    baseline: &B,
    log: &EventLog,
    target: DateTime<Utc>,
    zone: FixedOffset,
) -> Snapshot {
    let mut tasks: BTreeMap<TaskId, TaskState> = roster
        .tasks()
        .iter()
        .map(|task| (task.id.clone(), baseline.baseline(task)))
        .collect();

    let window = log.upto(target);
    let mut event_count = 0usize;
    for entry in window {
        if apply(&mut tasks, entry) {
            event_count += 1;
        }
    }

    tracing::trace!(
        %target,
        considered = window.len(),
        applied = event_count,
        tasks = tasks.len(),
        "reconstructed snapshot"
    );

    Snapshot {
        tasks,
        event_count,
        target,
        label: date_label(target.with_timezone(&zone).date_naive()),
    }
}

/// Apply one event. Returns true if it changed (or re-set) a tracked field.
fn apply(tasks: &mut BTreeMap<TaskId, TaskState>, entry: &LoggedEvent) -> bool {
    let event = &entry.event;
    let Some(state) = tasks.get_mut(&event.task_id) else {
        return false;
    };

    match (&event.field_name, event.new_value.as_deref()) {
        (FieldName::Status, Some(value)) => state.status = value.to_string(),
        (FieldName::Priority, Some(value)) => state.priority = value.to_string(),
        (FieldName::AssignedUser, value) => {
            state.assigned_user = match value.map(str::trim) {
                Some(name) if !name.is_empty() => name.to_string(),
                _ => UNASSIGNED.to_string(),
            };
        }
        (FieldName::Status | FieldName::Priority, None) | (FieldName::Other(_), _) => {
            return false;
        }
    }
    true
}
