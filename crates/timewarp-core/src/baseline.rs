//! Baseline state: what a task looked like before any logged event.
//!
//! Creation-time state is not part of the activity log, so the replay starts
//! every task from a baseline supplied through the [`Baseline`] trait. The
//! replay algorithm never depends on which implementation is used.
//!
//! - [`DefaultBaseline`]: fixed status/priority defaults plus the roster's
//!   current assignee. A task created directly as `done` reads as the default
//!   status until its first status event.
//! - [`RecordedBaseline`]: per-task creation states for systems that track
//!   them, falling back to another baseline for tasks without a record.
//! - Any `Fn(&Task) -> TaskState` closure.

use std::collections::HashMap;

use crate::config::BaselineConfig;
use crate::model::{Task, TaskId, TaskState};

/// Assignee label used when nobody is assigned.
pub const UNASSIGNED: &str = "Unassigned";

/// Source of the pre-history state of a task.
pub trait Baseline {
    fn baseline(&self, task: &Task) -> TaskState;
}

impl<F> Baseline for F
where
    F: Fn(&Task) -> TaskState,
{
    fn baseline(&self, task: &Task) -> TaskState {
        self(task)
    }
}

/// Fixed defaults for status and priority; assignee from the roster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultBaseline {
    pub status: String,
    pub priority: String,
}

impl Default for DefaultBaseline {
    fn default() -> Self {
        Self {
            status: "todo".to_string(),
            priority: "medium".to_string(),
        }
    }
}

impl From<&BaselineConfig> for DefaultBaseline {
    fn from(config: &BaselineConfig) -> Self {
        Self {
            status: config.status.clone(),
            priority: config.priority.clone(),
        }
    }
}

impl Baseline for DefaultBaseline {
    fn baseline(&self, task: &Task) -> TaskState {
        TaskState::new(
            self.status.clone(),
            self.priority.clone(),
            assignee_or_unassigned(task.assigned_user.as_deref()),
        )
    }
}

/// Recorded creation states, with a fallback for tasks that have none.
#[derive(Debug, Clone, Default)]
pub struct RecordedBaseline<B = DefaultBaseline> {
    recorded: HashMap<TaskId, TaskState>,
    fallback: B,
}

impl<B: Baseline> RecordedBaseline<B> {
    pub fn new(fallback: B) -> Self {
        Self {
            recorded: HashMap::new(),
            fallback,
        }
    }

    /// Record the creation-time state of one task.
    #[must_use]
    pub fn with(mut self, id: impl Into<TaskId>, state: TaskState) -> Self {
        self.recorded.insert(id.into(), state);
        self
    }

    pub fn insert(&mut self, id: TaskId, state: TaskState) {
        self.recorded.insert(id, state);
    }
}

impl<B: Baseline> Baseline for RecordedBaseline<B> {
    fn baseline(&self, task: &Task) -> TaskState {
        self.recorded
            .get(&task.id)
            .cloned()
            .unwrap_or_else(|| self.fallback.baseline(task))
    }
}

/// Normalize an optional/blank assignee to a display value.
#[must_use]
pub fn assignee_or_unassigned(assignee: Option<&str>) -> String {
    match assignee.map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => UNASSIGNED.to_string(),
    }
}
