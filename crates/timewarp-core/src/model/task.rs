//! Task roster types supplied by the task service.
//!
//! The roster is read-only input: the engine only consults `id` and
//! `created_at`, the remaining fields feed display.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Identifier of a tracked task.
///
/// Feeds encode ids either as JSON numbers or strings; both normalize to the
/// same textual form so `1` and `"1"` refer to the same task.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    /// Create an id from any textual form. Surrounding whitespace is trimmed.
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self(raw.as_ref().trim().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TaskId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for TaskId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

macro_rules! task_id_from_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for TaskId {
                fn from(value: $ty) -> Self {
                    Self(value.to_string())
                }
            }
        )*
    };
}

task_id_from_int!(i32, i64, u32, u64, usize);

impl<'de> Deserialize<'de> for TaskId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Int(i64),
            Text(String),
        }

        match RawId::deserialize(deserializer)? {
            RawId::Int(n) => Ok(Self(n.to_string())),
            RawId::Text(s) => Ok(Self::new(s)),
        }
    }
}

/// A task as reported by the task service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default, alias = "assigned_user")]
    pub assigned_user: Option<String>,
    /// Creation timestamp or date, in any form accepted by
    /// [`crate::event::timestamp::parse_instant`].
    #[serde(default, alias = "created_at")]
    pub created_at: Option<String>,
}

impl Task {
    /// Minimal task with only an id, as used by tests and fixtures.
    pub fn new(id: impl Into<TaskId>) -> Self {
        Self {
            id: id.into(),
            title: String::new(),
            status: None,
            priority: None,
            assigned_user: None,
            created_at: None,
        }
    }

    #[must_use]
    pub fn with_created_at(mut self, created_at: impl Into<String>) -> Self {
        self.created_at = Some(created_at.into());
        self
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    #[must_use]
    pub fn with_assignee(mut self, assignee: impl Into<String>) -> Self {
        self.assigned_user = Some(assignee.into());
        self
    }
}

/// The set of tasks tracked during one reconstruction session.
///
/// Keeps the order the task service reported. When the same id appears more
/// than once, the first entry wins and later duplicates are dropped. Lookups
/// by id are constant time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roster {
    tasks: Vec<Task>,
    by_id: HashMap<TaskId, usize>,
}

impl Roster {
    pub fn new(tasks: Vec<Task>) -> Self {
        let mut by_id = HashMap::with_capacity(tasks.len());
        let mut kept = Vec::with_capacity(tasks.len());
        for task in tasks {
            if by_id.contains_key(&task.id) {
                tracing::debug!(task = %task.id, "dropping duplicate roster entry");
                continue;
            }
            by_id.insert(task.id.clone(), kept.len());
            kept.push(task);
        }
        Self { tasks: kept, by_id }
    }

    #[must_use]
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    #[must_use]
    pub fn get(&self, id: &TaskId) -> Option<&Task> {
        self.by_id.get(id).map(|&at| &self.tasks[at])
    }

    /// Roster position of a task, used to keep display lists in roster order.
    #[must_use]
    pub fn position(&self, id: &TaskId) -> Option<usize> {
        self.by_id.get(id).copied()
    }

    /// Roster position and entry of a task in one lookup.
    #[must_use]
    pub fn locate(&self, id: &TaskId) -> Option<(usize, &Task)> {
        self.by_id.get(id).map(|&at| (at, &self.tasks[at]))
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

impl FromIterator<Task> for Roster {
    fn from_iter<I: IntoIterator<Item = Task>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Reconstructed per-task state: the three fields the replay tracks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskState {
    pub status: String,
    pub priority: String,
    pub assigned_user: String,
}

impl TaskState {
    pub fn new(
        status: impl Into<String>,
        priority: impl Into<String>,
        assigned_user: impl Into<String>,
    ) -> Self {
        Self {
            status: status.into(),
            priority: priority.into(),
            assigned_user: assigned_user.into(),
        }
    }
}
