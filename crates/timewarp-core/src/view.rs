//! Read-only projection of a [`Snapshot`] for presentation.
//!
//! Folds the per-task map into the three-way status bar (todo / in progress /
//! done), grouped task lists, and per-priority / per-assignee tallies. An
//! empty snapshot gives all-zero counts and no groups.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

use crate::model::{Roster, TaskId};
use crate::replay::Snapshot;

/// The three status-bar segments, plus a bucket for anything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusBucket {
    Todo,
    InProgress,
    Done,
    Other,
}

impl StatusBucket {
    /// Classify a raw status string. Case and `_`/`-`/space separators are
    /// ignored; `doing` counts as in progress.
    #[must_use]
    pub fn classify(status: &str) -> Self {
        let normalized: String = status
            .trim()
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .flat_map(char::to_lowercase)
            .collect();
        match normalized.as_str() {
            "todo" => Self::Todo,
            "inprogress" | "doing" => Self::InProgress,
            "done" => Self::Done,
            _ => Self::Other,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::InProgress => "inprogress",
            Self::Done => "done",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for StatusBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Task counts per status-bar segment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCounts {
    pub todo: usize,
    pub in_progress: usize,
    pub done: usize,
    pub other: usize,
}

impl StatusCounts {
    #[must_use]
    pub const fn total(&self) -> usize {
        self.todo + self.in_progress + self.done + self.other
    }

    #[must_use]
    pub const fn get(&self, bucket: StatusBucket) -> usize {
        match bucket {
            StatusBucket::Todo => self.todo,
            StatusBucket::InProgress => self.in_progress,
            StatusBucket::Done => self.done,
            StatusBucket::Other => self.other,
        }
    }

    const fn bump(&mut self, bucket: StatusBucket) {
        match bucket {
            StatusBucket::Todo => self.todo += 1,
            StatusBucket::InProgress => self.in_progress += 1,
            StatusBucket::Done => self.done += 1,
            StatusBucket::Other => self.other += 1,
        }
    }

    /// Share of tasks in `bucket`, `0.0` for an empty snapshot.
    #[must_use]
    pub fn fraction(&self, bucket: StatusBucket) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        #[allow(clippy::cast_precision_loss)]
        let share = self.get(bucket) as f64 / total as f64;
        share
    }
}

/// One task line in a grouped list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRow {
    pub id: TaskId,
    pub title: String,
    pub status: String,
    pub priority: String,
    pub assigned_user: String,
}

/// Tasks sharing one literal status value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusGroup {
    pub status: String,
    pub bucket: StatusBucket,
    pub tasks: Vec<TaskRow>,
}

/// Presentation-ready aggregation of a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotView {
    pub label: String,
    pub event_count: usize,
    pub counts: StatusCounts,
    /// Groups ordered todo, in progress, done, then other statuses by name.
    pub groups: Vec<StatusGroup>,
    pub by_priority: BTreeMap<String, usize>,
    pub by_assignee: BTreeMap<String, usize>,
}

impl SnapshotView {
    /// Aggregate `snapshot`. `roster` supplies titles and list order; tasks
    /// missing from it sort last by id.
    #[must_use]
    pub fn new(snapshot: &Snapshot, roster: &Roster) -> Self {
        let mut counts = StatusCounts::default();
        let mut by_priority: BTreeMap<String, usize> = BTreeMap::new();
        let mut by_assignee: BTreeMap<String, usize> = BTreeMap::new();
        let mut grouped: BTreeMap<(StatusBucket, String), Vec<(usize, TaskRow)>> = BTreeMap::new();

        for (id, state) in &snapshot.tasks {
            let bucket = StatusBucket::classify(&state.status);
            counts.bump(bucket);
            *by_priority.entry(state.priority.clone()).or_default() += 1;
            *by_assignee.entry(state.assigned_user.clone()).or_default() += 1;

            let (order, title) = roster
                .locate(id)
                .map_or_else(
                    || (usize::MAX, String::new()),
                    |(at, task)| (at, task.title.clone()),
                );
            grouped
                .entry((bucket, state.status.clone()))
                .or_default()
                .push((
                    order,
                    TaskRow {
                        id: id.clone(),
                        title,
                        status: state.status.clone(),
                        priority: state.priority.clone(),
                        assigned_user: state.assigned_user.clone(),
                    },
                ));
        }

        let groups = grouped
            .into_iter()
            .map(|((bucket, status), mut rows)| {
                rows.sort_by(|(a_order, a), (b_order, b)| {
                    a_order.cmp(b_order).then_with(|| a.id.cmp(&b.id))
                });
                StatusGroup {
                    status,
                    bucket,
                    tasks: rows.into_iter().map(|(_, row)| row).collect(),
                }
            })
            .collect();

        Self {
            label: snapshot.label.clone(),
            event_count: snapshot.event_count,
            counts,
            groups,
            by_priority,
            by_assignee,
        }
    }

    /// Rows in one bucket, across all literal statuses mapped to it.
    pub fn tasks_in(&self, bucket: StatusBucket) -> impl Iterator<Item = &TaskRow> {
        self.groups
            .iter()
            .filter(move |g| g.bucket == bucket)
            .flat_map(|g| g.tasks.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Task, TaskState};
    use chrono::Utc;

    fn snapshot(states: &[(u64, &str, &str, &str)]) -> Snapshot {
        Snapshot {
            tasks: states
                .iter()
                .map(|(id, s, p, a)| (TaskId::from(*id), TaskState::new(*s, *p, *a)))
                .collect(),
            event_count: 3,
            target: Utc::now(),
            label: "Jan 5, 2024".into(),
        }
    }

    #[test]
    fn classify_accepts_common_spellings() {
        assert_eq!(StatusBucket::classify("todo"), StatusBucket::Todo);
        assert_eq!(StatusBucket::classify("To-Do"), StatusBucket::Todo);
        assert_eq!(StatusBucket::classify("inprogress"), StatusBucket::InProgress);
        assert_eq!(StatusBucket::classify("in_progress"), StatusBucket::InProgress);
        assert_eq!(StatusBucket::classify("In Progress"), StatusBucket::InProgress);
        assert_eq!(StatusBucket::classify("doing"), StatusBucket::InProgress);
        assert_eq!(StatusBucket::classify("DONE"), StatusBucket::Done);
        assert_eq!(StatusBucket::classify("blocked"), StatusBucket::Other);
    }

    #[test]
    fn empty_snapshot_is_all_zero() {
        let view = SnapshotView::new(&snapshot(&[]), &Roster::default());
        assert_eq!(view.counts, StatusCounts::default());
        assert_eq!(view.counts.total(), 0);
        assert!(view.groups.is_empty());
        assert!(view.counts.fraction(StatusBucket::Done).abs() < f64::EPSILON);
    }

    #[test]
    fn counts_and_groups() {
        let roster = Roster::new(vec![
            Task::new(3).with_title("third"),
            Task::new(1).with_title("first"),
            Task::new(2).with_title("second"),
            Task::new(4).with_title("fourth"),
        ]);
        let snap = snapshot(&[
            (1, "done", "high", "ana"),
            (2, "todo", "medium", "Unassigned"),
            (3, "done", "medium", "ana"),
            (4, "blocked", "low", "bo"),
        ]);
        let view = SnapshotView::new(&snap, &roster);

        assert_eq!(
            view.counts,
            StatusCounts {
                todo: 1,
                in_progress: 0,
                done: 2,
                other: 1
            }
        );
        assert!((view.counts.fraction(StatusBucket::Done) - 0.5).abs() < f64::EPSILON);

        let statuses: Vec<_> = view.groups.iter().map(|g| g.status.as_str()).collect();
        assert_eq!(statuses, ["todo", "done", "blocked"]);

        let done: Vec<_> = view
            .tasks_in(StatusBucket::Done)
            .map(|r| r.title.as_str())
            .collect();
        assert_eq!(done, ["third", "first"]);

        assert_eq!(view.by_assignee.get("ana"), Some(&2));
        assert_eq!(view.by_priority.get("medium"), Some(&2));
        assert_eq!(view.event_count, 3);
        assert_eq!(view.label, "Jan 5, 2024");
    }

    #[test]
    fn large_rosters_list_rows_in_roster_order() {
        let roster: Roster = (0..2_000u64)
            .rev()
            .map(|id| Task::new(id).with_title(format!("task {id}")))
            .collect();
        let states: Vec<(u64, &str, &str, &str)> =
            (0..2_000u64).map(|id| (id, "todo", "medium", "Unassigned")).collect();
        let view = SnapshotView::new(&snapshot(&states), &roster);

        let rows: Vec<_> = view.tasks_in(StatusBucket::Todo).collect();
        assert_eq!(rows.len(), 2_000);
        assert_eq!(rows[0].id, TaskId::from(1_999));
        assert_eq!(rows[0].title, "task 1999");
        assert_eq!(rows[1_999].id, TaskId::from(0));
    }

    #[test]
    fn spellings_sharing_a_bucket_stay_separate_groups() {
        let snap = snapshot(&[(1, "inprogress", "m", "a"), (2, "in_progress", "m", "a")]);
        let view = SnapshotView::new(&snap, &Roster::default());
        assert_eq!(view.counts.in_progress, 2);
        assert_eq!(view.groups.len(), 2);
        assert_eq!(view.tasks_in(StatusBucket::InProgress).count(), 2);
    }
}
