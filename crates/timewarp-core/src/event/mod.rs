//! Activity-log event model.
//!
//! An [`Event`] is one field-level change to a task, exactly as the activity
//! service reports it. The raw timestamp is kept as text; it is only parsed
//! when the event enters an [`EventLog`], where records with unparseable
//! timestamps are skipped rather than rejected.
//!
//! # Feed record shape
//!
//! ```json
//! {"id": 7, "taskId": 1, "actorId": "ana", "fieldName": "status",
//!  "oldValue": "todo", "newValue": "inprogress",
//!  "timestamp": "2024-01-02T10:00:00Z"}
//! ```
//!
//! `snake_case` spellings of every key are accepted as well.

pub mod log;
pub mod timestamp;
pub mod types;

pub use log::{EventLog, LoggedEvent};
pub use types::FieldName;

use crate::model::TaskId;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A single recorded change to one field of one task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Identifier assigned by the activity service. Only unique per task.
    #[serde(default, deserialize_with = "opaque_text")]
    pub id: Option<String>,

    /// The task this change belongs to.
    #[serde(alias = "task_id")]
    pub task_id: TaskId,

    /// Whoever made the change. Opaque.
    #[serde(default, alias = "actor_id", deserialize_with = "opaque_actor")]
    pub actor_id: String,

    /// Which field changed.
    #[serde(alias = "field_name")]
    pub field_name: FieldName,

    /// Value before the change. Audit/display only.
    #[serde(default, alias = "old_value")]
    pub old_value: Option<String>,

    /// Value after the change.
    #[serde(default, alias = "new_value")]
    pub new_value: Option<String>,

    /// When the change happened, as reported by the feed.
    #[serde(alias = "createdAt", alias = "created_at")]
    pub timestamp: String,
}

impl Event {
    /// Convenience constructor for a change with no recorded old value.
    pub fn change(
        task_id: impl Into<TaskId>,
        field_name: FieldName,
        new_value: impl Into<String>,
        timestamp: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            task_id: task_id.into(),
            actor_id: String::new(),
            field_name,
            old_value: None,
            new_value: Some(new_value.into()),
            timestamp: timestamp.into(),
        }
    }

    #[must_use]
    pub fn by(mut self, actor_id: impl Into<String>) -> Self {
        self.actor_id = actor_id.into();
        self
    }

    #[must_use]
    pub fn from_value(mut self, old_value: impl Into<String>) -> Self {
        self.old_value = Some(old_value.into());
        self
    }
}

/// Audit-only fields arrive as numbers or strings depending on the
/// service; either way only the text is kept.
fn opaque_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(Value::String(text)) => Some(text),
        Some(other) => Some(other.to_string()),
    })
}

fn opaque_actor<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    opaque_text(deserializer).map(Option::unwrap_or_default)
}

impl std::fmt::Display for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}: {} -> {}",
            self.timestamp,
            self.task_id,
            if self.actor_id.is_empty() { "-" } else { &self.actor_id },
            self.field_name,
            self.old_value.as_deref().unwrap_or("?"),
            self.new_value.as_deref().unwrap_or("null"),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserializes_camel_case_record() {
        let event: Event = serde_json::from_value(json!({
            "id": 7,
            "taskId": 1,
            "actorId": "ana",
            "fieldName": "status",
            "oldValue": "todo",
            "newValue": "inprogress",
            "timestamp": "2024-01-02T10:00:00Z"
        }))
        .expect("event");

        assert_eq!(event.id.as_deref(), Some("7"));
        assert_eq!(event.task_id, TaskId::from(1));
        assert_eq!(event.field_name, FieldName::Status);
        assert_eq!(event.new_value.as_deref(), Some("inprogress"));
    }

    #[test]
    fn deserializes_snake_case_record_with_created_at() {
        let event: Event = serde_json::from_value(json!({
            "task_id": "t-1",
            "field_name": "assigned_user",
            "new_value": null,
            "created_at": "2024-01-02 10:00:00"
        }))
        .expect("event");

        assert_eq!(event.task_id.as_str(), "t-1");
        assert_eq!(event.field_name, FieldName::AssignedUser);
        assert!(event.new_value.is_none());
        assert!(event.actor_id.is_empty());
        assert_eq!(event.timestamp, "2024-01-02 10:00:00");
    }

    #[test]
    fn audit_fields_accept_numbers_strings_and_null() {
        let event: Event = serde_json::from_value(json!({
            "id": "evt-2",
            "taskId": 1,
            "actorId": 7,
            "fieldName": "status",
            "newValue": "done",
            "timestamp": "2024-01-05T09:00:00Z"
        }))
        .expect("event");
        assert_eq!(event.id.as_deref(), Some("evt-2"));
        assert_eq!(event.actor_id, "7");

        let event: Event = serde_json::from_value(json!({
            "id": null,
            "taskId": 1,
            "actorId": null,
            "fieldName": "status",
            "newValue": "done",
            "timestamp": "2024-01-05T09:00:00Z"
        }))
        .expect("event");
        assert!(event.id.is_none());
        assert!(event.actor_id.is_empty());
    }

    #[test]
    fn missing_timestamp_is_a_record_error() {
        let parsed = serde_json::from_value::<Event>(json!({
            "taskId": 1,
            "fieldName": "status",
            "newValue": "done"
        }));
        assert!(parsed.is_err());
    }

    #[test]
    fn display_is_one_tab_separated_line() {
        let event = Event::change(1, FieldName::Priority, "high", "2024-01-02T10:00:00Z")
            .by("ana")
            .from_value("medium");
        assert_eq!(
            event.to_string(),
            "2024-01-02T10:00:00Z\t1\tana\tpriority: medium -> high"
        );
    }
}
