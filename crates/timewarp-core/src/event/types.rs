//! Field names carried by activity-log events.
//!
//! The replay tracks a small closed set of fields. Any other name is kept
//! verbatim as [`FieldName::Other`] so new fields can flow through the log
//! without changing the algorithm; the replay simply does not apply them.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// The field a change event touched.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldName {
    /// Workflow status (`todo`, `inprogress`, `done`, ...).
    Status,
    /// Priority (`low`, `medium`, `high`, ...).
    Priority,
    /// Assignee display name.
    AssignedUser,
    /// Any field the replay does not track.
    Other(String),
}

impl FieldName {
    /// The fields the replay applies, in display order.
    pub const TRACKED: [Self; 3] = [Self::Status, Self::Priority, Self::AssignedUser];

    /// Canonical wire spelling.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Status => "status",
            Self::Priority => "priority",
            Self::AssignedUser => "assignedUser",
            Self::Other(name) => name,
        }
    }

    /// Returns true for fields the replay applies.
    #[must_use]
    pub const fn is_tracked(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldName {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim() {
            "status" => Self::Status,
            "priority" => Self::Priority,
            "assignedUser" | "assigned_user" => Self::AssignedUser,
            other => Self::Other(other.to_string()),
        })
    }
}

impl Serialize for FieldName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for FieldName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        let Ok(field) = raw.parse::<Self>();
        Ok(field)
    }
}
