//! Task records and the persisted task document.
//!
//! The document is a single JSON object holding the ordered task list:
//! `{ "tasks": [ { "id": "...", "text": "...", "status": 0 } ] }`.
//! Per-session fields written by older builds (`selected`, `focused`) are
//! accepted on read and silently dropped.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum number of tasks the list will hold.
pub const MAX_TASKS: usize = 50;

/// Maximum task text length in characters.
pub const MAX_TASK_TEXT_CHARS: usize = 100;

/// Default status colors, indexed by [`Task::status`].
pub const DEFAULT_PALETTE: [&str; 5] = ["#5865F2", "#57F287", "#FEE75C", "#ED4245", "#EB459E"];

/// Stable identifier for a task.
///
/// Freshly created tasks get a UUID v7 string. Identifiers read from disk
/// are kept verbatim, whatever their shape (older builds used millisecond
/// timestamps such as `"1719937264123"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    /// Creates a new time-ordered task identifier (UUID v7).
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for TaskId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for TaskId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single to-do entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Unique, stable identifier.
    pub id: TaskId,
    /// Free-text content.
    #[serde(default)]
    pub text: String,
    /// Index into the status palette.
    #[serde(default)]
    pub status: u32,
}

impl Task {
    /// Creates an empty task with a fresh id and the first status.
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: TaskId::new(),
            text: String::new(),
            status: 0,
        }
    }

    /// Creates a task with explicit field values.
    #[must_use]
    pub fn with_fields(id: impl Into<TaskId>, text: impl Into<String>, status: u32) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            status,
        }
    }
}

impl Default for Task {
    fn default() -> Self {
        Self::new()
    }
}

/// The persisted document: the whole task list in display order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDocument {
    /// Tasks in display order (oldest first).
    pub tasks: Vec<Task>,
}

impl TaskDocument {
    /// Wraps a task list into a document.
    #[must_use]
    pub const fn new(tasks: Vec<Task>) -> Self {
        Self { tasks }
    }
}
