//! Todo model and derived list counters

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier for a todo, assigned by the server on creation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TodoId(String);

impl TodoId {
    /// Get the string representation of this ID
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TodoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for TodoId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for TodoId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// A single todo as the server reports it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    /// Unique identifier
    pub id: TodoId,
    /// Task text, stored exactly as the user typed it
    pub text: String,
    /// Completion flag
    pub completed: bool,
}

/// Partial todo returned by the toggle mutation.
///
/// Carries only the fields the server echoes back; merged into an existing
/// cached entity, never used to create one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoPatch {
    pub id: TodoId,
    pub completed: bool,
}

/// Derived counters over a todo list.
///
/// Always computed from the list being shown, never stored, so the numbers
/// cannot drift from the rows on screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TodoSummary {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
}

impl TodoSummary {
    /// Count a list. `pending` is exactly `total - completed`.
    #[must_use]
    pub fn of(todos: &[Todo]) -> Self {
        let total = todos.len();
        let completed = todos.iter().filter(|todo| todo.completed).count();
        Self {
            total,
            completed,
            pending: total - completed,
        }
    }
}
