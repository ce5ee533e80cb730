//! Todo record schema and input validation.
//!
//! # Design
//! Request payloads (`CreateTodo`, `UpdateTodo`) deserialize with every field
//! optional so that a missing `title` or an unknown `priority` becomes a
//! `TodoError::Validation` inside the response envelope instead of an
//! extractor rejection. `validate` turns them into the checked forms
//! (`NewTodo`, `TodoPatch`) that the store accepts. Fields other than `title`,
//! `completed` and `priority` are ignored on input.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::TodoError;

/// Severity attached to a todo.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Normal,
    Medium,
    Extreme,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Normal, Priority::Medium, Priority::Extreme];

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Normal => "normal",
            Priority::Medium => "medium",
            Priority::Extreme => "extreme",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = TodoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Priority::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| {
                TodoError::validation(format!(
                    "priority must be one of normal, medium, extreme (got {s:?})"
                ))
            })
    }
}

/// A persisted todo.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: Uuid,
    pub title: String,
    pub completed: bool,
    pub priority: Priority,
    pub created_at: DateTime<Utc>,
}

/// Raw create payload as sent by clients.
#[derive(Debug, Default, Deserialize)]
pub struct CreateTodo {
    pub title: Option<String>,
    pub completed: Option<bool>,
    pub priority: Option<String>,
}

/// Raw partial-update payload. Absent fields are left unchanged.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateTodo {
    pub title: Option<String>,
    pub completed: Option<bool>,
    pub priority: Option<String>,
}

/// A validated create payload, ready for insertion. The store assigns `id`
/// and `created_at`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewTodo {
    pub title: String,
    pub completed: bool,
    pub priority: Priority,
}

/// A validated partial update.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TodoPatch {
    pub title: Option<String>,
    pub completed: Option<bool>,
    pub priority: Option<Priority>,
}

fn check_title(title: &str) -> Result<(), TodoError> {
    if title.trim().is_empty() {
        return Err(TodoError::validation("title must not be empty"));
    }
    Ok(())
}

impl CreateTodo {
    pub fn validate(self) -> Result<NewTodo, TodoError> {
        let title = self
            .title
            .ok_or_else(|| TodoError::validation("title is required"))?;
        check_title(&title)?;
        let priority = self
            .priority
            .ok_or_else(|| TodoError::validation("priority is required"))?
            .parse()?;
        Ok(NewTodo {
            title,
            completed: self.completed.unwrap_or(false),
            priority,
        })
    }
}

impl UpdateTodo {
    /// Applies the same field rules as creation to whichever fields are present.
    pub fn validate(self) -> Result<TodoPatch, TodoError> {
        if let Some(title) = &self.title {
            check_title(title)?;
        }
        let priority = self.priority.as_deref().map(str::parse::<Priority>).transpose()?;
        Ok(TodoPatch {
            title: self.title,
            completed: self.completed,
            priority,
        })
    }
}

impl TodoPatch {
    /// Merge the present fields onto `todo`. `id` and `created_at` never change.
    pub fn apply(self, todo: &mut Todo) {
        if let Some(title) = self.title {
            todo.title = title;
        }
        if let Some(completed) = self.completed {
            todo.completed = completed;
        }
        if let Some(priority) = self.priority {
            todo.priority = priority;
        }
    }
}
