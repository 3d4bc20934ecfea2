/// Task model
///
/// A task is a to-do item owned by exactly one user. Its only state is the
/// `completed` flag, flipped unconditionally by a toggle.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     title TEXT NOT NULL CHECK (title <> ''),
///     description TEXT NOT NULL DEFAULT '',
///     completed BOOLEAN NOT NULL DEFAULT FALSE,
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A to-do item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    /// Unique task ID (UUID v4)
    pub id: Uuid,

    /// Short title, never empty
    pub title: String,

    /// Free text, may be empty
    pub description: String,

    /// Done or not
    pub completed: bool,

    /// Current owner
    pub user_id: Uuid,

    /// When the task was created
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Case-insensitive substring match over title or description
    pub fn matches(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        self.title.to_lowercase().contains(&term)
            || self.description.to_lowercase().contains(&term)
    }
}

/// Input for inserting a task
#[derive(Debug, Clone)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub user_id: Uuid,
}

/// Read-side query over tasks
///
/// Both fields compose: `owner` narrows to one user, `search` further keeps
/// tasks whose title or description contains the term, ignoring case.
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    /// Only tasks owned by this user
    pub owner: Option<Uuid>,

    /// Free-text term; blank terms are ignored
    pub search: Option<String>,
}

impl TaskFilter {
    /// Every task
    pub fn all() -> Self {
        Self::default()
    }

    /// Tasks owned by `user_id`
    pub fn owned_by(user_id: Uuid) -> Self {
        Self {
            owner: Some(user_id),
            search: None,
        }
    }

    /// Adds a search term; whitespace-only terms clear it
    pub fn with_search(mut self, term: Option<&str>) -> Self {
        self.search = term
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string);
        self
    }

    /// Whether `task` passes this filter
    pub fn accepts(&self, task: &Task) -> bool {
        if let Some(owner) = self.owner {
            if task.user_id != owner {
                return false;
            }
        }

        match &self.search {
            Some(term) => task.matches(term),
            None => true,
        }
    }
}
