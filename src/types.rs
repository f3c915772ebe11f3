//! Core data types for the task list.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::codec::{optional_timestamp, timestamp};

/// Maximum title length in characters, after trimming.
pub const MAX_TITLE_CHARS: usize = 100;

/// A single todo record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique identifier (UUID v4), never changes
    pub id: String,

    /// Short description of the work
    pub title: String,

    /// Whether the task is done
    pub completed: bool,

    /// When created, never changes
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,

    /// Optional deadline
    #[serde(default, skip_serializing_if = "Option::is_none", with = "optional_timestamp")]
    pub due_date: Option<DateTime<Utc>>,

    /// Fields this version does not know, written back unchanged
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// How close a task is to its deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DueStatus {
    /// The deadline has passed
    Overdue,
    /// Due within the next 24 hours
    DueSoon,
    /// Due later than that
    Normal,
}

impl Task {
    /// Deadline status relative to `now`, or `None` if the task has no due date.
    pub fn due_status(&self, now: DateTime<Utc>) -> Option<DueStatus> {
        let due = self.due_date?;
        let remaining = due - now;
        Some(if remaining < Duration::zero() {
            DueStatus::Overdue
        } else if remaining <= Duration::hours(24) {
            DueStatus::DueSoon
        } else {
            DueStatus::Normal
        })
    }
}

/// Partial update for a task.
///
/// `id` and `created_at` are accepted so a caller can hand over a whole
/// record, but the store always ignores them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub id: Option<String>,
    pub title: Option<String>,
    pub completed: Option<bool>,
    pub created_at: Option<DateTime<Utc>>,
    /// `Some(None)` clears the due date.
    pub due_date: Option<Option<DateTime<Utc>>>,
}

impl TaskPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn completed(mut self, completed: bool) -> Self {
        self.completed = Some(completed);
        self
    }

    pub fn due_date(mut self, due_date: DateTime<Utc>) -> Self {
        self.due_date = Some(Some(due_date));
        self
    }

    pub fn clear_due_date(mut self) -> Self {
        self.due_date = Some(None);
        self
    }

    /// Check if the patch changes any mutable field.
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.completed.is_none() && self.due_date.is_none()
    }
}

/// Validation errors for user-supplied titles.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    EmptyTitle,
    TitleTooLong,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::EmptyTitle => write!(f, "title cannot be empty"),
            ValidationError::TitleTooLong => {
                write!(f, "title exceeds {} characters", MAX_TITLE_CHARS)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Trim a raw title and check it is 1-100 characters.
///
/// The store takes titles as given; front ends call this first.
pub fn validate_title(raw: &str) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyTitle);
    }
    if trimmed.chars().count() > MAX_TITLE_CHARS {
        return Err(ValidationError::TitleTooLong);
    }
    Ok(trimmed.to_string())
}
