//! Task aggregate root.

use super::{NewTask, TaskId, TaskPatch, TaskPriority, TaskStatus, TaskValidationError};
use chrono::{DateTime, NaiveDate, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Non-empty, trimmed task title.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskTitle(String);

impl TaskTitle {
    /// Creates a validated title.
    ///
    /// # Errors
    ///
    /// Returns [`TaskValidationError::EmptyTitle`] when the value is empty
    /// after trimming.
    pub fn new(value: impl Into<String>) -> Result<Self, TaskValidationError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(TaskValidationError::EmptyTitle);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the title as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for TaskTitle {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for TaskTitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Task aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    title: TaskTitle,
    description: Option<String>,
    priority: TaskPriority,
    status: TaskStatus,
    due_date: Option<NaiveDate>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Validates a creation request and builds the task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskValidationError`] when the title is empty or the
    /// priority, status or due date cannot be parsed.
    pub fn create(
        id: TaskId,
        request: &NewTask,
        clock: &impl Clock,
    ) -> Result<Self, TaskValidationError> {
        let title = TaskTitle::new(request.title.as_str())?;
        let priority = request
            .priority
            .as_deref()
            .map(TaskPriority::try_from)
            .transpose()?
            .unwrap_or_default();
        let status = request
            .status
            .as_deref()
            .map(TaskStatus::try_from)
            .transpose()?
            .unwrap_or_default();
        let due_date = request.due_date.as_deref().map(parse_due_date).transpose()?;

        let timestamp = clock.utc();
        Ok(Self {
            id,
            title,
            description: normalize_description(request.description.as_deref()),
            priority,
            status,
            due_date,
            created_at: timestamp,
            updated_at: timestamp,
            completed_at: (status == TaskStatus::Completed).then_some(timestamp),
        })
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the task title.
    #[must_use]
    pub const fn title(&self) -> &TaskTitle {
        &self.title
    }

    /// Returns the description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the task priority.
    #[must_use]
    pub const fn priority(&self) -> TaskPriority {
        self.priority
    }

    /// Returns the task status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns the due date, if any.
    #[must_use]
    pub const fn due_date(&self) -> Option<NaiveDate> {
        self.due_date
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest modification timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns when the task was last marked completed, if it still is.
    #[must_use]
    pub const fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Merges a partial update onto this task.
    ///
    /// Every field in the patch is validated before anything is written, so
    /// a rejected patch leaves the task unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`TaskValidationError`] when any provided field is invalid.
    pub fn apply(&mut self, patch: &TaskPatch, clock: &impl Clock) -> Result<(), TaskValidationError> {
        let title = patch.title.as_deref().map(TaskTitle::new).transpose()?;
        let priority = patch
            .priority
            .as_deref()
            .map(TaskPriority::try_from)
            .transpose()?;
        let status = patch
            .status
            .as_deref()
            .map(TaskStatus::try_from)
            .transpose()?;
        let due_date = patch.due_date.as_deref().map(parse_due_date).transpose()?;

        if let Some(value) = title {
            self.title = value;
        }
        if let Some(value) = patch.description.as_deref() {
            self.description = normalize_description(Some(value));
        }
        if let Some(value) = priority {
            self.priority = value;
        }
        if let Some(value) = due_date {
            self.due_date = Some(value);
        }
        self.touch(clock);
        if let Some(value) = status {
            self.set_status(value);
        }
        Ok(())
    }

    /// Records a status change, tracking the completion timestamp.
    fn set_status(&mut self, status: TaskStatus) {
        match (self.status, status) {
            (TaskStatus::Completed, TaskStatus::Completed) => {}
            (_, TaskStatus::Completed) => self.completed_at = Some(self.updated_at),
            _ => self.completed_at = None,
        }
        self.status = status;
    }

    /// Advances `updated_at` to the clock time, never moving it backwards.
    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc().max(self.updated_at);
    }
}

fn parse_due_date(value: &str) -> Result<NaiveDate, TaskValidationError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| TaskValidationError::InvalidDueDate(value.to_owned()))
}

fn normalize_description(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_owned)
}
