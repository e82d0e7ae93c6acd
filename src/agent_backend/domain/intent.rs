//! Interpreted request intents.

use crate::task::domain::{NewTask, TaskId, TaskPatch};

/// What a request asks the task store to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// Create a task.
    Create(NewTask),
    /// List tasks, optionally filtered.
    List(ListFilter),
    /// Show one task.
    Get(TaskId),
    /// Change fields of one task.
    Update {
        /// Task to change.
        id: TaskId,
        /// Fields to merge onto it.
        patch: TaskPatch,
    },
    /// Remove one task.
    Delete(TaskId),
    /// Summarise counts by status and priority.
    Stats,
}

impl Intent {
    /// Short label used in events and error messages.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Create(_) => "create",
            Self::List(_) => "list",
            Self::Get(_) => "get",
            Self::Update { .. } => "update",
            Self::Delete(_) => "delete",
            Self::Stats => "stats",
        }
    }
}

/// Filter applied to a list intent. Values stay raw so the store decides
/// whether they are valid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ListFilter {
    /// Every task.
    #[default]
    All,
    /// Tasks with the given status.
    Status(String),
    /// Tasks with the given priority.
    Priority(String),
}

impl ListFilter {
    /// Human-readable description, or `None` for an unfiltered list.
    #[must_use]
    pub fn describe(&self) -> Option<String> {
        match self {
            Self::All => None,
            Self::Status(status) => Some(format!("status {status}")),
            Self::Priority(priority) => Some(format!("{priority} priority")),
        }
    }
}
