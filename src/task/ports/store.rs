//! Task store contract: create, read, list, update, delete and statistics.

use crate::task::domain::{NewTask, Task, TaskId, TaskPatch, TaskStats, TaskValidationError};
use thiserror::Error;

/// Result type for task store operations.
pub type TaskStoreResult<T> = Result<T, TaskStoreError>;

/// Synchronous task store contract.
///
/// Implementations serialise mutations (one writer at a time per store) and
/// may allow concurrent readers. Unknown identifiers always fail with
/// [`TaskStoreError::NotFound`]; nothing is silently ignored.
pub trait TaskStore: Send + Sync {
    /// Validates and stores a new task, allocating a fresh identifier.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::Validation`] when the request is malformed.
    fn create(&self, request: NewTask) -> TaskStoreResult<Task>;

    /// Returns the task with the given identifier.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::NotFound`] when no such task is stored.
    fn get(&self, id: TaskId) -> TaskStoreResult<Task>;

    /// Lists stored tasks in creation order, optionally filtered by status.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::Validation`] when the status filter is not a
    /// known status.
    fn list(&self, status: Option<&str>) -> TaskStoreResult<Vec<Task>>;

    /// Lists stored tasks with the given priority in creation order.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::Validation`] when the priority is not a
    /// known priority.
    fn list_by_priority(&self, priority: &str) -> TaskStoreResult<Vec<Task>>;

    /// Merges a partial update onto a stored task and returns the result.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::NotFound`] for an unknown identifier or
    /// [`TaskStoreError::Validation`] when a patched field is invalid.
    fn update(&self, id: TaskId, patch: TaskPatch) -> TaskStoreResult<Task>;

    /// Removes a task. Its identifier is never handed out again.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::NotFound`] when no such task is stored.
    fn delete(&self, id: TaskId) -> TaskStoreResult<()>;

    /// Counts stored tasks by status and priority. Never fails.
    fn stats(&self) -> TaskStats;
}

/// Errors returned by task store implementations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskStoreError {
    /// The input to the operation was malformed.
    #[error(transparent)]
    Validation(#[from] TaskValidationError),

    /// The referenced task does not exist.
    #[error("task {0} not found")]
    NotFound(TaskId),

    /// A previous writer panicked while holding the store lock.
    #[error("task store lock poisoned: {0}")]
    Poisoned(String),
}
