//! Aggregate counts over the task store.

use super::{Task, TaskPriority, TaskStatus};
use serde::{Deserialize, Serialize};

/// Task counts by status and by priority.
///
/// The per-status counts and the per-priority counts each sum to `total`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskStats {
    /// Number of stored tasks.
    pub total: usize,
    /// Tasks with status `pending`.
    pub pending: usize,
    /// Tasks with status `in_progress`.
    pub in_progress: usize,
    /// Tasks with status `completed`.
    pub completed: usize,
    /// Tasks with status `cancelled`.
    pub cancelled: usize,
    /// Tasks with priority `high`.
    pub high: usize,
    /// Tasks with priority `medium`.
    pub medium: usize,
    /// Tasks with priority `low`.
    pub low: usize,
}

impl TaskStats {
    /// Counts the given tasks.
    #[must_use]
    pub fn from_tasks<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> Self {
        tasks.into_iter().fold(Self::default(), |mut stats, task| {
            stats.total += 1;
            *stats.status_slot(task.status()) += 1;
            *stats.priority_slot(task.priority()) += 1;
            stats
        })
    }

    /// Returns the number of tasks with the given status.
    #[must_use]
    pub const fn by_status(&self, status: TaskStatus) -> usize {
        match status {
            TaskStatus::Pending => self.pending,
            TaskStatus::InProgress => self.in_progress,
            TaskStatus::Completed => self.completed,
            TaskStatus::Cancelled => self.cancelled,
        }
    }

    /// Returns the number of tasks with the given priority.
    #[must_use]
    pub const fn by_priority(&self, priority: TaskPriority) -> usize {
        match priority {
            TaskPriority::High => self.high,
            TaskPriority::Medium => self.medium,
            TaskPriority::Low => self.low,
        }
    }

    const fn status_slot(&mut self, status: TaskStatus) -> &mut usize {
        match status {
            TaskStatus::Pending => &mut self.pending,
            TaskStatus::InProgress => &mut self.in_progress,
            TaskStatus::Completed => &mut self.completed,
            TaskStatus::Cancelled => &mut self.cancelled,
        }
    }

    const fn priority_slot(&mut self, priority: TaskPriority) -> &mut usize {
        match priority {
            TaskPriority::High => &mut self.high,
            TaskPriority::Medium => &mut self.medium,
            TaskPriority::Low => &mut self.low,
        }
    }
}
