//! Domain model for the in-memory task store.
//!
//! Tasks carry a validated title, priority, status, optional description and
//! due date, and lifecycle timestamps. Raw caller input arrives through
//! [`NewTask`] and [`TaskPatch`] and is validated here before any state
//! changes, so adapters never hold an invalid task.

mod error;
mod ids;
mod request;
mod stats;
mod status;
mod task;

pub use error::{ParseTaskPriorityError, ParseTaskStatusError, TaskValidationError};
pub use ids::TaskId;
pub use request::{NewTask, TaskPatch};
pub use stats::TaskStats;
pub use status::{TaskPriority, TaskStatus};
pub use task::{Task, TaskTitle};
