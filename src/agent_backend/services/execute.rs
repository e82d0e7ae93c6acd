//! Runs an interpreted intent against the traced task store.

use crate::agent_backend::domain::{AgentError, Intent, ListFilter};
use crate::task::{
    adapters::traced::TracedTaskStore,
    domain::{Task, TaskId, TaskStats},
    ports::TaskStore,
};

/// What a store call produced, ready to be rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A task was created.
    Created(Task),
    /// Tasks matching a filter, in creation order.
    Listed {
        /// The filter that was applied.
        filter: ListFilter,
        /// Matching tasks.
        tasks: Vec<Task>,
    },
    /// A single task was looked up.
    Retrieved(Task),
    /// A task was changed.
    Updated(Task),
    /// A task was removed.
    Deleted(TaskId),
    /// Store-wide counts.
    Stats(TaskStats),
}

/// Performs `intent` with exactly one store call.
///
/// # Errors
///
/// Returns [`AgentError::Store`] when the store rejects the call.
pub fn execute(intent: Intent, store: &TracedTaskStore<'_>) -> Result<Outcome, AgentError> {
    let outcome = match intent {
        Intent::Create(request) => Outcome::Created(store.create(request)?),
        Intent::List(filter) => {
            let tasks = match &filter {
                ListFilter::All => store.list(None)?,
                ListFilter::Status(status) => store.list(Some(status))?,
                ListFilter::Priority(priority) => store.list_by_priority(priority)?,
            };
            Outcome::Listed { filter, tasks }
        }
        Intent::Get(id) => Outcome::Retrieved(store.get(id)?),
        Intent::Update { id, patch } => Outcome::Updated(store.update(id, patch)?),
        Intent::Delete(id) => {
            store.delete(id)?;
            Outcome::Deleted(id)
        }
        Intent::Stats => Outcome::Stats(store.stats()),
    };
    Ok(outcome)
}
