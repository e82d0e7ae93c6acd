//! Thread-safe in-memory task store.

use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use mockable::{Clock, DefaultClock};

use crate::task::{
    domain::{NewTask, Task, TaskId, TaskPatch, TaskPriority, TaskStats, TaskStatus},
    ports::{TaskStore, TaskStoreError, TaskStoreResult},
};

/// Volatile task store backed by an ordered map.
///
/// Identifiers come from a monotonic counter, so iterating the map by key
/// yields tasks in creation order. Writers take the lock exclusively;
/// readers share it.
pub struct InMemoryTaskStore<C = DefaultClock>
where
    C: Clock + Send + Sync,
{
    state: Arc<RwLock<InMemoryTaskState>>,
    clock: Arc<C>,
}

#[derive(Debug, Default)]
struct InMemoryTaskState {
    tasks: BTreeMap<TaskId, Task>,
    last_id: u64,
}

impl<C> Clone for InMemoryTaskStore<C>
where
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl InMemoryTaskStore<DefaultClock> {
    /// Creates an empty store using the system clock.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(Arc::new(DefaultClock))
    }
}

impl Default for InMemoryTaskStore<DefaultClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> InMemoryTaskStore<C>
where
    C: Clock + Send + Sync,
{
    /// Creates an empty store using the given clock for timestamps.
    #[must_use]
    pub fn with_clock(clock: Arc<C>) -> Self {
        Self {
            state: Arc::new(RwLock::new(InMemoryTaskState::default())),
            clock,
        }
    }

    fn read(&self) -> TaskStoreResult<RwLockReadGuard<'_, InMemoryTaskState>> {
        self.state
            .read()
            .map_err(|err| TaskStoreError::Poisoned(err.to_string()))
    }

    fn write(&self) -> TaskStoreResult<RwLockWriteGuard<'_, InMemoryTaskState>> {
        self.state
            .write()
            .map_err(|err| TaskStoreError::Poisoned(err.to_string()))
    }

    fn filtered(&self, predicate: impl Fn(&Task) -> bool) -> TaskStoreResult<Vec<Task>> {
        let state = self.read()?;
        Ok(state
            .tasks
            .values()
            .filter(|task| predicate(task))
            .cloned()
            .collect())
    }
}

impl<C> TaskStore for InMemoryTaskStore<C>
where
    C: Clock + Send + Sync,
{
    fn create(&self, request: NewTask) -> TaskStoreResult<Task> {
        let mut state = self.write()?;
        let id = TaskId::new(state.last_id + 1);
        let task = Task::create(id, &request, &*self.clock)?;
        // Only a successful create consumes an identifier.
        state.last_id = id.value();
        state.tasks.insert(id, task.clone());
        Ok(task)
    }

    fn get(&self, id: TaskId) -> TaskStoreResult<Task> {
        let state = self.read()?;
        state
            .tasks
            .get(&id)
            .cloned()
            .ok_or(TaskStoreError::NotFound(id))
    }

    fn list(&self, status: Option<&str>) -> TaskStoreResult<Vec<Task>> {
        match status.map(TaskStatus::try_from).transpose() {
            Ok(Some(wanted)) => self.filtered(|task| task.status() == wanted),
            Ok(None) => self.filtered(|_| true),
            Err(err) => Err(TaskStoreError::Validation(err.into())),
        }
    }

    fn list_by_priority(&self, priority: &str) -> TaskStoreResult<Vec<Task>> {
        let wanted = TaskPriority::try_from(priority)
            .map_err(|err| TaskStoreError::Validation(err.into()))?;
        self.filtered(|task| task.priority() == wanted)
    }

    fn update(&self, id: TaskId, patch: TaskPatch) -> TaskStoreResult<Task> {
        let mut state = self.write()?;
        let task = state
            .tasks
            .get_mut(&id)
            .ok_or(TaskStoreError::NotFound(id))?;
        task.apply(&patch, &*self.clock)?;
        Ok(task.clone())
    }

    fn delete(&self, id: TaskId) -> TaskStoreResult<()> {
        let mut state = self.write()?;
        state
            .tasks
            .remove(&id)
            .map(|_| ())
            .ok_or(TaskStoreError::NotFound(id))
    }

    fn stats(&self) -> TaskStats {
        // Counting is read-only, so a poisoned lock still holds usable data.
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        TaskStats::from_tasks(state.tasks.values())
    }
}
