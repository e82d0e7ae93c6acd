//! Behavioural tests for the in-memory task store.

use std::sync::Arc;

use super::clock::StepClock;
use crate::task::{
    adapters::memory::InMemoryTaskStore,
    domain::{NewTask, TaskId, TaskPatch, TaskPriority, TaskStatus, TaskValidationError},
    ports::{TaskStore, TaskStoreError},
};
use rstest::{fixture, rstest};

#[fixture]
fn clock() -> Arc<StepClock> {
    Arc::new(StepClock::new())
}

#[fixture]
fn store(clock: Arc<StepClock>) -> InMemoryTaskStore<StepClock> {
    InMemoryTaskStore::with_clock(clock)
}

fn seed(store: &impl TaskStore, requests: Vec<NewTask>) -> Vec<TaskId> {
    requests
        .into_iter()
        .map(|request| store.create(request).expect("seeding should succeed").id())
        .collect()
}

#[rstest]
fn ids_are_sequential_and_never_reused(store: InMemoryTaskStore<StepClock>) {
    let ids = seed(&store, vec![NewTask::new("a"), NewTask::new("b")]);
    assert_eq!(ids, vec![TaskId::new(1), TaskId::new(2)]);

    store.delete(TaskId::new(2)).expect("delete should succeed");
    let next = store.create(NewTask::new("c")).expect("create should succeed");

    assert_eq!(next.id(), TaskId::new(3));
}

#[rstest]
fn failed_create_does_not_consume_an_id(store: InMemoryTaskStore<StepClock>) {
    let result = store.create(NewTask::new("x").with_priority("critical"));
    assert!(matches!(
        result,
        Err(TaskStoreError::Validation(TaskValidationError::InvalidPriority(_)))
    ));

    let task = store.create(NewTask::new("y")).expect("create should succeed");
    assert_eq!(task.id(), TaskId::new(1));
    assert_eq!(store.stats().total, 1);
}

#[rstest]
fn list_returns_tasks_in_creation_order(store: InMemoryTaskStore<StepClock>) {
    seed(
        &store,
        vec![
            NewTask::new("first"),
            NewTask::new("second").with_status("completed"),
            NewTask::new("third"),
        ],
    );

    let all = store.list(None).expect("list should succeed");
    let titles: Vec<_> = all.iter().map(|task| task.title().as_str()).collect();
    assert_eq!(titles, vec!["first", "second", "third"]);

    let pending = store.list(Some("pending")).expect("filtered list should succeed");
    assert_eq!(pending.len(), 2);
    assert!(pending.iter().all(|task| task.status() == TaskStatus::Pending));
}

#[rstest]
fn list_rejects_unknown_status(store: InMemoryTaskStore<StepClock>) {
    let result = store.list(Some("blocked"));
    assert!(matches!(
        result,
        Err(TaskStoreError::Validation(TaskValidationError::InvalidStatus(_)))
    ));
}

#[rstest]
fn list_by_priority_filters(store: InMemoryTaskStore<StepClock>) {
    seed(
        &store,
        vec![
            NewTask::new("a").with_priority("high"),
            NewTask::new("b"),
            NewTask::new("c").with_priority("urgent"),
        ],
    );

    let high = store.list_by_priority("high").expect("filter should succeed");

    assert_eq!(high.len(), 2);
    assert!(high.iter().all(|task| task.priority() == TaskPriority::High));
    assert!(store.list_by_priority("critical").is_err());
}

#[rstest]
fn unknown_ids_are_not_found(store: InMemoryTaskStore<StepClock>) {
    let missing = TaskId::new(42);

    assert_eq!(store.get(missing), Err(TaskStoreError::NotFound(missing)));
    assert_eq!(
        store.update(missing, TaskPatch::new().with_status("done")),
        Err(TaskStoreError::NotFound(missing))
    );
    assert_eq!(store.delete(missing), Err(TaskStoreError::NotFound(missing)));
}

#[rstest]
fn deleted_task_is_gone(store: InMemoryTaskStore<StepClock>) {
    let ids = seed(&store, vec![NewTask::new("a")]);
    let id = *ids.first().expect("one id");

    store.delete(id).expect("delete should succeed");

    assert_eq!(store.get(id), Err(TaskStoreError::NotFound(id)));
    assert_eq!(store.delete(id), Err(TaskStoreError::NotFound(id)));
}

#[rstest]
fn update_persists_and_stamps_time(clock: Arc<StepClock>) {
    let store = InMemoryTaskStore::with_clock(Arc::clone(&clock));
    let created = store.create(NewTask::new("a")).expect("create should succeed");
    clock.advance(120);

    let updated = store
        .update(created.id(), TaskPatch::new().with_status("completed"))
        .expect("update should succeed");

    assert_eq!(updated.status(), TaskStatus::Completed);
    assert!(updated.updated_at() > created.updated_at());
    assert_eq!(store.get(created.id()), Ok(updated));
}

#[rstest]
fn invalid_update_leaves_task_unchanged(store: InMemoryTaskStore<StepClock>) {
    let created = store.create(NewTask::new("a")).expect("create should succeed");

    let result = store.update(
        created.id(),
        TaskPatch::new().with_title("b").with_due_date("tomorrow"),
    );

    assert!(matches!(
        result,
        Err(TaskStoreError::Validation(TaskValidationError::InvalidDueDate(_)))
    ));
    assert_eq!(store.get(created.id()), Ok(created));
}

#[rstest]
fn stats_reflect_store_contents(store: InMemoryTaskStore<StepClock>) {
    seed(
        &store,
        vec![
            NewTask::new("a").with_priority("high"),
            NewTask::new("b").with_status("in_progress"),
            NewTask::new("c").with_priority("low").with_status("done"),
        ],
    );

    let stats = store.stats();

    assert_eq!(stats.total, 3);
    assert_eq!(stats.pending, 1);
    assert_eq!(stats.in_progress, 1);
    assert_eq!(stats.completed, 1);
    assert_eq!(stats.cancelled, 0);
    assert_eq!((stats.high, stats.medium, stats.low), (1, 1, 1));
}

#[rstest]
fn clones_share_state(store: InMemoryTaskStore<StepClock>) {
    let other = store.clone();
    other.create(NewTask::new("shared")).expect("create should succeed");
    assert_eq!(store.stats().total, 1);
}

#[rstest]
fn concurrent_creates_allocate_distinct_ids(store: InMemoryTaskStore<StepClock>) {
    let ids: Vec<TaskId> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|n| {
                let store = &store;
                scope.spawn(move || {
                    store
                        .create(NewTask::new(format!("task {n}")))
                        .expect("create should succeed")
                        .id()
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().expect("thread should not panic"))
            .collect()
    });

    let mut sorted = ids.clone();
    sorted.sort();
    sorted.dedup();
    assert_eq!(sorted.len(), ids.len());
    assert_eq!(store.stats().total, 8);
}
