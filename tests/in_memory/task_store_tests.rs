//! Store properties exercised through the public task store port.

use super::helpers::store;
use rstest::rstest;
use tasktrace::task::{
    adapters::memory::InMemoryTaskStore,
    domain::{NewTask, TaskId, TaskPatch, TaskStatus},
    ports::{TaskStore, TaskStoreError},
};

#[rstest]
fn create_then_stats(store: InMemoryTaskStore) {
    let task = store
        .create(NewTask::new("Write report").with_priority("high"))
        .expect("create should succeed");

    assert_eq!(task.id(), TaskId::new(1));
    assert_eq!(task.status(), TaskStatus::Pending);
    let stats = store.stats();
    assert_eq!((stats.pending, stats.total, stats.high), (1, 1, 1));
}

#[rstest]
fn complete_then_filter(store: InMemoryTaskStore) {
    let task = store
        .create(NewTask::new("Write report").with_priority("high"))
        .expect("create should succeed");

    let updated = store
        .update(task.id(), TaskPatch::new().with_status("completed"))
        .expect("update should succeed");

    assert_eq!(updated.status(), TaskStatus::Completed);
    assert!(updated.updated_at() >= task.updated_at());
    assert!(updated.completed_at().is_some());
    assert!(
        store
            .list(Some("pending"))
            .expect("list should succeed")
            .is_empty()
    );
}

#[rstest]
fn delete_then_every_call_is_not_found(store: InMemoryTaskStore) {
    let id = store
        .create(NewTask::new("Write report"))
        .expect("create should succeed")
        .id();

    store.delete(id).expect("delete should succeed");

    assert_eq!(store.get(id), Err(TaskStoreError::NotFound(id)));
    assert_eq!(
        store.update(id, TaskPatch::new().with_title("again")),
        Err(TaskStoreError::NotFound(id))
    );
    assert_eq!(store.delete(id), Err(TaskStoreError::NotFound(id)));
    assert_eq!(store.stats().total, 0);
}

#[rstest]
fn ids_survive_deletion_churn(store: InMemoryTaskStore) {
    let mut seen = Vec::new();
    for round in 0..5 {
        let task = store
            .create(NewTask::new(format!("round {round}")))
            .expect("create should succeed");
        assert!(!seen.contains(&task.id()));
        seen.push(task.id());
        if round % 2 == 0 {
            store.delete(task.id()).expect("delete should succeed");
        }
    }
    assert_eq!(store.stats().total, 2);
}

#[rstest]
fn updated_at_is_monotonic_over_many_updates(store: InMemoryTaskStore) {
    let task = store
        .create(NewTask::new("churn"))
        .expect("create should succeed");
    let mut previous = task.updated_at();

    for status in ["in_progress", "pending", "completed", "cancelled"] {
        let next = store
            .update(task.id(), TaskPatch::new().with_status(status))
            .expect("update should succeed");
        assert!(next.updated_at() >= previous);
        assert!(next.updated_at() >= next.created_at());
        previous = next.updated_at();
    }
}

#[rstest]
fn status_filter_is_exact_subset_in_creation_order(store: InMemoryTaskStore) {
    for (title, status) in [
        ("a", "pending"),
        ("b", "completed"),
        ("c", "pending"),
        ("d", "cancelled"),
        ("e", "pending"),
    ] {
        store
            .create(NewTask::new(title).with_status(status))
            .expect("create should succeed");
    }

    let pending = store.list(Some("pending")).expect("list should succeed");
    let titles: Vec<_> = pending.iter().map(|task| task.title().as_str()).collect();
    assert_eq!(titles, vec!["a", "c", "e"]);
    assert_eq!(store.list(None).expect("list should succeed").len(), 5);

    let stats = store.stats();
    assert_eq!(
        stats.pending + stats.in_progress + stats.completed + stats.cancelled,
        stats.total
    );
    assert_eq!(stats.high + stats.medium + stats.low, stats.total);
}
