//! Every request yields exactly one trace whose spans mirror store calls.

use super::helpers::{TracedApp, app};
use rstest::rstest;
use tasktrace::{
    observability::domain::{SpanStatus, TraceStatus},
    orchestrator::{ConfigurationError, OrchestratorError},
};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn single_backend_create_yields_one_span(app: TracedApp) {
    let response = app
        .ask("Create a high priority task: ship release", "single")
        .await;

    assert_eq!(
        response,
        "Task created successfully: ID 1 - ship release (Priority: high, Status: pending)"
    );
    let traces = app.traces().await;
    assert_eq!(traces.len(), 1);
    let trace = traces.first().expect("one trace");
    assert_eq!(trace.status, TraceStatus::Ok);
    assert_eq!(trace.span_names(), vec!["task_store.create"]);
    assert!(trace.end_time >= trace.start_time);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unknown_backend_creates_no_trace(app: TracedApp) {
    let result = app.manager.process("list tasks", "unknown").await;

    assert!(matches!(
        result,
        Err(OrchestratorError::Configuration(ConfigurationError::UnknownBackend(_)))
    ));
    assert!(app.traces().await.is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn spans_follow_store_call_order(app: TracedApp) {
    app.ask("add task: one; add task: two; complete task 1; show stats", "multi")
        .await;

    let traces = app.traces().await;
    let trace = traces.first().expect("one trace");
    assert_eq!(
        trace.span_names(),
        vec![
            "task_store.create",
            "task_store.create",
            "task_store.update",
            "task_store.stats",
        ]
    );
    assert!(trace.spans.iter().all(|span| span.status == SpanStatus::Ok));
    assert!(trace.spans.iter().all(|span| span.end_time >= span.start_time));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn conversation_across_requests(app: TracedApp) {
    app.ask("Create a high priority task: Write report", "single")
        .await;
    app.ask("add task: Book venue due 2026-11-01", "multi").await;
    let done = app.ask("mark task 1 as completed", "single").await;
    let listing = app.ask("list pending tasks", "multi").await;
    let missing = app.ask("show task 9", "single").await;

    assert_eq!(
        done,
        "Task 1 updated successfully: Write report - Status: completed, Priority: high"
    );
    assert_eq!(
        listing,
        "Found 1 task(s) with status pending:\n  • ID 2: Book venue (pending, medium priority)"
    );
    assert_eq!(missing, "Error processing request: task 9 not found");

    let traces = app.traces().await;
    assert_eq!(traces.len(), 5);
    let failed: Vec<_> = traces
        .iter()
        .filter(|trace| trace.status == TraceStatus::Error)
        .collect();
    assert_eq!(failed.len(), 1);
    assert!(
        failed
            .iter()
            .all(|trace| trace.error.as_deref().is_some_and(|detail| !detail.is_empty()))
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn validation_failures_are_answered_not_raised(app: TracedApp) {
    app.ask("add task: Write report", "single").await;

    let response = app.ask("update task 1 status to blocked", "single").await;

    assert_eq!(
        response,
        "Error processing request: unknown task status 'blocked', expected pending, in_progress, completed or cancelled"
    );
    let traces = app.traces().await;
    let trace = traces.last().expect("second trace");
    assert_eq!(trace.metadata_value("error_kind"), Some("validation"));
}
