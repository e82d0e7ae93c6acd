//! Telemetry failures stay inside the pipeline.

use super::helpers::TracedApp;
use rstest::rstest;
use tasktrace::observability::adapters::InMemoryTraceExporter;
use tasktrace::task::ports::TaskStore;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn failing_exporter_never_reaches_the_caller() {
    let app = TracedApp::with_exporter(InMemoryTraceExporter::always_failing());

    let response = app.ask("add task: Write report", "single").await;

    assert_eq!(
        response,
        "Task created successfully: ID 1 - Write report (Priority: medium, Status: pending)"
    );
    assert!(app.traces().await.is_empty());
    let stats = app.manager.tracer().stats();
    assert_eq!(stats.traces_started, 1);
    assert_eq!(stats.traces_dropped, 1);
    assert_eq!(stats.traces_exported, 0);
    assert_eq!(stats.export_failures, 3);
    assert_eq!(app.manager.store().stats().total, 1);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn transient_export_failure_is_retried() {
    let app = TracedApp::with_exporter(InMemoryTraceExporter::failing_first(1));

    app.ask("show me the stats", "multi").await;

    let traces = app.traces().await;
    assert_eq!(traces.len(), 1);
    let stats = app.manager.tracer().stats();
    assert_eq!(stats.export_failures, 1);
    assert_eq!(stats.traces_dropped, 0);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn shutdown_flushes_pending_traces() {
    let app = TracedApp::with_exporter(InMemoryTraceExporter::new());
    for n in 0..4 {
        app.ask(&format!("add task: item {n}"), "single").await;
    }

    assert!(app.manager.tracer().shutdown(super::helpers::FLUSH_TIMEOUT).await);

    assert_eq!(app.exporter.records().len(), 4);
    assert_eq!(app.manager.tracer().stats().traces_exported, 4);
}
