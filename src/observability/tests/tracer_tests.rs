//! Trace and span lifecycle tests.

use std::sync::Arc;
use std::time::Duration;

use crate::observability::{
    adapters::InMemoryTraceExporter,
    domain::{ObservabilityError, SpanStatus, TraceRecord, TraceStatus},
    services::{TraceHandle, Tracer, TracerSettings},
};
use rstest::{fixture, rstest};

struct Harness {
    tracer: Tracer,
    exporter: InMemoryTraceExporter,
}

impl Harness {
    async fn exported(&self) -> Vec<TraceRecord> {
        assert!(self.tracer.flush(Duration::from_secs(2)).await);
        self.exporter.records()
    }

    fn open(&self) -> TraceHandle {
        self.tracer
            .start_trace("unit", [("backend", "single")])
            .expect("trace should open")
    }
}

#[fixture]
fn harness() -> Harness {
    let exporter = InMemoryTraceExporter::new();
    let tracer = Tracer::start(TracerSettings::default(), Arc::new(exporter.clone()))
        .expect("tracer should start inside the runtime");
    Harness { tracer, exporter }
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn ended_trace_is_exported_with_its_spans(harness: Harness) {
    let trace = harness.open();
    let span = trace.start_span("step").expect("span should open");
    span.set_input("in");
    span.set_output("out");
    span.record_event("checkpoint", [("n", "1")]);
    span.end(SpanStatus::Ok, None);
    trace.record_event("done", [("success", "true")]);
    trace.set_metadata("output", "summary");
    trace.end(TraceStatus::Ok, None);

    let records = harness.exported().await;
    let record = records.first().expect("one trace");
    assert_eq!(record.name, "unit");
    assert_eq!(record.status, TraceStatus::Ok);
    assert_eq!(record.error, None);
    assert_eq!(record.metadata_value("backend"), Some("single"));
    assert_eq!(record.metadata_value("output"), Some("summary"));
    assert_eq!(record.event_names(), vec!["done"]);
    let span_record = record.spans.first().expect("one span");
    assert_eq!(span_record.trace_id, record.trace_id);
    assert_eq!(span_record.input.as_deref(), Some("in"));
    assert_eq!(span_record.output.as_deref(), Some("out"));
    assert_eq!(span_record.events.len(), 1);
    assert!(record.end_time >= record.start_time);
    assert_eq!(harness.tracer.stats().traces_exported, 1);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn open_spans_are_aborted_when_trace_closes(harness: Harness) {
    let trace = harness.open();
    let span = trace.start_span("slow").expect("span should open");
    trace.end(TraceStatus::Ok, None);
    span.end(SpanStatus::Ok, None);

    let records = harness.exported().await;
    let record = records.first().expect("one trace");
    let aborted = record.spans.first().expect("one span");
    assert_eq!(aborted.status, SpanStatus::Aborted);
    assert_eq!(
        aborted.error.as_deref(),
        Some("trace closed while span was open")
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn dropped_span_is_aborted(harness: Harness) {
    let trace = harness.open();
    drop(trace.start_span("forgotten").expect("span should open"));
    trace.end(TraceStatus::Ok, None);

    let records = harness.exported().await;
    let span = records
        .first()
        .and_then(|record| record.spans.first())
        .expect("one span");
    assert_eq!(span.status, SpanStatus::Aborted);
    assert_eq!(
        span.error.as_deref(),
        Some("span handle dropped before the span was ended")
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn dropped_trace_is_closed_as_cancelled(harness: Harness) {
    drop(harness.open());

    let records = harness.exported().await;
    let record = records.first().expect("one trace");
    assert_eq!(record.status, TraceStatus::Error);
    assert_eq!(record.error.as_deref(), Some("cancelled"));
}

#[rstest]
#[case(None)]
#[case(Some("   ".to_owned()))]
#[tokio::test(flavor = "multi_thread")]
async fn error_trace_always_has_detail(harness: Harness, #[case] detail: Option<String>) {
    harness.open().end(TraceStatus::Error, detail);

    let records = harness.exported().await;
    let record = records.first().expect("one trace");
    assert_eq!(record.error.as_deref(), Some("unspecified error"));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn closed_trace_refuses_spans_and_ignores_writes(harness: Harness) {
    let trace = harness.open();
    trace.end(TraceStatus::Ok, None);

    assert!(trace.is_closed());
    assert!(matches!(
        trace.start_span("late"),
        Err(ObservabilityError::InvalidState(id)) if Some(id) == trace.id()
    ));
    trace.record_event("late", [("k", "v")]);
    trace.set_metadata("late", "value");
    trace.end(TraceStatus::Error, Some("again".to_owned()));

    let records = harness.exported().await;
    assert_eq!(records.len(), 1);
    let record = records.first().expect("one trace");
    assert_eq!(record.status, TraceStatus::Ok);
    assert!(record.events.is_empty());
    assert_eq!(record.metadata_value("late"), None);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn span_end_is_idempotent(harness: Harness) {
    let trace = harness.open();
    let span = trace.start_span("once").expect("span should open");
    span.end(SpanStatus::Error, Some("boom".to_owned()));
    span.end(SpanStatus::Ok, None);
    span.set_output("ignored");
    trace.end(TraceStatus::Ok, None);

    let records = harness.exported().await;
    let record = records.first().expect("one trace");
    assert_eq!(record.spans.len(), 1);
    let closed = record.spans.first().expect("one span");
    assert_eq!(closed.status, SpanStatus::Error);
    assert_eq!(closed.output, None);
}

#[rstest]
fn detached_handles_record_nothing() {
    let trace = TraceHandle::detached();
    assert_eq!(trace.id(), None);
    assert!(trace.is_closed());
    let span = trace.start_span("noop").expect("detached span");
    span.set_input("ignored");
    span.end(SpanStatus::Ok, None);
    trace.end(TraceStatus::Ok, None);
}

#[rstest]
fn tracer_requires_a_runtime() {
    let result = Tracer::start(
        TracerSettings::default(),
        Arc::new(InMemoryTraceExporter::new()),
    );
    assert!(matches!(result, Err(ObservabilityError::RuntimeUnavailable)));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn concurrent_traces_are_isolated(harness: Harness) {
    let tracer = harness.tracer.clone();
    let tasks: Vec<_> = (0..8)
        .map(|n| {
            let worker_tracer = tracer.clone();
            tokio::spawn(async move {
                let trace = worker_tracer
                    .start_trace(format!("request-{n}"), [("n", n.to_string())])
                    .expect("trace should open");
                let span = trace.start_span(format!("step-{n}")).expect("span should open");
                tokio::task::yield_now().await;
                span.end(SpanStatus::Ok, None);
                trace.end(TraceStatus::Ok, None);
            })
        })
        .collect();
    for task in tasks {
        task.await.expect("request task should finish");
    }

    let records = harness.exported().await;
    assert_eq!(records.len(), 8);
    for record in &records {
        let n = record.metadata_value("n").expect("n metadata");
        assert_eq!(record.name, format!("request-{n}"));
        assert_eq!(record.span_names(), vec![format!("step-{n}").as_str()]);
    }
}
