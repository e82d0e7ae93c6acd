//! Runs a backend against a fresh store inside one exported trace.

use std::sync::Arc;
use std::time::Duration;

use crate::agent_backend::ports::{AgentBackend, AgentResult};
use crate::observability::{
    adapters::InMemoryTraceExporter,
    domain::{TraceRecord, TraceStatus},
    services::{Tracer, TracerSettings},
};
use crate::task::adapters::{memory::InMemoryTaskStore, traced::TracedTaskStore};

pub struct Harness {
    pub store: InMemoryTaskStore,
    tracer: Tracer,
    exporter: InMemoryTraceExporter,
}

impl Harness {
    pub fn new() -> Self {
        let exporter = InMemoryTraceExporter::new();
        let tracer = Tracer::start(TracerSettings::default(), Arc::new(exporter.clone()))
            .expect("tracer should start");
        Self {
            store: InMemoryTaskStore::new(),
            tracer,
            exporter,
        }
    }

    /// Handles `input` and returns the result with the trace it produced.
    pub async fn run(
        &self,
        backend: &dyn AgentBackend,
        input: &str,
    ) -> (AgentResult<String>, TraceRecord) {
        let trace = self
            .tracer
            .start_trace("backend_test", [("backend", backend.kind().as_str())])
            .expect("trace should open");
        let result = backend
            .handle(input, &TracedTaskStore::new(&self.store, &trace))
            .await;
        trace.end(TraceStatus::Ok, None);
        assert!(self.tracer.flush(Duration::from_secs(2)).await);
        let record = self
            .exporter
            .records()
            .pop()
            .expect("trace should be exported");
        (result, record)
    }
}
