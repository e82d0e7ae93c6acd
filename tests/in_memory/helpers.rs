//! Shared fixtures for in-memory integration tests.

use std::sync::Arc;
use std::time::Duration;

use rstest::fixture;
use tasktrace::{
    observability::{
        adapters::InMemoryTraceExporter,
        domain::TraceRecord,
        services::{RetryPolicy, Tracer, TracerSettings},
    },
    orchestrator::{TaskManager, TaskManagerSettings},
    task::adapters::memory::InMemoryTaskStore,
};

/// How long tests wait for the export queue to drain.
pub const FLUSH_TIMEOUT: Duration = Duration::from_secs(2);

/// A task manager wired to an exporter the test can inspect.
pub struct TracedApp {
    /// The façade under test.
    pub manager: TaskManager,
    /// Receives every exported trace.
    pub exporter: InMemoryTraceExporter,
}

impl TracedApp {
    /// Builds an app around the given exporter with fast retries.
    ///
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime.
    #[must_use]
    pub fn with_exporter(exporter: InMemoryTraceExporter) -> Self {
        let settings = TracerSettings::default().with_retry(RetryPolicy {
            max_retries: 2,
            initial_backoff: Duration::from_millis(1),
            max_backoff: Duration::from_millis(5),
        });
        let tracer =
            Tracer::start(settings, Arc::new(exporter.clone())).expect("tracer should start");
        let manager = TaskManager::new(
            Arc::new(InMemoryTaskStore::new()),
            tracer,
            TaskManagerSettings::default(),
        )
        .expect("task manager should build");
        Self { manager, exporter }
    }

    /// Sends one request and returns the response text.
    ///
    /// # Panics
    ///
    /// Panics when the backend selector is rejected.
    pub async fn ask(&self, input: &str, backend: &str) -> String {
        self.manager
            .process(input, backend)
            .await
            .expect("backend selector should be valid")
    }

    /// Waits for the queue to drain and returns every exported trace.
    ///
    /// # Panics
    ///
    /// Panics when the queue does not drain in time.
    pub async fn traces(&self) -> Vec<TraceRecord> {
        assert!(self.manager.tracer().flush(FLUSH_TIMEOUT).await);
        self.exporter.records()
    }
}

/// Provides an app whose exporter accepts everything.
///
/// # Panics
///
/// Panics when called outside a Tokio runtime.
#[fixture]
pub fn app() -> TracedApp {
    TracedApp::with_exporter(InMemoryTraceExporter::new())
}

/// Provides a fresh store with the system clock.
#[fixture]
pub fn store() -> InMemoryTaskStore {
    InMemoryTaskStore::new()
}
