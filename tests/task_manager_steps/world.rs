//! Shared world state for task manager BDD scenarios.

use std::sync::Arc;
use std::time::Duration;

use rstest::fixture;
use tasktrace::{
    observability::{
        adapters::InMemoryTraceExporter,
        domain::TraceRecord,
        services::{RetryPolicy, Tracer, TracerSettings},
    },
    orchestrator::{OrchestratorError, TaskManager, TaskManagerSettings},
    task::adapters::memory::InMemoryTaskStore,
};

/// Scenario world for task manager behaviour tests.
#[derive(Default)]
pub struct TaskManagerWorld {
    pub manager: Option<TaskManager>,
    pub exporter: Option<InMemoryTraceExporter>,
    pub last_result: Option<Result<String, OrchestratorError>>,
}

impl TaskManagerWorld {
    /// Wires a manager to `exporter` on the current runtime.
    pub fn install(&mut self, exporter: InMemoryTraceExporter) -> Result<(), eyre::Report> {
        let settings = TracerSettings::default().with_retry(RetryPolicy {
            max_retries: 1,
            initial_backoff: Duration::from_millis(1),
            max_backoff: Duration::from_millis(1),
        });
        let tracer = Tracer::start(settings, Arc::new(exporter.clone()))?;
        let manager = TaskManager::new(
            Arc::new(InMemoryTaskStore::new()),
            tracer,
            TaskManagerSettings::default(),
        )?;
        self.manager = Some(manager);
        self.exporter = Some(exporter);
        Ok(())
    }

    /// Returns the installed manager.
    pub fn manager(&self) -> Result<&TaskManager, eyre::Report> {
        self.manager
            .as_ref()
            .ok_or_else(|| eyre::eyre!("task manager not installed"))
    }

    /// Flushes the pipeline and returns every exported trace.
    pub fn exported(&self) -> Result<Vec<TraceRecord>, eyre::Report> {
        let manager = self.manager()?;
        if !run_async(manager.tracer().flush(Duration::from_secs(2))) {
            return Err(eyre::eyre!("export queue did not drain"));
        }
        let exporter = self
            .exporter
            .as_ref()
            .ok_or_else(|| eyre::eyre!("exporter not installed"))?;
        Ok(exporter.records())
    }

    /// Returns the response text of the last request.
    pub fn response(&self) -> Result<&str, eyre::Report> {
        match &self.last_result {
            Some(Ok(text)) => Ok(text),
            Some(Err(err)) => Err(eyre::eyre!("request was rejected: {err}")),
            None => Err(eyre::eyre!("no request was sent")),
        }
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> TaskManagerWorld {
    TaskManagerWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
