//! The task manager façade.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use super::error::{ConfigurationError, OrchestratorError};
use crate::agent_backend::{
    adapters::{MultiAgentBackend, SingleAgentBackend},
    domain::BackendKind,
    ports::AgentBackend,
};
use crate::observability::{
    domain::TraceStatus,
    services::{Redactor, TraceHandle, Tracer, truncate},
};
use crate::task::{adapters::traced::TracedTaskStore, ports::TaskStore};

/// Detail recorded on traces whose request timed out.
const CANCELLED: &str = "cancelled";

/// Tunables for [`TaskManager`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskManagerSettings {
    /// Backend used when the caller does not choose one.
    pub default_backend: BackendKind,
    /// Upper bound on one backend call.
    pub request_timeout: Duration,
    /// Characters of request text kept in trace metadata.
    pub input_preview_chars: usize,
    /// Characters of response text kept in trace metadata.
    pub output_preview_chars: usize,
}

impl Default for TaskManagerSettings {
    fn default() -> Self {
        Self {
            default_backend: BackendKind::Single,
            request_timeout: Duration::from_secs(30),
            input_preview_chars: 200,
            output_preview_chars: 1000,
        }
    }
}

impl TaskManagerSettings {
    /// Sets the request timeout.
    #[must_use]
    pub const fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Sets the default backend.
    #[must_use]
    pub const fn with_default_backend(mut self, backend: BackendKind) -> Self {
        self.default_backend = backend;
        self
    }
}

/// Routes requests to agent backends and traces every one of them.
pub struct TaskManager {
    store: Arc<dyn TaskStore>,
    tracer: Tracer,
    backends: BTreeMap<BackendKind, Arc<dyn AgentBackend>>,
    redactor: Redactor,
    settings: TaskManagerSettings,
}

impl TaskManager {
    /// Creates a manager with both built-in backends registered.
    ///
    /// # Errors
    ///
    /// Returns [`OrchestratorError::Setup`] or
    /// [`OrchestratorError::Redaction`] if a built-in pattern or template
    /// fails to load.
    pub fn new(
        store: Arc<dyn TaskStore>,
        tracer: Tracer,
        settings: TaskManagerSettings,
    ) -> Result<Self, OrchestratorError> {
        let single: Arc<dyn AgentBackend> = Arc::new(SingleAgentBackend::new()?);
        let multi: Arc<dyn AgentBackend> = Arc::new(MultiAgentBackend::new()?);
        let backends = [single, multi]
            .into_iter()
            .map(|backend| (backend.kind(), backend))
            .collect();
        Ok(Self {
            store,
            tracer,
            backends,
            redactor: Redactor::new(settings.input_preview_chars)?,
            settings,
        })
    }

    /// Replaces the implementation registered for the backend's variant.
    #[must_use]
    pub fn with_backend(mut self, backend: Arc<dyn AgentBackend>) -> Self {
        self.backends.insert(backend.kind(), backend);
        self
    }

    /// Returns the untraced store, for inspection outside a request.
    #[must_use]
    pub fn store(&self) -> &dyn TaskStore {
        self.store.as_ref()
    }

    /// Returns the tracing pipeline.
    #[must_use]
    pub const fn tracer(&self) -> &Tracer {
        &self.tracer
    }

    /// Returns the manager settings.
    #[must_use]
    pub const fn settings(&self) -> &TaskManagerSettings {
        &self.settings
    }

    /// Handles one request with the backend named by `selector`.
    ///
    /// Exactly one trace is produced per call. Failures inside the request
    /// are recorded on the trace and answered with a user-facing message
    /// rather than returned as errors.
    ///
    /// # Errors
    ///
    /// Returns [`OrchestratorError::Configuration`] when `selector` names no
    /// registered backend. No trace is opened in that case.
    pub async fn process(&self, input: &str, selector: &str) -> Result<String, OrchestratorError> {
        let kind = BackendKind::try_from(selector)
            .map_err(|err| ConfigurationError::UnknownBackend(err.0))?;
        let backend = self
            .backends
            .get(&kind)
            .ok_or(ConfigurationError::BackendUnavailable(kind))?;
        Ok(self.dispatch(kind, backend.as_ref(), input).await)
    }

    async fn dispatch(&self, kind: BackendKind, backend: &dyn AgentBackend, input: &str) -> String {
        let trace = self.open_trace(kind, input);
        let store =
            TracedTaskStore::new(self.store.as_ref(), &trace).with_redactor(&self.redactor);
        let timeout = self.settings.request_timeout;

        match tokio::time::timeout(timeout, backend.handle(input, &store)).await {
            Ok(Ok(response)) => {
                trace.set_metadata(
                    "output",
                    truncate(
                        &self.redactor.mask(&response),
                        self.settings.output_preview_chars,
                    ),
                );
                trace.record_event(
                    "task_processed",
                    [("backend", kind.as_str()), ("success", "true")],
                );
                trace.end(TraceStatus::Ok, None);
                info!(backend = %kind, trace_id = ?trace.id(), "request processed");
                response
            }
            Ok(Err(err)) => {
                let detail = err.to_string();
                self.record_failure(&trace, kind, err.kind(), &detail);
                format!("Error processing request: {detail}")
            }
            Err(_elapsed) => {
                self.record_failure(&trace, kind, CANCELLED, CANCELLED);
                format!(
                    "Error processing request: cancelled after {} ms",
                    timeout.as_millis()
                )
            }
        }
    }

    fn open_trace(&self, kind: BackendKind, input: &str) -> TraceHandle {
        let name = kind.trace_name();
        let metadata = [
            ("agent", name.clone()),
            ("backend", kind.as_str().to_owned()),
            ("input", self.redactor.redact(input)),
        ];
        self.tracer
            .start_trace(name, metadata)
            .unwrap_or_else(|err| {
                warn!(backend = %kind, error = %err, "request proceeds without a trace");
                TraceHandle::detached()
            })
    }

    /// Closes `trace` as failed. The detail is redacted on the trace only;
    /// the caller's reply keeps the full text.
    fn record_failure(
        &self,
        trace: &TraceHandle,
        kind: BackendKind,
        error_kind: &str,
        detail: &str,
    ) {
        let scrubbed = self.redactor.redact(detail);
        trace.set_metadata("error_kind", error_kind);
        trace.record_event(
            "task_processing_error",
            [
                ("backend", kind.as_str()),
                ("error_kind", error_kind),
                ("error", scrubbed.as_str()),
            ],
        );
        trace.end(TraceStatus::Error, Some(scrubbed.clone()));
        warn!(
            backend = %kind,
            trace_id = ?trace.id(),
            error_kind,
            error = %scrubbed,
            "request failed"
        );
    }
}
