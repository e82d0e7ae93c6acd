//! Task store decorator that records one span per store call.

use tracing::warn;

use crate::observability::{
    domain::SpanStatus,
    services::{Redactor, SpanHandle, TraceHandle},
};
use crate::task::{
    domain::{NewTask, Task, TaskId, TaskPatch, TaskStats},
    ports::{TaskStore, TaskStoreError, TaskStoreResult},
};

/// Instrumented view of a task store bound to one request trace.
///
/// This is the only store handle agent backends receive. Each call opens a
/// span named `task_store.<operation>`, records the arguments and result as
/// the span's input and output, adds a domain event, and closes the span
/// on every exit path. With a [`Redactor`] attached, task titles and error
/// details are scrubbed before they are written to the span.
pub struct TracedTaskStore<'a> {
    inner: &'a dyn TaskStore,
    trace: &'a TraceHandle,
    redactor: Option<&'a Redactor>,
}

impl<'a> TracedTaskStore<'a> {
    /// Wraps `inner` so its calls are recorded on `trace`.
    #[must_use]
    pub const fn new(inner: &'a dyn TaskStore, trace: &'a TraceHandle) -> Self {
        Self {
            inner,
            trace,
            redactor: None,
        }
    }

    /// Scrubs user-supplied text with `redactor` before recording it.
    #[must_use]
    pub const fn with_redactor(mut self, redactor: &'a Redactor) -> Self {
        self.redactor = Some(redactor);
        self
    }

    /// Attaches a backend-level event to the request trace.
    pub fn record_event<I, K, V>(&self, name: &str, attributes: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.trace.record_event(name, attributes);
    }

    fn scrub(&self, text: &str) -> String {
        self.redactor
            .map_or_else(|| text.to_owned(), |redactor| redactor.redact(text))
    }

    fn describe_task(&self, task: &Task) -> String {
        format!(
            "#{} {:?} [{}|{}]",
            task.id(),
            self.scrub(task.title().as_str()),
            task.status(),
            task.priority()
        )
    }

    fn traced<T>(
        &self,
        operation: &str,
        input: String,
        call: impl FnOnce() -> TaskStoreResult<T>,
        on_success: impl FnOnce(&T, &SpanHandle) -> String,
    ) -> TaskStoreResult<T> {
        let span = self
            .trace
            .start_span(format!("task_store.{operation}"))
            .unwrap_or_else(|err| {
                warn!(error = %err, operation, "store call proceeds without a span");
                SpanHandle::detached()
            });
        span.set_input(input);

        match call() {
            Ok(value) => {
                let output = on_success(&value, &span);
                span.set_output(output);
                span.end(SpanStatus::Ok, None);
                Ok(value)
            }
            Err(err) => {
                span.record_event("store_error", [("kind", error_kind(&err))]);
                span.end(SpanStatus::Error, Some(self.scrub(&err.to_string())));
                Err(err)
            }
        }
    }
}

impl TaskStore for TracedTaskStore<'_> {
    fn create(&self, request: NewTask) -> TaskStoreResult<Task> {
        let input = format!(
            "title={:?} priority={}",
            self.scrub(request.title()),
            request.priority().unwrap_or("medium")
        );
        self.traced(
            "create",
            input,
            || self.inner.create(request),
            |task, span| {
                span.record_event(
                    "task_created",
                    [
                        ("task_id", task.id().to_string()),
                        ("title", self.scrub(task.title().as_str())),
                        ("priority", task.priority().to_string()),
                    ],
                );
                self.describe_task(task)
            },
        )
    }

    fn get(&self, id: TaskId) -> TaskStoreResult<Task> {
        self.traced(
            "get",
            format!("id={id}"),
            || self.inner.get(id),
            |task, span| {
                span.record_event("task_retrieved", [("task_id", task.id().to_string())]);
                self.describe_task(task)
            },
        )
    }

    fn list(&self, status: Option<&str>) -> TaskStoreResult<Vec<Task>> {
        let input = status.map_or_else(|| "status=*".to_owned(), |s| format!("status={s}"));
        self.traced(
            "list",
            input,
            || self.inner.list(status),
            |tasks, span| {
                span.record_event(
                    "tasks_listed",
                    [
                        ("status", status.unwrap_or("*").to_owned()),
                        ("count", tasks.len().to_string()),
                    ],
                );
                format!("{} task(s)", tasks.len())
            },
        )
    }

    fn list_by_priority(&self, priority: &str) -> TaskStoreResult<Vec<Task>> {
        self.traced(
            "list_by_priority",
            format!("priority={priority}"),
            || self.inner.list_by_priority(priority),
            |tasks, span| {
                span.record_event(
                    "tasks_filtered",
                    [
                        ("priority", priority.to_owned()),
                        ("count", tasks.len().to_string()),
                    ],
                );
                format!("{} task(s)", tasks.len())
            },
        )
    }

    fn update(&self, id: TaskId, patch: TaskPatch) -> TaskStoreResult<Task> {
        let fields = patch.field_names().join(",");
        self.traced(
            "update",
            format!("id={id} fields={fields}"),
            || self.inner.update(id, patch),
            |task, span| {
                span.record_event(
                    "task_updated",
                    [
                        ("task_id", task.id().to_string()),
                        ("fields", fields.clone()),
                        ("status", task.status().to_string()),
                    ],
                );
                self.describe_task(task)
            },
        )
    }

    fn delete(&self, id: TaskId) -> TaskStoreResult<()> {
        self.traced(
            "delete",
            format!("id={id}"),
            || self.inner.delete(id),
            |_, span| {
                span.record_event("task_deleted", [("task_id", id.to_string())]);
                "deleted".to_owned()
            },
        )
    }

    fn stats(&self) -> TaskStats {
        let span = self.trace.start_span("task_store.stats").unwrap_or_else(|err| {
            warn!(error = %err, operation = "stats", "store call proceeds without a span");
            SpanHandle::detached()
        });
        let stats = self.inner.stats();
        span.record_event(
            "statistics_retrieved",
            [
                ("total", stats.total.to_string()),
                ("pending", stats.pending.to_string()),
                ("in_progress", stats.in_progress.to_string()),
                ("completed", stats.completed.to_string()),
                ("cancelled", stats.cancelled.to_string()),
            ],
        );
        span.set_output(format!("total={}", stats.total));
        span.end(SpanStatus::Ok, None);
        stats
    }
}

/// Stable label for a store error, used in events and trace metadata.
#[must_use]
pub const fn error_kind(err: &TaskStoreError) -> &'static str {
    match err {
        TaskStoreError::Validation(_) => "validation",
        TaskStoreError::NotFound(_) => "not_found",
        TaskStoreError::Poisoned(_) => "internal",
    }
}
