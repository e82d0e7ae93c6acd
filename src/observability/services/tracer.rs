//! Trace and span handles and the tracer that issues them.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::queue::ExportQueue;
use super::settings::TracerSettings;
use super::stats::{PipelineCounters, PipelineStats};
use super::worker::ExportWorker;
use crate::observability::{
    domain::{
        EventRecord, ObservabilityError, SpanId, SpanRecord, SpanStatus, TraceId, TraceRecord,
        TraceStatus, collect_attributes,
    },
    ports::TraceExporter,
};

/// Detail recorded on spans force-closed by their trace.
const SPAN_ABORTED_BY_TRACE: &str = "trace closed while span was open";
/// Detail recorded on spans whose handle was dropped while open.
const SPAN_ABORTED_BY_DROP: &str = "span handle dropped before the span was ended";
/// Detail recorded on traces whose handle was dropped while open.
const TRACE_CANCELLED: &str = "cancelled";
/// Detail used when an error trace is closed without one.
const UNSPECIFIED_ERROR: &str = "unspecified error";

/// Entry point of the tracing pipeline.
///
/// Construct one per process with [`Tracer::start`], pass clones to
/// whoever needs to open traces, and call [`Tracer::shutdown`] before
/// exiting. Cloning is cheap; all clones share one queue and one export
/// worker.
#[derive(Clone)]
pub struct Tracer {
    shared: Arc<TracerShared>,
}

struct TracerShared {
    queue: Arc<ExportQueue>,
    counters: Arc<PipelineCounters>,
    cancel: CancellationToken,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl Drop for TracerShared {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

impl Tracer {
    /// Creates a tracer and spawns its export worker on the current Tokio
    /// runtime.
    ///
    /// # Errors
    ///
    /// Returns [`ObservabilityError::RuntimeUnavailable`] when called outside
    /// a Tokio runtime.
    pub fn start(
        settings: TracerSettings,
        exporter: Arc<dyn TraceExporter>,
    ) -> Result<Self, ObservabilityError> {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|_| ObservabilityError::RuntimeUnavailable)?;
        let counters = Arc::new(PipelineCounters::default());
        let queue = Arc::new(ExportQueue::new(
            settings.queue_capacity,
            settings.backpressure,
            settings.block_timeout,
            Arc::clone(&counters),
        ));
        let cancel = CancellationToken::new();
        let worker = ExportWorker::new(
            Arc::clone(&queue),
            exporter,
            settings.retry,
            Arc::clone(&counters),
            cancel.clone(),
        );
        let handle = runtime.spawn(worker.run());
        debug!(
            capacity = settings.queue_capacity,
            policy = %settings.backpressure,
            max_retries = settings.retry.max_retries,
            "tracer started"
        );

        Ok(Self {
            shared: Arc::new(TracerShared {
                queue,
                counters,
                cancel,
                worker: Mutex::new(Some(handle)),
            }),
        })
    }

    /// Opens a trace for one top-level request.
    ///
    /// # Errors
    ///
    /// Returns [`ObservabilityError::QueueFull`] when the export queue is full
    /// and the backpressure policy refuses new traces. The default
    /// drop-oldest policy never fails.
    pub fn start_trace<I, K, V>(
        &self,
        name: impl Into<String>,
        metadata: I,
    ) -> Result<TraceHandle, ObservabilityError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.shared.queue.admit()?;
        self.shared.counters.record_started();

        let trace_id = TraceId::new();
        let now = Utc::now();
        let record = TraceRecord {
            trace_id,
            name: name.into(),
            start_time: now,
            end_time: now,
            status: TraceStatus::Ok,
            error: None,
            metadata: collect_attributes(metadata),
            events: Vec::new(),
            spans: Vec::new(),
        };
        debug!(%trace_id, name = %record.name, "trace opened");

        Ok(TraceHandle {
            cell: Some(Arc::new(TraceCell {
                trace_id,
                state: Mutex::new(TraceState {
                    record: Some(record),
                    open_spans: Vec::new(),
                }),
                queue: Arc::clone(&self.shared.queue),
            })),
        })
    }

    /// Returns a snapshot of the pipeline counters.
    #[must_use]
    pub fn stats(&self) -> PipelineStats {
        self.shared.counters.snapshot(self.shared.queue.len())
    }

    /// Waits until every closed trace has been exported or dropped.
    ///
    /// Returns `false` when `timeout` elapsed first.
    pub async fn flush(&self, timeout: Duration) -> bool {
        let drained = tokio::time::timeout(timeout, self.shared.queue.wait_drained())
            .await
            .is_ok();
        if !drained {
            warn!(
                queued = self.shared.queue.len(),
                ?timeout,
                "flush timed out with traces pending"
            );
        }
        drained
    }

    /// Flushes, then stops the export worker. Traces still queued after the
    /// flush are counted as dropped.
    ///
    /// Returns whether the flush completed before `timeout`.
    pub async fn shutdown(&self, timeout: Duration) -> bool {
        let drained = self.flush(timeout).await;
        self.shared.cancel.cancel();
        let worker = self
            .shared
            .worker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = worker {
            if let Err(err) = handle.await {
                warn!(error = %err, "export worker terminated abnormally");
            }
        }
        debug!(drained, "tracer shut down");
        drained
    }
}

/// Shared state of one trace, reachable from its trace handle and from
/// every span handle opened on it.
struct TraceCell {
    trace_id: TraceId,
    state: Mutex<TraceState>,
    queue: Arc<ExportQueue>,
}

struct TraceState {
    /// `None` once the trace has been closed and handed to the queue.
    record: Option<TraceRecord>,
    open_spans: Vec<SpanRecord>,
}

impl TraceCell {
    // A trace is only ever mutated by whole-field assignments, so a
    // poisoned lock still guards a coherent record.
    fn lock(&self) -> MutexGuard<'_, TraceState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn close(&self, status: TraceStatus, error: Option<String>) {
        let mut guard = self.lock();
        let state = &mut *guard;
        let Some(mut record) = state.record.take() else {
            drop(guard);
            warn!(trace_id = %self.trace_id, "trace already closed, ignoring end");
            return;
        };

        let now = Utc::now();
        for mut span in state.open_spans.drain(..) {
            span.end_time = now.max(span.start_time);
            span.status = SpanStatus::Aborted;
            span.error = Some(SPAN_ABORTED_BY_TRACE.to_owned());
            record.spans.push(span);
        }
        drop(guard);

        record.end_time = now.max(record.start_time);
        record.status = status;
        record.error = match (status, error) {
            (TraceStatus::Error, None) => Some(UNSPECIFIED_ERROR.to_owned()),
            (TraceStatus::Error, Some(detail)) if detail.trim().is_empty() => {
                Some(UNSPECIFIED_ERROR.to_owned())
            }
            (_, detail) => detail,
        };
        debug!(
            trace_id = %self.trace_id,
            status = %record.status,
            spans = record.spans.len(),
            "trace closed"
        );
        self.queue.push(record);
    }

    fn close_span(&self, span_id: SpanId, status: SpanStatus, error: Option<String>) -> bool {
        let mut guard = self.lock();
        let state = &mut *guard;
        let Some(record) = state.record.as_mut() else {
            return false;
        };
        let Some(position) = state.open_spans.iter().position(|s| s.span_id == span_id) else {
            return false;
        };
        let mut span = state.open_spans.remove(position);
        span.end_time = Utc::now().max(span.start_time);
        span.status = status;
        span.error = error;
        record.spans.push(span);
        true
    }

    fn with_open_span(&self, span_id: SpanId, update: impl FnOnce(&mut SpanRecord)) -> bool {
        let mut state = self.lock();
        state
            .open_spans
            .iter_mut()
            .find(|span| span.span_id == span_id)
            .map(update)
            .is_some()
    }
}

/// Handle to an open trace.
///
/// Dropping the handle without calling [`TraceHandle::end`] closes the trace
/// with status `error` and detail `cancelled`, so an abandoned request never
/// leaves a trace open.
pub struct TraceHandle {
    cell: Option<Arc<TraceCell>>,
}

impl TraceHandle {
    /// Returns a handle that records nothing.
    ///
    /// Used when the pipeline refuses a trace so the request can proceed
    /// untraced.
    #[must_use]
    pub const fn detached() -> Self {
        Self { cell: None }
    }

    /// Returns the trace identifier, or `None` for a detached handle.
    #[must_use]
    pub fn id(&self) -> Option<TraceId> {
        self.cell.as_ref().map(|cell| cell.trace_id)
    }

    /// Returns `true` once the trace has been closed (always for a detached
    /// handle).
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.cell
            .as_ref()
            .is_none_or(|cell| cell.lock().record.is_none())
    }

    /// Opens a span on this trace.
    ///
    /// # Errors
    ///
    /// Returns [`ObservabilityError::InvalidState`] when the trace is already
    /// closed.
    pub fn start_span(&self, name: impl Into<String>) -> Result<SpanHandle, ObservabilityError> {
        let Some(cell) = &self.cell else {
            return Ok(SpanHandle::detached());
        };
        let mut state = cell.lock();
        if state.record.is_none() {
            return Err(ObservabilityError::InvalidState(cell.trace_id));
        }
        let span_id = SpanId::new();
        let now = Utc::now();
        state.open_spans.push(SpanRecord {
            span_id,
            trace_id: cell.trace_id,
            name: name.into(),
            start_time: now,
            end_time: now,
            status: SpanStatus::Ok,
            error: None,
            input: None,
            output: None,
            events: Vec::new(),
        });
        drop(state);

        Ok(SpanHandle {
            cell: Some(Arc::clone(cell)),
            span_id,
        })
    }

    /// Attaches an event to the trace. Ignored (with a warning) once the
    /// trace is closed.
    pub fn record_event<I, K, V>(&self, name: &str, attributes: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let Some(cell) = &self.cell else {
            return;
        };
        let event = EventRecord::now(name, collect_attributes(attributes));
        let mut state = cell.lock();
        if let Some(record) = state.record.as_mut() {
            record.events.push(event);
        } else {
            drop(state);
            warn!(trace_id = %cell.trace_id, event = name, "event on closed trace ignored");
        }
    }

    /// Sets a metadata entry on the trace. Ignored once the trace is closed.
    pub fn set_metadata(&self, key: impl Into<String>, value: impl Into<String>) {
        let Some(cell) = &self.cell else {
            return;
        };
        let mut state = cell.lock();
        if let Some(record) = state.record.as_mut() {
            record.metadata.insert(key.into(), value.into());
        } else {
            drop(state);
            warn!(trace_id = %cell.trace_id, "metadata on closed trace ignored");
        }
    }

    /// Closes the trace, force-closing any open span as `aborted`, and hands
    /// it to the export queue.
    ///
    /// An `error` trace always carries a non-empty error detail. Calling this
    /// twice logs a warning and does nothing.
    pub fn end(&self, status: TraceStatus, error: Option<String>) {
        if let Some(cell) = &self.cell {
            cell.close(status, error);
        }
    }
}

impl Drop for TraceHandle {
    fn drop(&mut self) {
        if let Some(cell) = &self.cell {
            if cell.lock().record.is_some() {
                warn!(trace_id = %cell.trace_id, "trace dropped while open, closing as cancelled");
                cell.close(TraceStatus::Error, Some(TRACE_CANCELLED.to_owned()));
            }
        }
    }
}

/// Handle to an open span.
///
/// Dropping the handle without calling [`SpanHandle::end`] closes the span
/// as `aborted`.
pub struct SpanHandle {
    cell: Option<Arc<TraceCell>>,
    span_id: SpanId,
}

impl SpanHandle {
    /// Returns a handle that records nothing.
    #[must_use]
    pub fn detached() -> Self {
        Self {
            cell: None,
            span_id: SpanId::new(),
        }
    }

    /// Returns the span identifier.
    #[must_use]
    pub const fn id(&self) -> SpanId {
        self.span_id
    }

    /// Records a summary of the operation's arguments.
    pub fn set_input(&self, input: impl Into<String>) {
        let input = input.into();
        self.update("input", |span| span.input = Some(input));
    }

    /// Records a summary of the operation's result.
    pub fn set_output(&self, output: impl Into<String>) {
        let output = output.into();
        self.update("output", |span| span.output = Some(output));
    }

    /// Attaches an event to the span. Ignored (with a warning) once the span
    /// is closed.
    pub fn record_event<I, K, V>(&self, name: &str, attributes: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let event = EventRecord::now(name, collect_attributes(attributes));
        self.update(name, |span| span.events.push(event));
    }

    /// Closes the span. Calling this twice logs a warning and does nothing.
    pub fn end(&self, status: SpanStatus, error: Option<String>) {
        let Some(cell) = &self.cell else {
            return;
        };
        if !cell.close_span(self.span_id, status, error) {
            warn!(
                trace_id = %cell.trace_id,
                span_id = %self.span_id,
                "span already closed, ignoring end"
            );
        }
    }

    fn update(&self, what: &str, update: impl FnOnce(&mut SpanRecord)) {
        let Some(cell) = &self.cell else {
            return;
        };
        if !cell.with_open_span(self.span_id, update) {
            warn!(
                trace_id = %cell.trace_id,
                span_id = %self.span_id,
                what,
                "write to closed span ignored"
            );
        }
    }
}

impl Drop for SpanHandle {
    fn drop(&mut self) {
        if let Some(cell) = &self.cell {
            if cell.close_span(
                self.span_id,
                SpanStatus::Aborted,
                Some(SPAN_ABORTED_BY_DROP.to_owned()),
            ) {
                warn!(trace_id = %cell.trace_id, span_id = %self.span_id, "span dropped while open");
            }
        }
    }
}
