//! Background export loop.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::queue::ExportQueue;
use super::settings::RetryPolicy;
use super::stats::PipelineCounters;
use crate::observability::{domain::TraceRecord, ports::TraceExporter};

/// Single consumer draining the export queue.
///
/// Traces are exported strictly in queue order, one at a time, so each
/// trace's spans and events reach the sink in the order they were closed.
pub(super) struct ExportWorker {
    queue: Arc<ExportQueue>,
    exporter: Arc<dyn TraceExporter>,
    retry: RetryPolicy,
    counters: Arc<PipelineCounters>,
    cancel: CancellationToken,
}

/// How an export with retries ended.
enum Delivery {
    Exported,
    Exhausted,
    Cancelled,
}

impl ExportWorker {
    pub(super) fn new(
        queue: Arc<ExportQueue>,
        exporter: Arc<dyn TraceExporter>,
        retry: RetryPolicy,
        counters: Arc<PipelineCounters>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            queue,
            exporter,
            retry,
            counters,
            cancel,
        }
    }

    pub(super) async fn run(self) {
        debug!("export worker started");
        'outer: loop {
            while let Some(record) = self.queue.pop() {
                let delivery = self.deliver(&record).await;
                match delivery {
                    Delivery::Exported => self.counters.record_exported(),
                    Delivery::Exhausted => {
                        self.counters.record_dropped();
                        warn!(
                            trace_id = %record.trace_id,
                            attempts = self.retry.max_retries + 1,
                            "export retries exhausted, dropped trace"
                        );
                    }
                    Delivery::Cancelled => self.counters.record_dropped(),
                }
                self.queue.complete();
                if matches!(delivery, Delivery::Cancelled) {
                    break 'outer;
                }
            }
            tokio::select! {
                () = self.cancel.cancelled() => break,
                () = self.queue.ready() => {}
            }
        }
        let abandoned = self.queue.abandon_all();
        if abandoned > 0 {
            warn!(abandoned, "export worker stopped with traces still queued");
        }
        debug!("export worker stopped");
    }

    async fn deliver(&self, record: &TraceRecord) -> Delivery {
        let mut retry = 0;
        loop {
            let attempt = tokio::select! {
                result = self.exporter.export(record) => result,
                () = self.cancel.cancelled() => return Delivery::Cancelled,
            };
            match attempt {
                Ok(()) => return Delivery::Exported,
                Err(err) => {
                    self.counters.record_export_failure();
                    warn!(
                        trace_id = %record.trace_id,
                        attempt = retry + 1,
                        error = %err,
                        "trace export attempt failed"
                    );
                }
            }
            if retry >= self.retry.max_retries {
                return Delivery::Exhausted;
            }
            let delay = self.retry.backoff(retry);
            retry += 1;
            tokio::select! {
                () = tokio::time::sleep(delay) => {}
                () = self.cancel.cancelled() => return Delivery::Cancelled,
            }
        }
    }
}
