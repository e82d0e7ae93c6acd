//! Pipeline counters shared between request threads and the export worker.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Point-in-time snapshot of pipeline counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineStats {
    /// Traces opened by the tracer.
    pub traces_started: u64,
    /// Traces delivered to the exporter.
    pub traces_exported: u64,
    /// Traces evicted, refused at enqueue, or abandoned after retries.
    pub traces_dropped: u64,
    /// Traces refused at start by the backpressure policy.
    pub traces_rejected: u64,
    /// Individual export attempts that failed.
    pub export_failures: u64,
    /// Closed traces waiting for export.
    pub queue_depth: usize,
}

#[derive(Debug, Default)]
pub(super) struct PipelineCounters {
    started: AtomicU64,
    exported: AtomicU64,
    dropped: AtomicU64,
    rejected: AtomicU64,
    export_failures: AtomicU64,
}

impl PipelineCounters {
    pub(super) fn record_started(&self) {
        self.started.fetch_add(1, Ordering::Relaxed);
    }

    pub(super) fn record_exported(&self) {
        self.exported.fetch_add(1, Ordering::Relaxed);
    }

    pub(super) fn record_dropped(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub(super) fn record_rejected(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub(super) fn record_export_failure(&self) {
        self.export_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(super) fn snapshot(&self, queue_depth: usize) -> PipelineStats {
        PipelineStats {
            traces_started: self.started.load(Ordering::Relaxed),
            traces_exported: self.exported.load(Ordering::Relaxed),
            traces_dropped: self.dropped.load(Ordering::Relaxed),
            traces_rejected: self.rejected.load(Ordering::Relaxed),
            export_failures: self.export_failures.load(Ordering::Relaxed),
            queue_depth,
        }
    }
}
