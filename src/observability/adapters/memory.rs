//! In-memory exporter for tests and local inspection.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crate::observability::{
    domain::TraceRecord,
    ports::{TraceExportError, TraceExportResult, TraceExporter},
};

/// Exporter that keeps every delivered trace in memory.
///
/// It can be told to fail a number of leading attempts, or every attempt,
/// to exercise the worker's retry and drop paths.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTraceExporter {
    records: Arc<Mutex<Vec<TraceRecord>>>,
    attempts: Arc<AtomicUsize>,
    failures_remaining: Arc<AtomicUsize>,
}

impl InMemoryTraceExporter {
    /// Creates an exporter that accepts every trace.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an exporter that rejects the first `failures` attempts.
    #[must_use]
    pub fn failing_first(failures: usize) -> Self {
        let exporter = Self::default();
        exporter.failures_remaining.store(failures, Ordering::SeqCst);
        exporter
    }

    /// Creates an exporter that rejects every attempt.
    #[must_use]
    pub fn always_failing() -> Self {
        Self::failing_first(usize::MAX)
    }

    /// Returns the traces delivered so far, in delivery order.
    #[must_use]
    pub fn records(&self) -> Vec<TraceRecord> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns how many export attempts have been made.
    #[must_use]
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    fn take_failure(&self) -> bool {
        self.failures_remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| {
                match left {
                    0 => None,
                    usize::MAX => Some(usize::MAX),
                    n => Some(n - 1),
                }
            })
            .is_ok()
    }
}

#[async_trait]
impl TraceExporter for InMemoryTraceExporter {
    async fn export(&self, record: &TraceRecord) -> TraceExportResult {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.take_failure() {
            return Err(TraceExportError::Rejected { status: 503 });
        }
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record.clone());
        Ok(())
    }
}
