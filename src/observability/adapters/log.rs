//! Exporters that never leave the process.

use async_trait::async_trait;
use tracing::info;

use crate::observability::{
    domain::TraceRecord,
    ports::{TraceExportError, TraceExportResult, TraceExporter},
};

/// Writes each trace as a JSON line through the diagnostic logger.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogTraceExporter;

#[async_trait]
impl TraceExporter for LogTraceExporter {
    async fn export(&self, record: &TraceRecord) -> TraceExportResult {
        let json = serde_json::to_string(record)
            .map_err(|err| TraceExportError::Encoding(err.to_string()))?;
        info!(
            target: "tasktrace::export",
            trace_id = %record.trace_id,
            status = %record.status,
            spans = record.spans.len(),
            "{json}"
        );
        Ok(())
    }
}

/// Discards every trace.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTraceExporter;

#[async_trait]
impl TraceExporter for NoopTraceExporter {
    async fn export(&self, _record: &TraceRecord) -> TraceExportResult {
        Ok(())
    }
}
