//! Port contracts for the tracing pipeline.

pub mod exporter;

pub use exporter::{TraceExportError, TraceExportResult, TraceExporter};

#[cfg(test)]
pub use exporter::MockTraceExporter;
