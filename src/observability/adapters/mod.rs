//! Exporter adapters for the tracing pipeline.

pub mod http;
pub mod log;
pub mod memory;

pub use http::{HttpTraceExporter, SinkCredentials};
pub use self::log::{LogTraceExporter, NoopTraceExporter};
pub use memory::InMemoryTraceExporter;
