//! Tracer, bounded export queue and export worker.

mod queue;
mod redact;
mod settings;
mod stats;
mod tracer;
mod worker;

pub use redact::{Redactor, truncate};
pub use settings::{BackpressurePolicy, ParseBackpressurePolicyError, RetryPolicy, TracerSettings};
pub use stats::PipelineStats;
pub use tracer::{SpanHandle, TraceHandle, Tracer};
