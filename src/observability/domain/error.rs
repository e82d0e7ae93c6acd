//! Pipeline-internal error type.
//!
//! These errors never cross into task management: the orchestrator logs
//! them and carries on.

use super::TraceId;
use thiserror::Error;

/// Errors raised by the tracing pipeline.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ObservabilityError {
    /// A span was requested on a trace that has already been closed.
    #[error("trace {0} is already closed")]
    InvalidState(TraceId),

    /// The export queue is full and the backpressure policy refused a new
    /// trace.
    #[error("export queue is full ({capacity} traces)")]
    QueueFull {
        /// Configured queue capacity.
        capacity: usize,
    },

    /// The export worker could not be spawned because no async runtime is
    /// running.
    #[error("no async runtime available for the export worker")]
    RuntimeUnavailable,
}
