//! Telemetry sink contract.

use crate::observability::domain::TraceRecord;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for export attempts.
pub type TraceExportResult = Result<(), TraceExportError>;

/// Destination for completed traces.
///
/// The export worker calls this once per attempt; retries and backoff are
/// the worker's concern, not the exporter's.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TraceExporter: Send + Sync {
    /// Delivers one completed trace to the sink.
    ///
    /// # Errors
    ///
    /// Returns [`TraceExportError`] when the sink cannot accept the record.
    async fn export(&self, record: &TraceRecord) -> TraceExportResult;
}

/// Errors returned by exporter implementations.
#[derive(Debug, Clone, Error)]
pub enum TraceExportError {
    /// The record could not be encoded.
    #[error("failed to encode trace: {0}")]
    Encoding(String),

    /// The sink answered with a non-success status.
    #[error("telemetry sink rejected trace with status {status}")]
    Rejected {
        /// HTTP status code returned by the sink.
        status: u16,
    },

    /// The sink could not be reached.
    #[error("telemetry transport error: {0}")]
    Transport(Arc<dyn std::error::Error + Send + Sync>),
}

impl TraceExportError {
    /// Wraps a transport error.
    pub fn transport(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Transport(Arc::new(err))
    }
}
