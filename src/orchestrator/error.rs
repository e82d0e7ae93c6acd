//! Errors raised by the request façade.

use thiserror::Error;

use crate::agent_backend::domain::{BackendError, BackendKind};

/// The request cannot be served as configured. Raised before any trace is
/// opened.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigurationError {
    /// The backend selector names no known variant.
    #[error("unknown backend '{0}', expected one of: single, multi")]
    UnknownBackend(String),

    /// The selected variant has no registered implementation.
    #[error("backend '{0}' is not registered")]
    BackendUnavailable(BackendKind),
}

/// Errors returned by [`super::TaskManager`].
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// Invalid backend selection.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// A built-in backend could not be constructed.
    #[error("failed to set up agent backends: {0}")]
    Setup(#[from] BackendError),

    /// An input redaction pattern failed to compile.
    #[error("input redaction pattern is invalid: {0}")]
    Redaction(#[from] regex::Error),
}
