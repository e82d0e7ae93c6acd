//! Error types for request interpretation and execution.

use thiserror::Error;

use crate::task::{adapters::traced::error_kind, ports::TaskStoreError};

/// Failures raised by the agent layer itself.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BackendError {
    /// The request matched none of the known intents.
    #[error("could not understand request: {0:?}")]
    Unrecognised(String),

    /// The intent was recognised but a required argument is absent.
    #[error("{intent} request is missing its {argument}")]
    MissingArgument {
        /// Intent being interpreted.
        intent: &'static str,
        /// Name of the absent argument.
        argument: &'static str,
    },

    /// An argument was present but could not be interpreted.
    #[error("invalid {argument} '{value}'")]
    InvalidArgument {
        /// Name of the offending argument.
        argument: &'static str,
        /// Raw value as written in the request.
        value: String,
    },

    /// A request pattern failed to compile.
    #[error("intent pattern is invalid: {0}")]
    Pattern(String),

    /// A response template failed to render.
    #[error("failed to render response: {0}")]
    Render(String),
}

impl From<regex::Error> for BackendError {
    fn from(err: regex::Error) -> Self {
        Self::Pattern(err.to_string())
    }
}

impl From<minijinja::Error> for BackendError {
    fn from(err: minijinja::Error) -> Self {
        Self::Render(err.to_string())
    }
}

/// Error returned from [`crate::agent_backend::ports::AgentBackend::handle`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AgentError {
    /// A task store call failed.
    #[error(transparent)]
    Store(#[from] TaskStoreError),

    /// The agent could not interpret or answer the request.
    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl AgentError {
    /// Stable label for the failure, used in trace metadata and events.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Store(err) => error_kind(err),
            Self::Backend(BackendError::Unrecognised(_)) => "unrecognised",
            Self::Backend(
                BackendError::MissingArgument { .. } | BackendError::InvalidArgument { .. },
            ) => "invalid_request",
            Self::Backend(BackendError::Pattern(_) | BackendError::Render(_)) => "backend",
        }
    }
}

/// Error returned while parsing a backend selector.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown backend: {0}")]
pub struct ParseBackendKindError(pub String);
