//! Capability interface shared by every backend variant.

use async_trait::async_trait;

use crate::agent_backend::domain::{AgentError, BackendKind};
use crate::task::adapters::traced::TracedTaskStore;

/// Result type for backend request handling.
pub type AgentResult<T> = Result<T, AgentError>;

/// Interprets a free-text request and performs it against the task store.
///
/// Implementations receive the traced store for the current request and
/// must route every store call through it, so each call is recorded as a
/// span on the request's trace.
#[async_trait]
pub trait AgentBackend: Send + Sync {
    /// Returns the variant this backend implements.
    fn kind(&self) -> BackendKind;

    /// Handles one request and returns the response text.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Backend`] when the request cannot be
    /// interpreted, or [`AgentError::Store`] when a store call fails.
    async fn handle(&self, input: &str, store: &TracedTaskStore<'_>) -> AgentResult<String>;
}
