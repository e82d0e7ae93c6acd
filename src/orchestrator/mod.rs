//! Request façade tying the task store, agent backends, and tracing
//! pipeline together.
//!
//! [`TaskManager::process`] opens one trace per request, hands the selected
//! backend a traced view of the store, and always answers with text, even
//! when the request fails.

mod error;
mod manager;

pub use error::{ConfigurationError, OrchestratorError};
pub use manager::{TaskManager, TaskManagerSettings};

#[cfg(test)]
mod tests;
