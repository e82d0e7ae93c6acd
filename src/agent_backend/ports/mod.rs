//! Port contracts for agent backends.
//!
//! The orchestrator dispatches every request through [`AgentBackend`],
//! whichever variant was selected.

pub mod backend;

pub use backend::{AgentBackend, AgentResult};
