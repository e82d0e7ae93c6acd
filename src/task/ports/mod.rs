//! Port contracts for the task store.
//!
//! Agent backends and the orchestrator depend only on the [`TaskStore`]
//! trait, never on a concrete adapter.

pub mod store;

pub use store::{TaskStore, TaskStoreError, TaskStoreResult};
