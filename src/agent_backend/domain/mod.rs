//! Domain model for agent backends.
//!
//! Covers the closed set of backend variants, the intents a request can
//! express, and the errors raised while interpreting one.

mod error;
mod intent;
mod kind;

pub use error::{AgentError, BackendError, ParseBackendKindError};
pub use intent::{Intent, ListFilter};
pub use kind::BackendKind;
