//! Volatile task store.
//!
//! Tasks live for the lifetime of the process. The module follows
//! hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]: the in-memory store and the
//!   traced decorator handed to agent backends

pub mod adapters;
pub mod domain;
pub mod ports;

#[cfg(test)]
mod tests;
