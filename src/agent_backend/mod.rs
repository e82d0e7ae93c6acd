//! Agent backends that turn free-text requests into task store calls.
//!
//! Two interchangeable variants exist side by side: a single agent that
//! classifies and acts in one pass, and a multi-agent pipeline that splits
//! the request into planned steps. Both only ever see the traced store. The
//! module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Intent classification, execution, and rendering in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
