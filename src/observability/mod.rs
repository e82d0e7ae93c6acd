//! Request tracing and asynchronous telemetry export.
//!
//! Every top-level request opens one trace; each sub-operation opens a span
//! on it; notable points are recorded as events. Closed traces are queued
//! on a bounded buffer and exported by a background worker with retry, so
//! domain code never waits on the telemetry sink. The module follows
//! hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - The tracer, queue and export worker in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
