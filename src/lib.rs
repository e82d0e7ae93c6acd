//! Tasktrace: traced natural-language task management.
//!
//! Requests in free text are routed to one of several interchangeable agent
//! backends, which act on an in-memory task store. Every request produces
//! one trace whose spans mirror the store calls made while serving it, and
//! closed traces are exported off the request path with bounded buffering
//! and retries.
//!
//! # Architecture
//!
//! Each bounded context follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (memory, HTTP, logs)
//!
//! # Modules
//!
//! - [`task`]: Task entities and the in-memory store
//! - [`agent_backend`]: Single- and multi-agent request interpreters
//! - [`observability`]: Traces, spans, events, and the export pipeline
//! - [`orchestrator`]: The [`orchestrator::TaskManager`] request façade
//! - [`config`]: Layered TOML and environment configuration
//! - [`logging`]: Diagnostic subscriber setup

pub mod agent_backend;
pub mod config;
pub mod logging;
pub mod observability;
pub mod orchestrator;
pub mod task;
