//! Unit tests for the tracing pipeline.

mod tracer_tests;
