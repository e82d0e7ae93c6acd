//! Unit tests for the request façade.
