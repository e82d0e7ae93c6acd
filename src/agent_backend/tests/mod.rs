//! Unit tests for request interpretation and the backend variants.

mod support;
