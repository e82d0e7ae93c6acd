//! Unit tests for the task store.

mod store_tests;
