//! Process-wide tracing setup shared by the server binary and the tests.

pub mod tracing;

pub use crate::tracing::{init, init_for_tests, LogFormat};
