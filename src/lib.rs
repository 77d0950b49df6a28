//! Storefront conformance harness
//!
//! Drives an ordered sequence of authenticated requests against a running
//! storefront HTTP API and reports which responses carried the expected
//! status codes.

pub mod api;
pub mod cli;
pub mod commands;
pub mod common;
pub mod testing;

// Re-export commonly used types for tests
pub use common::{Error, Result};
pub use testing::{run_scenario, RunReport, Scenario, TestRunner};
