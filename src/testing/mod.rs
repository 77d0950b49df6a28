//! Storefront conformance runner
//!
//! Drives ordered scenarios of authenticated requests against a running
//! storefront and checks each response's status code. Session cookies carry
//! over between steps; abort gates stop the run when a later step could not
//! possibly mean anything.

mod body;
mod config;
mod report;
mod runner;
mod scenario;
mod state;

pub use body::DecodedBody;
pub use config::*;
pub use report::{Artifacts, RunReport, StepReport};
pub use runner::{Execution, Listing, StepResult, TestRunner, DEFAULT_QUANTITY, OK};
pub use scenario::{run_scenario, ScenarioContext};
pub use state::{StepState, StepStatus};
