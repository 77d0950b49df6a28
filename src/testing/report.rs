//! Run report
//!
//! The final pass/fail picture of a run. Printed as a summary and optionally
//! written as JSON for automation.

use std::path::Path;

use colored::Colorize;
use serde::Serialize;

use crate::api::types::EntityId;
use crate::common::{Error, Result};

use super::config::Scenario;
use super::runner::{StepResult, TestRunner};
use super::scenario::ScenarioContext;
use super::state::{StepState, StepStatus};

/// Per-step summary
#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    pub title: String,
    pub status: StepStatus,
    /// Whether a failure here stops the run
    pub gate: bool,
    pub requests: usize,
    pub duration_ms: Option<u64>,
}

/// Fixture artifacts worth keeping in the report
#[derive(Debug, Clone, Default, Serialize)]
pub struct Artifacts {
    pub categories_seen: usize,
    pub products_seen: usize,
    pub product_added: Option<EntityId>,
    pub order_id: Option<EntityId>,
}

impl From<&ScenarioContext> for Artifacts {
    fn from(ctx: &ScenarioContext) -> Self {
        Self {
            categories_seen: ctx.categories.len,
            products_seen: ctx.products.len,
            product_added: ctx.product_added.clone(),
            order_id: ctx.order.as_ref().and_then(|o| o.id.clone()),
        }
    }
}

/// Outcome of a whole run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub scenario: String,
    pub target: String,
    pub tests_run: usize,
    pub tests_passed: usize,
    pub aborted: bool,
    pub steps: Vec<StepReport>,
    pub requests: Vec<StepResult>,
    pub artifacts: Artifacts,
}

impl RunReport {
    pub fn new(
        scenario: &Scenario,
        states: &[StepState],
        runner: &TestRunner,
        ctx: &ScenarioContext,
        aborted: bool,
    ) -> Self {
        let steps = scenario
            .steps
            .iter()
            .zip(states)
            .map(|(step, state)| StepReport {
                title: state.title.clone(),
                status: state.status.clone(),
                gate: step.is_gate(),
                requests: state.requests,
                duration_ms: state.duration_ms,
            })
            .collect();

        Self {
            scenario: scenario.name.clone(),
            target: runner.client().api_root().to_string(),
            tests_run: runner.tests_run(),
            tests_passed: runner.tests_passed(),
            aborted,
            steps,
            requests: runner.results().to_vec(),
            artifacts: Artifacts::from(ctx),
        }
    }

    /// Steps that ended in `Failed` or `Aborted`
    pub fn failed_steps(&self) -> impl Iterator<Item = &StepReport> {
        self.steps.iter().filter(|s| {
            matches!(
                s.status,
                StepStatus::Failed { .. } | StepStatus::Aborted { .. }
            )
        })
    }

    /// Not aborted, every request matched, and no step failed
    pub fn passed(&self) -> bool {
        !self.aborted
            && self.tests_passed == self.tests_run
            && self.failed_steps().next().is_none()
    }

    pub fn exit_code(&self) -> i32 {
        if self.passed() {
            0
        } else {
            1
        }
    }

    pub fn summary_line(&self) -> String {
        format!("{}/{} tests passed", self.tests_passed, self.tests_run)
    }

    pub fn print_summary(&self) {
        println!("\n{} {}", "Summary:".cyan(), self.summary_line().bold());

        if let Some(step) = self
            .steps
            .iter()
            .find(|s| matches!(s.status, StepStatus::Aborted { .. }))
        {
            println!("  {} Run aborted at '{}'", "⊘".red().bold(), step.title);
        }
        for step in self
            .steps
            .iter()
            .filter(|s| matches!(s.status, StepStatus::Failed { .. }))
        {
            println!("  {} {}", "✗".red(), step.title);
        }

        if self.passed() {
            println!("\n{} {}\n", "✓".green().bold(), "Run Passed".green().bold());
        } else {
            println!("\n{} {}\n", "✗".red().bold(), "Run Failed".red().bold());
        }
    }

    /// Write the report as pretty JSON
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(|e| Error::FileWrite {
            path: path.display().to_string(),
            error: e.to_string(),
        })
    }
}
