//! Step execution state
//!
//! Every scenario step moves `Pending → Running` and then ends in exactly
//! one terminal state.

use serde::Serialize;
use std::time::{Duration, Instant};

/// Step execution status
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StepStatus {
    Pending,
    Running,
    Passed,
    Failed { reason: String },
    Skipped { reason: String },
    /// Failed at an abort gate; the run stopped here
    Aborted { reason: String },
}

impl StepStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            StepStatus::Passed
                | StepStatus::Failed { .. }
                | StepStatus::Skipped { .. }
                | StepStatus::Aborted { .. }
        )
    }

    pub fn label(&self) -> &'static str {
        match self {
            StepStatus::Pending => "not run",
            StepStatus::Running => "running",
            StepStatus::Passed => "passed",
            StepStatus::Failed { .. } => "failed",
            StepStatus::Skipped { .. } => "skipped",
            StepStatus::Aborted { .. } => "aborted",
        }
    }
}

/// State for a single scenario step
#[derive(Debug, Clone)]
pub struct StepState {
    pub index: usize,
    pub title: String,
    pub status: StepStatus,
    pub started_at: Option<Instant>,
    pub duration_ms: Option<u64>,
    /// Requests issued while this step ran
    pub requests: usize,
}

impl StepState {
    pub fn new(index: usize, title: &str) -> Self {
        Self {
            index,
            title: title.to_string(),
            status: StepStatus::Pending,
            started_at: None,
            duration_ms: None,
            requests: 0,
        }
    }

    pub fn start(&mut self) {
        debug_assert_eq!(self.status, StepStatus::Pending);
        self.status = StepStatus::Running;
        self.started_at = Some(Instant::now());
    }

    pub fn pass(&mut self) {
        self.finish(StepStatus::Passed);
    }

    pub fn fail(&mut self, reason: impl Into<String>) {
        self.finish(StepStatus::Failed {
            reason: reason.into(),
        });
    }

    pub fn skip(&mut self, reason: impl Into<String>) {
        self.finish(StepStatus::Skipped {
            reason: reason.into(),
        });
    }

    pub fn abort(&mut self, reason: impl Into<String>) {
        self.finish(StepStatus::Aborted {
            reason: reason.into(),
        });
    }

    fn finish(&mut self, status: StepStatus) {
        debug_assert_eq!(self.status, StepStatus::Running);
        self.status = status;
        if let Some(started) = self.started_at {
            self.duration_ms = Some(millis(started.elapsed()));
        }
    }
}

/// Whole milliseconds, saturating at `u64::MAX`
fn millis(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}
