//! Transition report
//!
//! The only aggregated state of a transition: one record per step attempted
//! on an instance, in execution order.

use crate::error::ReconcileError;
use crate::reconcile::ReconcileReport;
use envstate_core::Record;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Step of an instance transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Start,
    Dns,
    Host,
    Script,
    Stop,
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Step::Start => write!(f, "start"),
            Step::Dns => write!(f, "dns"),
            Step::Host => write!(f, "host"),
            Step::Script => write!(f, "script"),
            Step::Stop => write!(f, "stop"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Succeeded,
    Skipped,
    /// Completed with a caveat, e.g. DNS propagation timed out
    Warning,
    Failed,
}

/// Where a step ran
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub environment: String,
    pub group: String,
    pub instance: String,
}

impl Location {
    pub fn new(
        environment: impl Into<String>,
        group: impl Into<String>,
        instance: impl Into<String>,
    ) -> Self {
        Self {
            environment: environment.into(),
            group: group.into(),
            instance: instance.into(),
        }
    }
}

/// Result of a single step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepRecord {
    #[serde(flatten)]
    pub location: Location,

    pub step: Step,

    pub status: StepStatus,

    pub message: String,

    /// Remote command output, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

/// Result of a transition over one or more environments
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransitionReport {
    /// `up`, `down`, `start` or `stop`
    pub verb: String,

    /// Environments in the order they were processed
    pub environments: Vec<String>,

    pub steps: Vec<StepRecord>,

    /// Total execution time in milliseconds
    pub duration_ms: u64,
}

impl TransitionReport {
    pub fn new(verb: impl Into<String>) -> Self {
        Self {
            verb: verb.into(),
            ..Default::default()
        }
    }

    pub fn succeeded(&mut self, at: &Location, step: Step, message: impl Into<String>) {
        self.push(at, step, StepStatus::Succeeded, message.into(), None);
    }

    pub fn skipped(&mut self, at: &Location, step: Step, message: impl Into<String>) {
        self.push(at, step, StepStatus::Skipped, message.into(), None);
    }

    pub fn warning(&mut self, at: &Location, step: Step, message: impl Into<String>) {
        self.push(at, step, StepStatus::Warning, message.into(), None);
    }

    pub fn failed(&mut self, at: &Location, step: Step, message: impl Into<String>) {
        self.push(at, step, StepStatus::Failed, message.into(), None);
    }

    /// Successful remote command with its output
    pub fn command_output(&mut self, at: &Location, message: impl Into<String>, output: String) {
        let output = Some(output).filter(|o| !o.trim().is_empty());
        self.push(at, Step::Script, StepStatus::Succeeded, message.into(), output);
    }

    /// Record the outcome of a DNS reconciliation. A timeout is a warning.
    pub fn record_dns(
        &mut self,
        at: &Location,
        record: &Record,
        outcome: std::result::Result<ReconcileReport, ReconcileError>,
    ) {
        match outcome {
            Ok(outcome) if outcome.updated => {
                self.succeeded(at, Step::Dns, outcome.message(record))
            }
            Ok(outcome) => self.skipped(at, Step::Dns, outcome.message(record)),
            Err(e @ ReconcileError::Timeout { .. }) => self.warning(at, Step::Dns, e.to_string()),
            Err(e) => self.failed(at, Step::Dns, format!("{}: {}", record.zone, e)),
        }
    }

    fn push(
        &mut self,
        at: &Location,
        step: Step,
        status: StepStatus,
        message: String,
        output: Option<String>,
    ) {
        match status {
            StepStatus::Succeeded | StepStatus::Skipped => info!(
                environment = %at.environment,
                group = %at.group,
                instance = %at.instance,
                step = %step,
                "{message}"
            ),
            StepStatus::Warning | StepStatus::Failed => warn!(
                environment = %at.environment,
                group = %at.group,
                instance = %at.instance,
                step = %step,
                "{message}"
            ),
        }

        self.steps.push(StepRecord {
            location: at.clone(),
            step,
            status,
            message,
            output,
        });
    }

    pub fn failures(&self) -> impl Iterator<Item = &StepRecord> {
        self.steps
            .iter()
            .filter(|s| s.status == StepStatus::Failed)
    }

    pub fn is_success(&self) -> bool {
        self.failures().next().is_none()
    }

    /// Steps recorded for one instance, in order
    pub fn steps_for(&self, instance: &str) -> Vec<&StepRecord> {
        self.steps
            .iter()
            .filter(|s| s.location.instance == instance)
            .collect()
    }

    pub fn summary(&self) -> ReportSummary {
        let count = |status: StepStatus| self.steps.iter().filter(|s| s.status == status).count();
        ReportSummary {
            succeeded: count(StepStatus::Succeeded),
            skipped: count(StepStatus::Skipped),
            warnings: count(StepStatus::Warning),
            failed: count(StepStatus::Failed),
        }
    }
}

/// Step counts per status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportSummary {
    pub succeeded: usize,
    pub skipped: usize,
    pub warnings: usize,
    pub failed: usize,
}

impl std::fmt::Display for ReportSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} succeeded, {} skipped, {} warnings, {} failed",
            self.succeeded, self.skipped, self.warnings, self.failed
        )
    }
}
