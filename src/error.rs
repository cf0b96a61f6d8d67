use serde::{Deserialize, Serialize};
use thiserror::Error;

// ─── Plan-structural errors ──────────────────────────────────────────────────

/// Errors that make a plan unexecutable.
///
/// These are surfaced to the caller before any step runs; everything that goes
/// wrong *during* execution is captured as data on the affected step instead
/// (see [`StepFault`]).
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("cycle detected: {0}")]
    Cycle(String),

    #[error("step {step_id} depends on unknown step: {dependency}")]
    UnknownDependency { step_id: String, dependency: String },

    #[error("duplicate step id: {0}")]
    DuplicateStep(String),

    #[error("step id cannot be empty")]
    EmptyStepId,
}

// ─── Step-local faults ───────────────────────────────────────────────────────

/// Classifies what went wrong while executing a single step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaultKind {
    /// A placeholder referenced a step with no recorded output.
    UnresolvedPlaceholder,
    /// A placeholder dot-path pointed at a missing field.
    PlaceholderPath,
    /// The step's tool kind has no registered implementation.
    ToolNotFound,
    /// The tool did not answer within its declared timeout.
    ToolTimeout,
    /// The tool failed after exhausting its retry budget.
    ToolFailed,
    /// The run was cancelled before this step finished.
    Cancelled,
    /// A dependency did not succeed, so this step was never attempted.
    SkippedDependency,
}

impl FaultKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::UnresolvedPlaceholder => "unresolved_placeholder",
            Self::PlaceholderPath => "placeholder_path",
            Self::ToolNotFound => "tool_not_found",
            Self::ToolTimeout => "tool_timeout",
            Self::ToolFailed => "tool_failed",
            Self::Cancelled => "cancelled",
            Self::SkippedDependency => "skipped_dependency",
        }
    }
}

/// A step failure recorded as data on the step's result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{}: {message}", kind.as_str())]
pub struct StepFault {
    pub kind: FaultKind,
    pub message: String,
}

impl StepFault {
    pub fn new(kind: FaultKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn unresolved_placeholder(reference: &str) -> Self {
        Self::new(
            FaultKind::UnresolvedPlaceholder,
            format!("placeholder references step with no output: {reference}"),
        )
    }

    pub fn placeholder_path(reference: &str, segment: &str) -> Self {
        Self::new(
            FaultKind::PlaceholderPath,
            format!("path segment '{segment}' not found while resolving {reference}"),
        )
    }

    pub fn tool_not_found(kind: &str) -> Self {
        Self::new(
            FaultKind::ToolNotFound,
            format!("no tool registered for kind: {kind}"),
        )
    }
}
