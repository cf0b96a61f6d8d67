use super::resolver::resolve_input;
use crate::error::{FaultKind, StepFault};
use crate::plan::Step;
use crate::tools::ToolRegistry;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::time::Instant;

/// Terminal state of one step within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Succeeded,
    Failed,
    /// A dependency did not succeed; the step was never attempted.
    Skipped,
    /// The run was cancelled before the step finished.
    Cancelled,
}

/// The write-once record of one executed (or skipped) step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepResult {
    pub step_id: String,
    pub tool: String,
    /// Post-resolution input, kept for audit. Raw input when resolution
    /// itself failed or the step never ran.
    pub input: Value,
    pub status: StepStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<StepFault>,
    pub cached: bool,
    pub attempts: u32,
    pub duration_ms: u64,
}

impl StepResult {
    pub(crate) fn not_run(step: &Step, status: StepStatus, fault: StepFault) -> Self {
        Self {
            step_id: step.id.clone(),
            tool: step.kind.to_string(),
            input: step.input.clone(),
            status,
            output: None,
            error: Some(fault),
            cached: false,
            attempts: 0,
            duration_ms: 0,
        }
    }

    pub(crate) fn skipped(step: &Step, unmet_dependency: &str) -> Self {
        Self::not_run(
            step,
            StepStatus::Skipped,
            StepFault::new(
                FaultKind::SkippedDependency,
                format!("dependency '{unmet_dependency}' did not succeed"),
            ),
        )
    }

    pub(crate) fn cancelled(step: &Step) -> Self {
        Self::not_run(
            step,
            StepStatus::Cancelled,
            StepFault::new(FaultKind::Cancelled, "run cancelled before step finished"),
        )
    }
}

/// One aggregated error entry, mirroring a failed/skipped/cancelled step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionError {
    pub step_id: String,
    pub kind: FaultKind,
    pub message: String,
}

/// The executor's structured output: per-step results in declaration order
/// plus the aggregated error list (empty when every step succeeded).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub steps: Vec<StepResult>,
    pub errors: Vec<ExecutionError>,
}

impl ExecutionResult {
    pub fn is_fully_successful(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Run one step to completion: resolve placeholders, look up the tool,
/// invoke it under policy. Every failure is captured into the returned
/// [`StepResult`]; this function never raises past its own boundary.
pub async fn execute_step(
    step: &Step,
    outputs: &HashMap<String, Value>,
    registry: &ToolRegistry,
) -> StepResult {
    let started = Instant::now();

    let resolved = match resolve_input(&step.input, outputs) {
        Ok(resolved) => resolved,
        Err(fault) => {
            tracing::warn!(step = %step.id, error = %fault, "input resolution failed");
            return StepResult::not_run(step, StepStatus::Failed, fault);
        }
    };

    let tool = match registry.lookup(step.kind) {
        Ok(tool) => tool.clone(),
        Err(fault) => {
            tracing::warn!(step = %step.id, error = %fault, "tool lookup failed");
            let mut result = StepResult::not_run(step, StepStatus::Failed, fault);
            result.input = resolved;
            return result;
        }
    };

    tracing::debug!(step = %step.id, tool = tool.name(), "executing step");
    match registry.invoke(tool.as_ref(), &resolved).await {
        Ok(invocation) => {
            tracing::info!(
                step = %step.id,
                tool = tool.name(),
                cached = invocation.cached,
                attempts = invocation.attempts,
                "step succeeded"
            );
            StepResult {
                step_id: step.id.clone(),
                tool: tool.name().to_string(),
                input: resolved,
                status: StepStatus::Succeeded,
                output: Some(invocation.output),
                error: None,
                cached: invocation.cached,
                attempts: invocation.attempts,
                duration_ms: duration_ms(started),
            }
        }
        Err(failure) => {
            tracing::warn!(
                step = %step.id,
                tool = tool.name(),
                attempts = failure.attempts,
                error = %failure.fault,
                "step failed"
            );
            StepResult {
                step_id: step.id.clone(),
                tool: tool.name().to_string(),
                input: resolved,
                status: StepStatus::Failed,
                output: None,
                error: Some(failure.fault),
                cached: false,
                attempts: failure.attempts,
                duration_ms: duration_ms(started),
            }
        }
    }
}

fn duration_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}
