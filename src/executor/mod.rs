pub mod graph;
pub mod resolver;
pub mod step;

pub use graph::DependencyGraph;
pub use step::{execute_step, ExecutionError, ExecutionResult, StepResult, StepStatus};

use crate::error::PlanError;
use crate::plan::{Plan, Step};
use crate::tools::ToolRegistry;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Walks a plan's dependency graph level by level, dispatching each level's
/// steps concurrently and barriering before the next level, so that a step's
/// resolved input can reference any earlier step's output.
///
/// Plan-structural problems (cycles, unknown dependencies) abort before any
/// step runs; every other failure is captured into the [`ExecutionResult`].
/// A run never raises past `run` once execution has begun.
pub struct Executor {
    registry: Arc<ToolRegistry>,
}

impl Executor {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<ToolRegistry> {
        &self.registry
    }

    /// Execute a plan to completion.
    pub async fn run(&self, plan: &Plan) -> Result<ExecutionResult, PlanError> {
        self.run_with_cancel(plan, &CancellationToken::new()).await
    }

    /// Execute a plan, stopping cooperatively when `cancel` fires. In-flight
    /// invocations are abandoned at the level barrier and every step not yet
    /// finished is recorded as `cancelled`.
    pub async fn run_with_cancel(
        &self,
        plan: &Plan,
        cancel: &CancellationToken,
    ) -> Result<ExecutionResult, PlanError> {
        let graph = DependencyGraph::build(plan)?;
        let levels = graph.level_order();

        let steps_by_id: HashMap<&str, &Step> =
            plan.steps.iter().map(|s| (s.id.as_str(), s)).collect();

        tracing::info!(
            steps = plan.steps.len(),
            levels = levels.len(),
            intent = %plan.user_intent,
            "executing plan"
        );

        let mut results: HashMap<String, StepResult> = HashMap::new();
        let mut outputs: HashMap<String, Value> = HashMap::new();
        let mut run_cancelled = false;

        for (level_index, level) in levels.iter().enumerate() {
            if cancel.is_cancelled() {
                run_cancelled = true;
                break;
            }

            // A step only runs when every dependency succeeded; skipped and
            // failed dependencies are treated uniformly as a skip trigger.
            let mut runnable: Vec<&Step> = Vec::new();
            for step_id in level {
                let step = steps_by_id[step_id.as_str()];
                match first_unmet_dependency(step, &results) {
                    Some(unmet) => {
                        tracing::info!(step = %step.id, dependency = unmet, "skipping step");
                        results.insert(step.id.clone(), StepResult::skipped(step, unmet));
                    }
                    None => runnable.push(step),
                }
            }

            if runnable.is_empty() {
                continue;
            }

            tracing::debug!(level = level_index, steps = runnable.len(), "dispatching level");
            // The batch borrows `outputs`; keep it scoped so the borrow ends
            // before this level's results are folded back in.
            let batch_results = {
                let batch = futures_util::future::join_all(
                    runnable
                        .iter()
                        .map(|step| execute_step(step, &outputs, &self.registry)),
                );
                tokio::pin!(batch);

                tokio::select! {
                    results = &mut batch => Some(results),
                    () = cancel.cancelled() => None,
                }
            };

            let Some(batch_results) = batch_results else {
                run_cancelled = true;
                break;
            };

            for result in batch_results {
                if result.status == StepStatus::Succeeded {
                    if let Some(output) = &result.output {
                        outputs.insert(result.step_id.clone(), output.clone());
                    }
                }
                results.insert(result.step_id.clone(), result);
            }
        }

        Ok(assemble(plan, results, run_cancelled))
    }
}

fn first_unmet_dependency<'a>(
    step: &'a Step,
    results: &HashMap<String, StepResult>,
) -> Option<&'a str> {
    step.depends_on
        .iter()
        .find(|dep| {
            results
                .get(dep.as_str())
                .is_none_or(|r| r.status != StepStatus::Succeeded)
        })
        .map(String::as_str)
}

/// Fold per-step results into declaration order and aggregate the errors.
fn assemble(
    plan: &Plan,
    mut results: HashMap<String, StepResult>,
    run_cancelled: bool,
) -> ExecutionResult {
    let mut steps = Vec::with_capacity(plan.steps.len());
    for step in &plan.steps {
        let result = results.remove(&step.id).unwrap_or_else(|| {
            debug_assert!(run_cancelled, "only cancellation leaves steps unfinished");
            StepResult::cancelled(step)
        });
        steps.push(result);
    }

    let errors = steps
        .iter()
        .filter_map(|result| {
            result.error.as_ref().map(|fault| ExecutionError {
                step_id: result.step_id.clone(),
                kind: fault.kind,
                message: fault.message.clone(),
            })
        })
        .collect();

    ExecutionResult { steps, errors }
}
