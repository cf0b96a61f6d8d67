use crate::error::PlanError;
use crate::executor::{Executor, StepResult};
use crate::plan::Plan;
use crate::planner::build_plan;
use crate::synthesizer::compose_final_answer;
use crate::tools::ToolRegistry;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Request document accepted by the gateway.
#[derive(Debug, Clone, Deserialize)]
pub struct QueryRequest {
    pub query: String,
}

/// Response document: the plan that ran, per-step results, and the composed
/// answer. `warnings` carries step-level failures so a partially failed run
/// still returns something useful.
#[derive(Debug, Clone, Serialize)]
pub struct QueryResponse {
    pub trace_id: String,
    pub final_answer: String,
    pub plan: Plan,
    pub steps: Vec<StepResult>,
    pub warnings: Vec<String>,
}

/// End-to-end pipeline: plan → execute → synthesize.
pub struct AgentService {
    executor: Executor,
}

impl AgentService {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self {
            executor: Executor::new(registry),
        }
    }

    pub fn executor(&self) -> &Executor {
        &self.executor
    }

    pub async fn handle_query(&self, query: &str) -> Result<QueryResponse, PlanError> {
        self.handle_query_with_cancel(query, &CancellationToken::new())
            .await
    }

    pub async fn handle_query_with_cancel(
        &self,
        query: &str,
        cancel: &CancellationToken,
    ) -> Result<QueryResponse, PlanError> {
        let trace_id = uuid::Uuid::new_v4().to_string();
        let plan = build_plan(query);
        tracing::info!(
            trace_id = %trace_id,
            intent = %plan.user_intent,
            steps = plan.steps.len(),
            "handling query"
        );

        let execution = self.executor.run_with_cancel(&plan, cancel).await?;

        let warnings = execution
            .errors
            .iter()
            .map(|e| format!("step {}: {}", e.step_id, e.message))
            .collect();
        let final_answer = compose_final_answer(&plan, &execution);

        Ok(QueryResponse {
            trace_id,
            final_answer,
            plan,
            steps: execution.steps,
            warnings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::StepStatus;
    use crate::plan::ToolKind;
    use crate::tools::{SummarizeTool, Tool, ToolFuture};
    use serde_json::{json, Value};

    struct CannedCalculator;

    impl Tool for CannedCalculator {
        fn kind(&self) -> ToolKind {
            ToolKind::Calculate
        }

        fn name(&self) -> &str {
            "calculator"
        }

        fn description(&self) -> &str {
            "test calculator"
        }

        fn invoke<'a>(&'a self, input: &'a Value) -> ToolFuture<'a> {
            Box::pin(async move {
                Ok(json!({"expression": input["expression"], "value": 14.0}))
            })
        }
    }

    fn service() -> AgentService {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(CannedCalculator));
        registry.register(Box::new(SummarizeTool::new()));
        AgentService::new(Arc::new(registry))
    }

    #[tokio::test]
    async fn calculation_query_round_trips() {
        let response = service().handle_query("calculate 2 + 3 * 4").await.unwrap();
        assert!(response.warnings.is_empty());
        assert_eq!(response.steps.len(), 1);
        assert_eq!(response.steps[0].status, StepStatus::Succeeded);
        assert!(response.final_answer.contains("14"));
        assert!(!response.trace_id.is_empty());
    }

    #[tokio::test]
    async fn clarification_query_answers_via_summarize() {
        let response = service().handle_query("mysterious gibberish").await.unwrap();
        assert!(response.warnings.is_empty());
        assert!(response.final_answer.contains("weather"));
    }

    #[tokio::test]
    async fn unregistered_tool_surfaces_as_warning_not_error() {
        // The service registry has no weather tool, so a weather query
        // degrades instead of failing the request.
        let response = service().handle_query("weather in Oslo").await.unwrap();
        assert_eq!(response.steps[0].status, StepStatus::Failed);
        assert_eq!(response.warnings.len(), 1);
        assert!(response.final_answer.contains("ran into issues"));
    }
}
