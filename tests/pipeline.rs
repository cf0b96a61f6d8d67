use std::sync::Arc;

use serde_json::{json, Value};

use stepgraph::error::FaultKind;
use stepgraph::executor::{Executor, StepStatus};
use stepgraph::plan::{Plan, Step, ToolKind};
use stepgraph::service::AgentService;
use stepgraph::tools::{
    CalculatorTool, SummarizeTool, Tool, ToolFailure, ToolFuture, ToolRegistry,
};

struct BrokenWeather;

impl Tool for BrokenWeather {
    fn kind(&self) -> ToolKind {
        ToolKind::Weather
    }

    fn name(&self) -> &str {
        "weather"
    }

    fn description(&self) -> &str {
        "always offline"
    }

    fn invoke<'a>(&'a self, _input: &'a Value) -> ToolFuture<'a> {
        Box::pin(async { Err(ToolFailure::fatal("upstream unreachable")) })
    }
}

fn offline_registry() -> Arc<ToolRegistry> {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(CalculatorTool::new()));
    registry.register(Box::new(SummarizeTool::new()));
    registry.register(Box::new(BrokenWeather));
    Arc::new(registry)
}

#[tokio::test]
async fn calculation_output_flows_into_summary() {
    let plan = Plan::new(
        "calculate then summarize",
        vec![
            Step::new("step_1", ToolKind::Calculate, json!({"expression": "(3+4)*2"})),
            Step::new(
                "step_2",
                ToolKind::Summarize,
                json!({"text": "{{step_1.output}}", "max_chars": 400}),
            )
            .depends_on(["step_1"]),
        ],
    );

    let executor = Executor::new(offline_registry());
    let execution = executor.run(&plan).await.expect("plan should be valid");

    assert!(execution.errors.is_empty());
    assert_eq!(execution.steps.len(), 2);
    assert_eq!(execution.steps[0].status, StepStatus::Succeeded);
    assert_eq!(execution.steps[1].status, StepStatus::Succeeded);

    let summary = execution.steps[1].output.as_ref().unwrap()["summary"]
        .as_str()
        .unwrap();
    assert!(summary.contains("14"), "summary was: {summary}");
}

#[tokio::test]
async fn failed_step_skips_dependents_but_not_siblings() {
    let plan = Plan::new(
        "mixed outcome",
        vec![
            Step::new("step_1", ToolKind::Weather, json!({"location": "Oslo"})),
            Step::new(
                "step_2",
                ToolKind::Summarize,
                json!({"text": "{{step_1.output}}"}),
            )
            .depends_on(["step_1"]),
            Step::new("step_3", ToolKind::Calculate, json!({"expression": "1+1"})),
        ],
    );

    let executor = Executor::new(offline_registry());
    let execution = executor.run(&plan).await.expect("plan should be valid");

    assert_eq!(execution.steps[0].status, StepStatus::Failed);
    assert_eq!(execution.steps[1].status, StepStatus::Skipped);
    assert_eq!(execution.steps[2].status, StepStatus::Succeeded);

    let kinds: Vec<FaultKind> = execution.errors.iter().map(|e| e.kind).collect();
    assert!(kinds.contains(&FaultKind::ToolFailed));
    assert!(kinds.contains(&FaultKind::SkippedDependency));
}

#[tokio::test]
async fn unresolved_placeholder_fails_only_the_referencing_step() {
    let plan = Plan::new(
        "bad reference",
        vec![
            Step::new("step_1", ToolKind::Calculate, json!({"expression": "2*3"})),
            Step::new(
                "step_2",
                ToolKind::Summarize,
                json!({"text": "{{step_1.output.no_such_field}}"}),
            )
            .depends_on(["step_1"]),
        ],
    );

    let executor = Executor::new(offline_registry());
    let execution = executor.run(&plan).await.expect("plan should be valid");

    assert_eq!(execution.steps[0].status, StepStatus::Succeeded);
    assert_eq!(execution.steps[1].status, StepStatus::Failed);
    assert_eq!(execution.errors.len(), 1);
    assert_eq!(execution.errors[0].kind, FaultKind::PlaceholderPath);
}

#[tokio::test]
async fn service_answers_offline_calculation() {
    let service = AgentService::new(offline_registry());

    let response = service
        .handle_query("calculate (3+4)*2")
        .await
        .expect("query should produce a response");

    assert!(response.warnings.is_empty());
    assert!(!response.trace_id.is_empty());
    assert!(
        response.final_answer.contains("14"),
        "answer was: {}",
        response.final_answer
    );
    assert!(response
        .steps
        .iter()
        .all(|s| s.status == StepStatus::Succeeded));
}

#[tokio::test]
async fn service_degrades_gracefully_on_tool_failure() {
    let service = AgentService::new(offline_registry());

    let response = service
        .handle_query("what's the weather in Oslo?")
        .await
        .expect("query should produce a response");

    assert!(!response.warnings.is_empty());
    assert!(
        response.final_answer.contains("issues"),
        "answer was: {}",
        response.final_answer
    );
}
