use crate::executor::ExecutionResult;
use crate::plan::Plan;
use serde_json::Value;

/// Deterministic final-answer composition.
///
/// Degrades gracefully: partial failures produce an explanation built from
/// the aggregated error list rather than an empty answer.
pub fn compose_final_answer(_plan: &Plan, execution: &ExecutionResult) -> String {
    if !execution.errors.is_empty() {
        let issues = execution
            .errors
            .iter()
            .map(|e| format!("step {}: {}", e.step_id, e.message))
            .collect::<Vec<_>>()
            .join("; ");
        return format!("I ran into issues while executing your request: {issues}");
    }

    if execution.steps.is_empty() {
        return "I couldn't execute any steps for that request.".to_string();
    }

    // Prefer the last explicit summarize output if present.
    for step in execution.steps.iter().rev() {
        if step.tool == "summarize" {
            if let Some(summary) = step
                .output
                .as_ref()
                .and_then(|o| o.get("summary"))
                .and_then(Value::as_str)
            {
                return summary.to_string();
            }
        }
    }

    // Else, stringify the last tool output.
    let last = &execution.steps[execution.steps.len() - 1];
    let rendered = last
        .output
        .as_ref()
        .map_or_else(|| "no output".to_string(), render_value);
    format!("{} result: {rendered}", last.tool)
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
