use super::traits::{Tool, ToolFailure, ToolFuture, ToolPolicy};
use crate::plan::ToolKind;
use serde_json::{json, Value};

const DEFAULT_MAX_CHARS: usize = 400;
const MIN_MAX_CHARS: usize = 50;
const MAX_MAX_CHARS: usize = 2000;

/// Rule-based summarizer: pretty-prints structured input, truncates on a
/// sentence-ish boundary, appends an ellipsis. No model involved, which
/// makes it the safe fallback step for clarification plans.
pub struct SummarizeTool;

impl SummarizeTool {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SummarizeTool {
    fn default() -> Self {
        Self::new()
    }
}

impl Tool for SummarizeTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Summarize
    }

    fn name(&self) -> &str {
        "summarize"
    }

    fn description(&self) -> &str {
        "Create a short summary from text or structured data using simple rules."
    }

    fn policy(&self) -> ToolPolicy {
        ToolPolicy::default()
    }

    fn invoke<'a>(&'a self, input: &'a Value) -> ToolFuture<'a> {
        Box::pin(async move {
            // `text` is usually a string, but a placeholder can hand us a
            // whole upstream output document; render it instead of refusing.
            let text = match input.get("text") {
                Some(Value::String(s)) => render_text(s),
                Some(Value::Null) | None => {
                    return Err(ToolFailure::fatal("missing required input field: text"))
                }
                Some(other) => pretty(other),
            };
            let max_chars = input
                .get("max_chars")
                .and_then(Value::as_u64)
                .map_or(DEFAULT_MAX_CHARS, |n| {
                    (n as usize).clamp(MIN_MAX_CHARS, MAX_MAX_CHARS)
                });

            Ok(json!({"summary": summarize(&text, max_chars)}))
        })
    }
}

/// JSON-looking strings get parsed and pretty-printed before truncation.
fn render_text(raw: &str) -> String {
    let trimmed = raw.trim();
    let json_like = (trimmed.starts_with('{') && trimmed.ends_with('}'))
        || (trimmed.starts_with('[') && trimmed.ends_with(']'));
    if json_like {
        if let Ok(parsed) = serde_json::from_str::<Value>(trimmed) {
            if parsed.is_object() || parsed.is_array() {
                return pretty(&parsed);
            }
        }
    }
    trimmed.to_string()
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

fn summarize(text: &str, max_chars: usize) -> String {
    let raw = text.trim();
    if raw.chars().count() <= max_chars {
        return raw.to_string();
    }

    let mut snippet: String = raw.chars().take(max_chars).collect();

    // Prefer cutting on a natural boundary if one exists late enough.
    let floor = (max_chars as f64 * 0.6) as usize;
    for separator in [". ", "\n", "; "] {
        if let Some(cut) = snippet.rfind(separator) {
            if snippet[..cut].chars().count() > floor {
                snippet.truncate(cut + separator.len());
                snippet = snippet.trim().to_string();
                break;
            }
        }
    }

    if !snippet.ends_with("...") {
        snippet = format!("{}...", snippet.trim_end());
    }
    snippet
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn short_text_passes_through_untouched() {
        let tool = SummarizeTool::new();
        let output = tool
            .invoke(&json!({"text": "All quiet."}))
            .await
            .unwrap();
        assert_eq!(output["summary"], json!("All quiet."));
    }

    #[tokio::test]
    async fn long_text_is_truncated_with_ellipsis() {
        let tool = SummarizeTool::new();
        let text = "word ".repeat(200);
        let output = tool
            .invoke(&json!({"text": text, "max_chars": 100}))
            .await
            .unwrap();
        let summary = output["summary"].as_str().unwrap();
        assert!(summary.chars().count() <= 104);
        assert!(summary.ends_with("..."));
    }

    #[tokio::test]
    async fn cuts_on_sentence_boundary_when_late_enough() {
        let tool = SummarizeTool::new();
        let text = format!("{}. {}", "a".repeat(60), "b".repeat(100));
        let output = tool
            .invoke(&json!({"text": text, "max_chars": 80}))
            .await
            .unwrap();
        let summary = output["summary"].as_str().unwrap();
        assert!(summary.starts_with(&"a".repeat(60)));
        assert!(summary.ends_with("..."));
    }

    #[tokio::test]
    async fn json_string_input_is_pretty_printed() {
        let tool = SummarizeTool::new();
        let output = tool
            .invoke(&json!({"text": "{\"temperature\": 17, \"wind\": 4}"}))
            .await
            .unwrap();
        let summary = output["summary"].as_str().unwrap();
        assert!(summary.contains("\"temperature\": 17"));
    }

    #[tokio::test]
    async fn structured_input_from_placeholder_is_rendered() {
        let tool = SummarizeTool::new();
        let output = tool
            .invoke(&json!({"text": {"current": {"temperature_2m": 17.4}}}))
            .await
            .unwrap();
        assert!(output["summary"]
            .as_str()
            .unwrap()
            .contains("temperature_2m"));
    }

    #[tokio::test]
    async fn missing_text_is_fatal() {
        let tool = SummarizeTool::new();
        assert!(tool.invoke(&json!({})).await.is_err());
    }

    #[tokio::test]
    async fn max_chars_is_clamped_to_floor() {
        let tool = SummarizeTool::new();
        let text = "y".repeat(500);
        let output = tool
            .invoke(&json!({"text": text, "max_chars": 1}))
            .await
            .unwrap();
        let summary = output["summary"].as_str().unwrap();
        assert!(summary.chars().count() >= MIN_MAX_CHARS);
    }
}
