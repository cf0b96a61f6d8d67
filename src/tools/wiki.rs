use super::http::{build_client, get_json, required_str};
use super::traits::{CachePolicy, Tool, ToolFuture, ToolPolicy};
use crate::plan::ToolKind;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://en.wikipedia.org";

/// Short topic summaries from Wikipedia's REST API.
pub struct WikipediaSummaryTool {
    client: Client,
    base_url: String,
}

impl WikipediaSummaryTool {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: build_client(),
            base_url: base_url.into(),
        }
    }
}

impl Default for WikipediaSummaryTool {
    fn default() -> Self {
        Self::new()
    }
}

impl Tool for WikipediaSummaryTool {
    fn kind(&self) -> ToolKind {
        ToolKind::WikipediaSummary
    }

    fn name(&self) -> &str {
        "wikipedia_summary"
    }

    fn description(&self) -> &str {
        "Fetch a short summary about a topic from Wikipedia's REST API."
    }

    fn policy(&self) -> ToolPolicy {
        ToolPolicy {
            timeout: Duration::from_secs(12),
            // Encyclopedia entries barely move; cache for a day.
            cache: CachePolicy::with_ttl(Duration::from_secs(60 * 60 * 24)),
            ..ToolPolicy::default()
        }
    }

    fn invoke<'a>(&'a self, input: &'a Value) -> ToolFuture<'a> {
        Box::pin(async move {
            let query = required_str(input, "query")?;
            let sentences = input
                .get("sentences")
                .and_then(Value::as_u64)
                .unwrap_or(5)
                .clamp(1, 20) as usize;

            // The REST summary endpoint expects a page title.
            let title = query.trim().replace(' ', "_");
            let url = format!("{}/api/rest_v1/page/summary/{title}", self.base_url);
            let payload = get_json(&self.client, &url, &[]).await?;

            let extract = payload
                .get("extract")
                .and_then(Value::as_str)
                .unwrap_or("");
            let trimmed = trim_sentences(extract, sentences);

            let source_url = payload
                .pointer("/content_urls/desktop/page")
                .cloned()
                .unwrap_or(Value::Null);

            Ok(json!({
                "title": payload.get("title").cloned().unwrap_or(Value::Null),
                "description": payload.get("description").cloned().unwrap_or(Value::Null),
                "summary": if trimmed.is_empty() { extract.to_string() } else { trimmed },
                "source_url": source_url,
            }))
        })
    }
}

/// Naive sentence trimming, enough to honor the `sentences` knob without a
/// language-analysis dependency.
fn trim_sentences(extract: &str, sentences: usize) -> String {
    let mut trimmed = extract
        .split(". ")
        .filter(|s| !s.is_empty())
        .take(sentences)
        .collect::<Vec<_>>()
        .join(". ")
        .trim()
        .to_string();
    if !trimmed.is_empty() && !trimmed.ends_with('.') {
        trimmed.push('.');
    }
    trimmed
}
