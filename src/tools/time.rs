use super::http::{build_client, get_json, required_str};
use super::traits::{CachePolicy, Tool, ToolFuture, ToolPolicy};
use crate::plan::ToolKind;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://worldtimeapi.org";

/// Current local time for an IANA timezone, via worldtimeapi.org.
pub struct WorldTimeTool {
    client: Client,
    base_url: String,
}

impl WorldTimeTool {
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

impl Default for WorldTimeTool {
    fn default() -> Self {
        Self::new()
    }
}

impl Tool for WorldTimeTool {
    fn kind(&self) -> ToolKind {
        ToolKind::TimeIn
    }

    fn name(&self) -> &str {
        "time_in"
    }

    fn description(&self) -> &str {
        "Get the current local time for a given IANA timezone (e.g. 'Asia/Kolkata')."
    }

    fn policy(&self) -> ToolPolicy {
        ToolPolicy {
            timeout: Duration::from_secs(12),
            // Short TTL: the answer is a clock reading.
            cache: CachePolicy::with_ttl(Duration::from_secs(30)),
            ..ToolPolicy::default()
        }
    }

    fn invoke<'a>(&'a self, input: &'a Value) -> ToolFuture<'a> {
        Box::pin(async move {
            let timezone = required_str(input, "timezone")?.trim();
            let url = format!("{}/api/timezone/{timezone}", self.base_url);
            let payload = get_json(&self.client, &url, &[]).await?;

            Ok(json!({
                "timezone": payload.get("timezone").cloned().unwrap_or(Value::Null),
                "datetime": payload.get("datetime").cloned().unwrap_or(Value::Null),
                "utc_offset": payload.get("utc_offset").cloned().unwrap_or(Value::Null),
                "day_of_week": payload.get("day_of_week").cloned().unwrap_or(Value::Null),
            }))
        })
    }
}
