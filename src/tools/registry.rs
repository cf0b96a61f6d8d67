use super::cache::ToolCache;
use super::traits::{Tool, ToolPolicy};
use crate::error::{FaultKind, StepFault};
use crate::plan::ToolKind;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Outcome of a policy-wrapped tool invocation.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub output: Value,
    pub cached: bool,
    /// Number of attempts made against the tool; zero on a cache hit.
    pub attempts: u32,
}

/// A failed policy-wrapped invocation, keeping the attempt count for audit.
#[derive(Debug, Clone)]
pub struct InvocationFailure {
    pub fault: StepFault,
    /// Number of attempts actually made before giving up.
    pub attempts: u32,
}

/// Central registry mapping step kinds to tool instances.
///
/// Owns the process-wide output cache and applies each tool's declared
/// timeout/retry/cache policy around `invoke`. One registry instance is
/// shared by all concurrent runs in the process.
#[derive(Default)]
pub struct ToolRegistry {
    tools: BTreeMap<ToolKind, Arc<dyn Tool>>,
    cache: ToolCache,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool. Replaces any existing tool for the same kind.
    pub fn register(&mut self, tool: Box<dyn Tool>) {
        let tool: Arc<dyn Tool> = Arc::from(tool);
        self.tools.insert(tool.kind(), tool);
    }

    /// Remove a tool by kind. Returns whether it was present.
    pub fn unregister(&mut self, kind: ToolKind) -> bool {
        self.tools.remove(&kind).is_some()
    }

    pub fn lookup(&self, kind: ToolKind) -> Result<&Arc<dyn Tool>, StepFault> {
        self.tools
            .get(&kind)
            .ok_or_else(|| StepFault::tool_not_found(&kind.to_string()))
    }

    /// Registered tool names, ordered by kind.
    pub fn tool_names(&self) -> Vec<&str> {
        self.tools.values().map(|tool| tool.name()).collect()
    }

    /// Invoke a tool under its declared policy: cache check, timeout per
    /// attempt, exponential backoff between transient failures.
    pub async fn invoke(
        &self,
        tool: &dyn Tool,
        resolved_input: &Value,
    ) -> Result<Invocation, InvocationFailure> {
        let policy = tool.policy();

        let cache_key = policy
            .cache
            .ttl
            .map(|_| ToolCache::key(tool.name(), resolved_input));
        if let Some(key) = &cache_key {
            if let Some(output) = self.cache.get(key) {
                tracing::debug!(tool = tool.name(), "cache hit");
                return Ok(Invocation {
                    output,
                    cached: true,
                    attempts: 0,
                });
            }
        }

        let output = self.invoke_with_retry(tool, resolved_input, &policy).await?;

        if let (Some(key), Some(ttl)) = (cache_key, policy.cache.ttl) {
            self.cache.put(key, output.output.clone(), ttl);
        }
        Ok(output)
    }

    async fn invoke_with_retry(
        &self,
        tool: &dyn Tool,
        input: &Value,
        policy: &ToolPolicy,
    ) -> Result<Invocation, InvocationFailure> {
        let max_attempts = policy.retry.max_attempts.max(1);
        let mut backoff = policy.retry.base_backoff;
        let mut last_fault: Option<StepFault> = None;

        for attempt in 1..=max_attempts {
            match tokio::time::timeout(policy.timeout, tool.invoke(input)).await {
                Ok(Ok(output)) => {
                    if attempt > 1 {
                        tracing::info!(
                            tool = tool.name(),
                            attempt,
                            "tool recovered after retries"
                        );
                    }
                    return Ok(Invocation {
                        output,
                        cached: false,
                        attempts: attempt,
                    });
                }
                Ok(Err(failure)) => {
                    if !failure.is_transient() {
                        return Err(InvocationFailure {
                            fault: StepFault::new(
                                FaultKind::ToolFailed,
                                format!("{} failed: {failure}", tool.name()),
                            ),
                            attempts: attempt,
                        });
                    }
                    last_fault = Some(StepFault::new(
                        FaultKind::ToolFailed,
                        format!(
                            "{} failed after {attempt} attempt(s): {failure}",
                            tool.name()
                        ),
                    ));
                    tracing::warn!(
                        tool = tool.name(),
                        attempt,
                        max_attempts,
                        error = %failure,
                        "transient tool failure"
                    );
                }
                Err(_) => {
                    last_fault = Some(StepFault::new(
                        FaultKind::ToolTimeout,
                        format!(
                            "{} timed out after {}ms (attempt {attempt}/{max_attempts})",
                            tool.name(),
                            policy.timeout.as_millis()
                        ),
                    ));
                    tracing::warn!(
                        tool = tool.name(),
                        attempt,
                        max_attempts,
                        timeout_ms = policy.timeout.as_millis() as u64,
                        "tool invocation timed out"
                    );
                }
            }

            if attempt < max_attempts {
                tokio::time::sleep(backoff).await;
                backoff = backoff.saturating_mul(2).min(policy.retry.max_backoff);
            }
        }

        Err(InvocationFailure {
            fault: last_fault.unwrap_or_else(|| {
                StepFault::new(FaultKind::ToolFailed, format!("{} failed", tool.name()))
            }),
            attempts: max_attempts,
        })
    }
}
