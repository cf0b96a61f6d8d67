use crate::plan::ToolKind;
use serde_json::Value;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use thiserror::Error;

/// Whether a failed invocation is worth retrying.
///
/// The tool itself supplies this classification; the registry only decides
/// *how many* retries the budget allows, never *whether* an error class is
/// retryable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// Network-ish failure that may resolve on its own (timeouts, 5xx, 429).
    Transient,
    /// Invalid input or a tool-reported semantic error. Retrying won't help.
    Fatal,
}

/// Error reported by a single tool invocation.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ToolFailure {
    pub class: FailureClass,
    pub message: String,
}

impl ToolFailure {
    pub fn transient(message: impl Into<String>) -> Self {
        Self {
            class: FailureClass::Transient,
            message: message.into(),
        }
    }

    pub fn fatal(message: impl Into<String>) -> Self {
        Self {
            class: FailureClass::Fatal,
            message: message.into(),
        }
    }

    pub fn is_transient(&self) -> bool {
        self.class == FailureClass::Transient
    }
}

/// Retry budget for transient failures.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts, including the first one. Minimum 1.
    pub max_attempts: u32,
    pub base_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(4),
        }
    }
}

/// Result caching policy; `ttl = None` disables caching for the tool.
#[derive(Debug, Clone, Copy, Default)]
pub struct CachePolicy {
    pub ttl: Option<Duration>,
}

impl CachePolicy {
    pub fn disabled() -> Self {
        Self { ttl: None }
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self { ttl: Some(ttl) }
    }
}

/// Per-tool invocation policy, honored by the registry.
#[derive(Debug, Clone, Copy)]
pub struct ToolPolicy {
    pub timeout: Duration,
    pub retry: RetryPolicy,
    pub cache: CachePolicy,
}

impl Default for ToolPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(12),
            retry: RetryPolicy::default(),
            cache: CachePolicy::disabled(),
        }
    }
}

pub type ToolFuture<'a> = Pin<Box<dyn Future<Output = Result<Value, ToolFailure>> + Send + 'a>>;

/// A callable capability, one implementation per primitive operation.
pub trait Tool: Send + Sync {
    /// The plan step kind this tool serves.
    fn kind(&self) -> ToolKind;

    /// Stable name used in step results and logs.
    fn name(&self) -> &str;

    /// Human-readable description.
    fn description(&self) -> &str;

    /// Timeout/retry/cache policy the registry applies around `invoke`.
    fn policy(&self) -> ToolPolicy {
        ToolPolicy::default()
    }

    /// Execute against a fully resolved input (no placeholder tokens remain).
    fn invoke<'a>(&'a self, input: &'a Value) -> ToolFuture<'a>;
}
