use std::net::SocketAddr;
use std::time::Duration;

/// Runtime configuration, resolved from `STEPGRAPH_*` environment variables
/// with sensible defaults. Nothing here is persisted.
#[derive(Debug, Clone)]
pub struct Config {
    /// Gateway bind address (`STEPGRAPH_BIND`).
    pub bind_addr: SocketAddr,
    /// Log filter directive (`STEPGRAPH_LOG`), e.g. `info` or `stepgraph=debug`.
    pub log_filter: String,
    /// Whole-request timeout at the gateway (`STEPGRAPH_REQUEST_TIMEOUT_S`).
    pub request_timeout: Duration,
    /// Maximum accepted request body size in bytes (`STEPGRAPH_BODY_LIMIT`).
    pub body_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            log_filter: "info".to_string(),
            request_timeout: Duration::from_secs(30),
            body_limit: 64 * 1024,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            bind_addr: env_parsed("STEPGRAPH_BIND").unwrap_or(defaults.bind_addr),
            log_filter: env_trimmed("STEPGRAPH_LOG").unwrap_or(defaults.log_filter),
            request_timeout: env_parsed::<u64>("STEPGRAPH_REQUEST_TIMEOUT_S")
                .map_or(defaults.request_timeout, Duration::from_secs),
            body_limit: env_parsed("STEPGRAPH_BODY_LIMIT").unwrap_or(defaults.body_limit),
        }
    }
}

fn env_trimmed(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn env_parsed<T: std::str::FromStr>(name: &str) -> Option<T> {
    env_trimmed(name).and_then(|value| value.parse().ok())
}
