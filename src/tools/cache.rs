use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Process-wide TTL cache for tool outputs.
///
/// Shared across concurrent runs; entries never persist past the process.
/// A read-then-write race on one key may invoke a tool twice; the second
/// write simply wins, which is fine for deterministic tool outputs.
#[derive(Debug, Default)]
pub struct ToolCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
}

#[derive(Debug, Clone)]
struct CacheEntry {
    value: Value,
    stored_at: Instant,
    ttl: Duration,
}

impl ToolCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Canonical cache key for a (tool, resolved input) pair.
    ///
    /// serde_json keeps object keys in a BTreeMap, so serialization is
    /// already key-sorted and stable for equal inputs.
    pub fn key(tool_name: &str, resolved_input: &Value) -> String {
        format!("{tool_name}:{resolved_input}")
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        let mut entries = self.entries.lock().expect("cache lock poisoned");
        match entries.get(key) {
            Some(entry) if entry.stored_at.elapsed() < entry.ttl => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    pub fn put(&self, key: String, value: Value, ttl: Duration) {
        let mut entries = self.entries.lock().expect("cache lock poisoned");
        entries.insert(
            key,
            CacheEntry {
                value,
                stored_at: Instant::now(),
                ttl,
            },
        );
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.lock().expect("cache lock poisoned").len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn hit_within_ttl() {
        let cache = ToolCache::new();
        cache.put("k".into(), json!({"a": 1}), Duration::from_secs(60));
        assert_eq!(cache.get("k"), Some(json!({"a": 1})));
    }

    #[test]
    fn expired_entry_is_evicted_on_read() {
        let cache = ToolCache::new();
        cache.put("k".into(), json!(1), Duration::ZERO);
        assert_eq!(cache.get("k"), None);
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn key_is_stable_for_equal_inputs() {
        // serde_json sorts object keys, so insertion order cannot leak in.
        let a: Value = serde_json::from_str(r#"{"x": 1, "b": 2}"#).unwrap();
        let b: Value = serde_json::from_str(r#"{"b": 2, "x": 1}"#).unwrap();
        assert_eq!(ToolCache::key("weather", &a), ToolCache::key("weather", &b));
    }

    #[test]
    fn key_separates_tools() {
        let input = json!({"q": "oslo"});
        assert_ne!(
            ToolCache::key("weather", &input),
            ToolCache::key("wikipedia_summary", &input)
        );
    }

    #[test]
    fn last_writer_wins() {
        let cache = ToolCache::new();
        cache.put("k".into(), json!(1), Duration::from_secs(60));
        cache.put("k".into(), json!(2), Duration::from_secs(60));
        assert_eq!(cache.get("k"), Some(json!(2)));
    }
}
