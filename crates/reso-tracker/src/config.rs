//! Tracker configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Batching and transport settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// Client log endpoint batches are posted to
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Quiet period after the last event before the queue is sent (milliseconds)
    #[serde(default = "default_flush_idle_ms")]
    pub flush_idle_ms: u64,

    /// Queue length that triggers a send without waiting for the idle timer
    #[serde(default = "default_max_batch")]
    pub max_batch: usize,

    /// Size of the channel between callers and the worker
    #[serde(default = "default_channel_buffer_size")]
    pub channel_buffer_size: usize,

    /// HTTP request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_endpoint() -> String {
    "http://127.0.0.1:3000/api/client-log".to_string()
}

fn default_flush_idle_ms() -> u64 {
    5_000
}

fn default_max_batch() -> usize {
    50
}

fn default_channel_buffer_size() -> usize {
    1_000
}

fn default_timeout_secs() -> u64 {
    10
}

impl TrackerConfig {
    pub fn flush_idle(&self) -> Duration {
        Duration::from_millis(self.flush_idle_ms)
    }
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            flush_idle_ms: default_flush_idle_ms(),
            max_batch: default_max_batch(),
            channel_buffer_size: default_channel_buffer_size(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Identity and location stamped on every event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerContext {
    /// Persistent visitor id
    pub user_id: String,
    /// Page the events happen on
    pub url: Option<String>,
    /// Browser user agent
    pub user_agent: Option<String>,
}

impl TrackerContext {
    /// Context for a new visitor with a freshly generated id
    pub fn new() -> Self {
        Self::with_user_id(uuid::Uuid::new_v4().to_string())
    }

    /// Context for a returning visitor
    pub fn with_user_id(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            url: None,
            user_agent: None,
        }
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }
}

impl Default for TrackerContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = TrackerConfig::default();
        assert_eq!(config.flush_idle(), Duration::from_secs(5));
        assert!(config.endpoint.ends_with("/api/client-log"));
        assert!(config.max_batch > 0);
    }

    #[test]
    fn test_partial_config_deserializes() {
        let config: TrackerConfig =
            serde_json::from_str(r#"{"endpoint": "http://shop.test/api/client-log"}"#).unwrap();
        assert_eq!(config.endpoint, "http://shop.test/api/client-log");
        assert_eq!(config.flush_idle_ms, 5_000);
    }

    #[test]
    fn test_new_visitors_get_distinct_ids() {
        let a = TrackerContext::new();
        let b = TrackerContext::new();
        assert_ne!(a.user_id, b.user_id);
        assert_eq!(a.user_id.len(), 36);
    }

    #[test]
    fn test_context_builder() {
        let ctx = TrackerContext::with_user_id("u1")
            .url("http://shop.test/")
            .user_agent("Mozilla/5.0");
        assert_eq!(ctx.user_id, "u1");
        assert_eq!(ctx.url.as_deref(), Some("http://shop.test/"));
        assert_eq!(ctx.user_agent.as_deref(), Some("Mozilla/5.0"));
    }
}
