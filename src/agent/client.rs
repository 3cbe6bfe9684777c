//! Capability client configuration

use crate::agent::retry::RetryPolicy;
use crate::core::config::{LlmConfig, SearchConfig};
use std::time::Duration;

/// Configuration shared by the HTTP capability clients
#[derive(Clone)]
pub struct CapabilityClientConfig {
    /// API endpoint URL
    pub endpoint: String,

    /// Bearer token sent with every request
    pub api_key: String,

    /// Per-attempt timeout in seconds
    pub timeout_secs: u64,

    /// Extra attempts after the first one fails
    pub max_retries: usize,

    /// Delay before a retry, multiplied by the attempt number
    pub retry_backoff_ms: u64,
}

impl std::fmt::Debug for CapabilityClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CapabilityClientConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"<redacted>")
            .field("timeout_secs", &self.timeout_secs)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_ms", &self.retry_backoff_ms)
            .finish()
    }
}

impl CapabilityClientConfig {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            timeout_secs: 60,
            max_retries: 1,
            retry_backoff_ms: 500,
        }
    }

    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    pub fn with_retries(mut self, max_retries: usize, backoff_ms: u64) -> Self {
        self.max_retries = max_retries;
        self.retry_backoff_ms = backoff_ms;
        self
    }

    /// Client settings for the search capability
    pub fn for_search(config: &SearchConfig, api_key: impl Into<String>) -> Self {
        Self::new(config.endpoint.clone(), api_key)
            .with_timeout(config.timeout_secs)
            .with_retries(config.max_retries, config.retry_backoff_ms)
    }

    /// Client settings for the language model
    pub fn for_llm(config: &LlmConfig, api_key: impl Into<String>) -> Self {
        Self::new(config.endpoint.clone(), api_key)
            .with_timeout(config.timeout_secs)
            .with_retries(config.max_retries, config.retry_backoff_ms)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            timeout: Duration::from_secs(self.timeout_secs),
            max_retries: self.max_retries,
            backoff: Duration::from_millis(self.retry_backoff_ms),
        }
    }
}
