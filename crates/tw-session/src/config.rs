//! Configuration for the HTTP story generator.

use std::time::Duration;

/// Backend URL used when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Request timeout used when nothing else is configured.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Connection settings for [`HttpStoryGenerator`](crate::HttpStoryGenerator).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the story backend, without a trailing slash.
    pub base_url: String,
    /// Per-request timeout. Generation can be slow.
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl ClientConfig {
    /// Read `TW_API_URL` and `TW_TIMEOUT_SECS`, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_vars(
            std::env::var("TW_API_URL").ok(),
            std::env::var("TW_TIMEOUT_SECS").ok(),
        )
    }

    /// Build from optional raw values. Unparseable timeouts are ignored.
    pub fn from_vars(base_url: Option<String>, timeout_secs: Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(url) = base_url.filter(|u| !u.trim().is_empty()) {
            config = config.with_base_url(&url);
        }
        if let Some(secs) = timeout_secs.and_then(|s| s.trim().parse::<u64>().ok()) {
            config = config.with_timeout_secs(secs);
        }
        config
    }

    /// Set the base URL.
    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim().trim_end_matches('/').to_string();
        self
    }

    /// Set the request timeout (at least one second).
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs.max(1));
        self
    }
}
