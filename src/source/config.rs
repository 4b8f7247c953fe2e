use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the headless browser page source
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct BrowserConfig {
    /// Whether to run the browser in headless mode (default: true)
    pub headless: bool,

    /// Browser request timeout in seconds (default: 30)
    pub timeout_secs: u64,

    /// How long to wait for the first post to appear, in seconds (default: 30)
    pub ready_timeout_secs: u64,

    /// Wait time after the first post appears, for late content, in milliseconds (default: 1000)
    pub wait_after_load_ms: u64,

    /// Window size; a tall window loads more of the timeline at once
    pub window_width: u32,
    pub window_height: u32,

    /// User agent string to use
    pub user_agent: Option<String>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            timeout_secs: 30,
            ready_timeout_secs: 30,
            wait_after_load_ms: 1000,
            window_width: 1920,
            window_height: 3384,
            user_agent: Some(
                "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 \
                 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
                    .to_string(),
            ),
        }
    }
}

impl BrowserConfig {
    /// Get the request timeout as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn ready_timeout(&self) -> Duration {
        Duration::from_secs(self.ready_timeout_secs)
    }

    /// Get the wait time after load as a Duration
    pub fn wait_after_load(&self) -> Duration {
        Duration::from_millis(self.wait_after_load_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_values() {
        let config = BrowserConfig::default();
        assert!(config.headless);
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.ready_timeout_secs, 30);
        assert_eq!(config.wait_after_load_ms, 1000);
        assert!(config.user_agent.is_some());
    }

    #[test]
    fn test_durations() {
        let config = BrowserConfig {
            timeout_secs: 15,
            ready_timeout_secs: 5,
            wait_after_load_ms: 250,
            ..Default::default()
        };
        assert_eq!(config.timeout(), Duration::from_secs(15));
        assert_eq!(config.ready_timeout(), Duration::from_secs(5));
        assert_eq!(config.wait_after_load(), Duration::from_millis(250));
    }

    #[test]
    fn test_partial_toml() {
        let config: BrowserConfig = toml::from_str("headless = false").unwrap();
        assert!(!config.headless);
        assert_eq!(config.timeout_secs, 30);
    }
}
