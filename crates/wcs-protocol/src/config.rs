//! Client configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// HTTP behaviour of the WCS client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Whole-request timeout in seconds.
    pub timeout_secs: u64,

    /// Connection timeout in seconds.
    pub connect_timeout_secs: u64,

    /// User-Agent header sent with every request.
    pub user_agent: String,

    /// Retry a failed GetCoverage GET as a POST of the same query.
    ///
    /// When disabled, the request goes out only with the method the caller
    /// selected, which the GetCoverage operation must declare.
    pub post_fallback: bool,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 120,
            connect_timeout_secs: 30,
            user_agent: concat!("wcs-protocol/", env!("CARGO_PKG_VERSION")).to_string(),
            post_fallback: true,
        }
    }
}

impl HttpConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("WCS_HTTP_TIMEOUT_SECS") {
            if let Ok(secs) = val.parse() {
                config.timeout_secs = secs;
            }
        }

        if let Ok(val) = std::env::var("WCS_HTTP_CONNECT_TIMEOUT_SECS") {
            if let Ok(secs) = val.parse() {
                config.connect_timeout_secs = secs;
            }
        }

        if let Ok(val) = std::env::var("WCS_USER_AGENT") {
            if !val.is_empty() {
                config.user_agent = val;
            }
        }

        if let Ok(val) = std::env::var("WCS_POST_FALLBACK") {
            config.post_fallback = val.to_lowercase() == "true" || val == "1";
        }

        config
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.timeout_secs == 0 {
            return Err("timeout_secs must be greater than zero".to_string());
        }
        if self.connect_timeout_secs == 0 {
            return Err("connect_timeout_secs must be greater than zero".to_string());
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn with_post_fallback(mut self, enabled: bool) -> Self {
        self.post_fallback = enabled;
        self
    }
}
