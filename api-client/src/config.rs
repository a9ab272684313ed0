use std::time::Duration;

use grass_claim_core::rpc_utils::RetryPolicy;

/// Configuration for the Grass API client
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL for the API
    pub base_url: String,

    /// Request timeout
    pub timeout: Duration,

    /// User agent string
    pub user_agent: String,

    /// Enable retry on failure
    pub retry_enabled: bool,

    /// Maximum number of retries
    pub max_retries: usize,

    /// Lower bound of the wait between retries
    pub min_delay: Duration,

    /// Upper bound of the wait between retries
    pub max_delay: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self::mainnet()
    }
}

impl Config {
    /// Create a new configuration with mainnet defaults
    pub fn mainnet() -> Self {
        Self::custom(crate::MAINNET_BASE_URL)
    }

    /// Create a custom configuration
    pub fn custom(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(30),
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36"
                .to_string(),
            retry_enabled: true,
            max_retries: 50,
            min_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(3),
        }
    }

    /// Set request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set user agent
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Enable or disable retries
    pub fn with_retry(mut self, enabled: bool) -> Self {
        self.retry_enabled = enabled;
        self
    }

    /// Set maximum number of retries
    pub fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set the bounds of the wait between retries
    pub fn with_delays(mut self, min_delay: Duration, max_delay: Duration) -> Self {
        self.min_delay = min_delay;
        self.max_delay = max_delay;
        self
    }

    /// Retry policy for receipt requests, a single call when retries are disabled
    pub fn retry_policy(&self) -> RetryPolicy {
        if !self.retry_enabled {
            return RetryPolicy::none();
        }

        RetryPolicy::default()
            .with_max_retries(self.max_retries)
            .with_delays(self.min_delay, self.max_delay)
    }
}
