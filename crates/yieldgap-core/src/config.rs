//! Runtime configuration read from the environment.

use tracing::warn;

use crate::http_client::DEFAULT_TIMEOUT_MS;
use crate::provider::MAX_PAGE_SIZE;
use crate::retry::RetryConfig;
use crate::ValidationError;

pub const DEFAULT_BASE_URL: &str = "https://min-api.cryptocompare.com";

pub const ENV_BASE_URL: &str = "YIELDGAP_API_BASE_URL";
pub const ENV_API_KEY: &str = "YIELDGAP_API_KEY";
pub const ENV_TIMEOUT_MS: &str = "YIELDGAP_TIMEOUT_MS";
pub const ENV_MAX_RETRIES: &str = "YIELDGAP_MAX_RETRIES";
pub const ENV_PAGE_SIZE: &str = "YIELDGAP_PAGE_SIZE";

/// Settings for the remote price provider.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub base_url: String,
    /// Optional API key; sent as a header and never logged.
    pub api_key: Option<String>,
    pub page_size: usize,
    pub timeout_ms: u64,
    pub retry: RetryConfig,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: String::from(DEFAULT_BASE_URL),
            api_key: None,
            page_size: MAX_PAGE_SIZE,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            retry: RetryConfig::default(),
        }
    }
}

impl ProviderConfig {
    /// Defaults overridden by `YIELDGAP_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(base_url) = lookup(ENV_BASE_URL).filter(|value| !value.trim().is_empty()) {
            config.base_url = base_url.trim().trim_end_matches('/').to_owned();
        }
        config.api_key = lookup(ENV_API_KEY).filter(|value| !value.trim().is_empty());

        if let Some(raw) = lookup(ENV_TIMEOUT_MS) {
            match raw.trim().parse::<u64>() {
                Ok(timeout_ms) if timeout_ms > 0 => config.timeout_ms = timeout_ms,
                _ => warn!(variable = ENV_TIMEOUT_MS, value = %raw, "ignoring invalid timeout"),
            }
        }

        if let Some(raw) = lookup(ENV_MAX_RETRIES) {
            match raw.trim().parse::<u32>() {
                Ok(0) => config.retry = RetryConfig::no_retry(),
                Ok(max_retries) => config.retry = RetryConfig::exponential(max_retries),
                Err(_) => warn!(variable = ENV_MAX_RETRIES, value = %raw, "ignoring invalid retry count"),
            }
        }

        if let Some(raw) = lookup(ENV_PAGE_SIZE) {
            let parsed = raw.trim().parse::<usize>().ok();
            match parsed.map(|page_size| config.clone().with_page_size(page_size)) {
                Some(Ok(updated)) => config = updated,
                Some(Err(error)) => warn!(variable = ENV_PAGE_SIZE, %error, "ignoring page size"),
                None => warn!(variable = ENV_PAGE_SIZE, value = %raw, "ignoring invalid page size"),
            }
        }

        config
    }

    pub fn with_page_size(mut self, page_size: usize) -> Result<Self, ValidationError> {
        if page_size == 0 || page_size > MAX_PAGE_SIZE {
            return Err(ValidationError::InvalidPageSize {
                value: page_size,
                max: MAX_PAGE_SIZE,
            });
        }
        self.page_size = page_size;
        Ok(self)
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }
}
