//! `DashScope` Configuration
//!
//! This module provides configuration structures for the `DashScope` provider.

use secrecy::{ExposeSecret, SecretString};

use super::api::DEFAULT_BASE_URL;
use super::options::DashScopeChatOptions;
use crate::error::LlmError;
use crate::retry_api::RetryOptions;
use crate::types::HttpConfig;

/// Environment variable holding the API key
pub const API_KEY_ENV: &str = "DASHSCOPE_API_KEY";

/// Environment variable overriding the base URL
pub const BASE_URL_ENV: &str = "DASHSCOPE_BASE_URL";

/// `DashScope` provider configuration.
///
/// # Example
/// ```rust
/// use siumai_dashscope::providers::dashscope::DashScopeConfig;
///
/// let config = DashScopeConfig::new("your-api-key").with_model("qwen-plus");
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct DashScopeConfig {
    /// `DashScope` API key (securely stored)
    pub api_key: SecretString,

    /// Base URL for the `DashScope` API
    pub base_url: String,

    /// HTTP configuration
    pub http_config: HttpConfig,

    /// Options applied to every request unless a prompt overrides them
    pub default_options: DashScopeChatOptions,

    /// Retry options for chat calls; `None` sends each request once
    pub retry_options: Option<RetryOptions>,
}

impl DashScopeConfig {
    /// Create a new configuration with the given API key.
    ///
    /// # Arguments
    /// * `api_key` - The `DashScope` API key
    pub fn new<S: Into<String>>(api_key: S) -> Self {
        Self {
            api_key: SecretString::from(api_key.into()),
            base_url: DEFAULT_BASE_URL.to_string(),
            http_config: HttpConfig::default(),
            default_options: DashScopeChatOptions::model_defaults(),
            retry_options: Some(RetryOptions::backoff()),
        }
    }

    /// Read `DASHSCOPE_API_KEY` and, when set, `DASHSCOPE_BASE_URL`.
    pub fn from_env() -> Result<Self, LlmError> {
        let api_key = std::env::var(API_KEY_ENV)
            .map_err(|_| LlmError::MissingApiKey(format!("{API_KEY_ENV} is not set")))?;
        let mut config = Self::new(api_key);
        if let Ok(base_url) = std::env::var(BASE_URL_ENV)
            && !base_url.trim().is_empty()
        {
            config.base_url = base_url;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn with_base_url<S: Into<String>>(mut self, url: S) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_model<S: Into<String>>(mut self, model: S) -> Self {
        self.default_options.model = Some(model.into());
        self
    }

    pub fn with_default_options(mut self, options: DashScopeChatOptions) -> Self {
        self.default_options = options;
        self
    }

    pub fn with_http_config(mut self, http_config: HttpConfig) -> Self {
        self.http_config = http_config;
        self
    }

    /// Set retry options; `None` disables retries.
    pub fn with_retry(mut self, retry_options: Option<RetryOptions>) -> Self {
        self.retry_options = retry_options;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), LlmError> {
        if self.api_key.expose_secret().trim().is_empty() {
            return Err(LlmError::MissingApiKey(
                "DashScope API key cannot be empty".to_string(),
            ));
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(LlmError::ConfigurationError(format!(
                "Base URL must start with http:// or https://: {}",
                self.base_url
            )));
        }

        Ok(())
    }
}
