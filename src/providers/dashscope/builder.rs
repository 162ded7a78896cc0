//! `DashScope` Builder Implementation
//!
//! Provides a builder pattern for creating `DashScope` chat models.

use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;

use super::chat::DashScopeChatModel;
use super::config::{API_KEY_ENV, DashScopeConfig};
use super::options::DashScopeChatOptions;
use crate::error::LlmError;
use crate::retry_api::RetryOptions;
use crate::types::HttpConfig;

/// `DashScope` Chat Model Builder
///
/// Retry: backoff-based retry is on by default; call `.with_retry(None)` to
/// send each request once.
///
/// # Example
/// ```rust,no_run
/// use siumai_dashscope::providers::dashscope::DashScopeChatModel;
///
/// let model = DashScopeChatModel::builder()
///     .api_key("your-api-key")
///     .model("qwen-plus")
///     .temperature(0.3)
///     .build()?;
/// # Ok::<(), siumai_dashscope::LlmError>(())
/// ```
#[derive(Debug, Clone)]
pub struct DashScopeBuilder {
    api_key: Option<SecretString>,
    base_url: Option<String>,
    default_options: DashScopeChatOptions,
    http_config: HttpConfig,
    http_client: Option<reqwest::Client>,
    retry_options: Option<RetryOptions>,
}

impl Default for DashScopeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DashScopeBuilder {
    pub fn new() -> Self {
        Self {
            api_key: None,
            base_url: None,
            default_options: DashScopeChatOptions::model_defaults(),
            http_config: HttpConfig::default(),
            http_client: None,
            retry_options: Some(RetryOptions::backoff()),
        }
    }

    /// Set the API key. Falls back to `DASHSCOPE_API_KEY` when not set.
    pub fn api_key<S: Into<String>>(mut self, api_key: S) -> Self {
        self.api_key = Some(SecretString::from(api_key.into()));
        self
    }

    /// Set the base URL
    pub fn base_url<S: Into<String>>(mut self, base_url: S) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Set the model
    pub fn model<S: Into<String>>(mut self, model: S) -> Self {
        self.default_options.model = Some(model.into());
        self
    }

    /// Set the temperature
    pub const fn temperature(mut self, temperature: f32) -> Self {
        self.default_options.temperature = Some(temperature);
        self
    }

    /// Set the top-p value
    pub const fn top_p(mut self, top_p: f32) -> Self {
        self.default_options.top_p = Some(top_p);
        self
    }

    pub const fn top_k(mut self, top_k: u32) -> Self {
        self.default_options.top_k = Some(top_k);
        self
    }

    /// Set the maximum tokens
    pub const fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.default_options.max_tokens = Some(max_tokens);
        self
    }

    /// Set the seed
    pub const fn seed(mut self, seed: u64) -> Self {
        self.default_options.seed = Some(seed);
        self
    }

    /// Set stop sequences
    pub fn stop_sequences(mut self, stop: Vec<String>) -> Self {
        self.default_options.stop = Some(stop);
        self
    }

    pub const fn enable_search(mut self, enable: bool) -> Self {
        self.default_options.enable_search = Some(enable);
        self
    }

    /// Replace the default options wholesale
    pub fn default_options(mut self, options: DashScopeChatOptions) -> Self {
        self.default_options = options;
        self
    }

    // === HTTP Configuration ===

    /// Set request timeout
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.http_config.timeout = Some(timeout);
        self
    }

    /// Set connection timeout
    pub const fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.http_config.connect_timeout = Some(timeout);
        self
    }

    /// Add a header sent with every request
    pub fn header<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.http_config.headers.insert(key.into(), value.into());
        self
    }

    pub fn user_agent<S: Into<String>>(mut self, user_agent: S) -> Self {
        self.http_config.user_agent = Some(user_agent.into());
        self
    }

    /// Set custom HTTP client. Timeouts and user agent set on this builder
    /// are ignored in that case.
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Set retry options; `None` disables retries.
    pub fn with_retry(mut self, options: Option<RetryOptions>) -> Self {
        self.retry_options = options;
        self
    }

    /// Build the chat model.
    pub fn build(self) -> Result<DashScopeChatModel, LlmError> {
        let api_key = match self.api_key {
            Some(key) if !key.expose_secret().trim().is_empty() => key.expose_secret().to_string(),
            _ => std::env::var(API_KEY_ENV).map_err(|_| {
                LlmError::MissingApiKey(format!(
                    "DashScope API key not provided and {API_KEY_ENV} is not set"
                ))
            })?,
        };

        let mut config = DashScopeConfig::new(api_key)
            .with_default_options(self.default_options)
            .with_http_config(self.http_config)
            .with_retry(self.retry_options);
        if let Some(base_url) = self.base_url {
            config = config.with_base_url(base_url);
        }

        tracing::debug!(base_url = %config.base_url, model = ?config.default_options.model, "building DashScope chat model");
        match self.http_client {
            Some(client) => DashScopeChatModel::with_http_client(config, client),
            None => DashScopeChatModel::new(config),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_default_options() {
        let model = DashScopeBuilder::new()
            .api_key("sk-test")
            .model("qwen-plus")
            .temperature(0.1)
            .top_k(20)
            .stop_sequences(vec!["##".into()])
            .build()
            .unwrap();

        let options = model.default_options();
        assert_eq!(options.model.as_deref(), Some("qwen-plus"));
        assert_eq!(options.temperature, Some(0.1));
        assert_eq!(options.top_k, Some(20));
        assert_eq!(options.stop, Some(vec!["##".to_string()]));
    }

    #[test]
    fn base_url_is_applied() {
        let model = DashScopeBuilder::new()
            .api_key("sk-test")
            .base_url("http://localhost:8080/api/")
            .build()
            .unwrap();
        assert_eq!(model.api().base_url(), "http://localhost:8080/api");
    }

    #[test]
    fn invalid_base_url_fails_to_build() {
        let err = DashScopeBuilder::new()
            .api_key("sk-test")
            .base_url("not-a-url")
            .build()
            .unwrap_err();
        assert!(matches!(err, LlmError::ConfigurationError(_)));
    }
}
