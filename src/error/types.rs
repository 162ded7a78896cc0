//! Core error types

use thiserror::Error;

/// Coarse error category, used for retry decisions and presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Authentication,
    RateLimit,
    Client,
    Server,
    Network,
    Parsing,
    Validation,
    Unsupported,
    Unknown,
}

/// Errors produced by the DashScope client.
#[derive(Debug, Clone, Error)]
pub enum LlmError {
    /// Transport-level failure while sending or reading a request
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// Non-success response that did not map to a more specific variant
    #[error("API error {code}: {message}")]
    ApiError {
        code: u16,
        message: String,
        details: Option<serde_json::Value>,
    },

    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimitError(String),

    #[error("Quota exceeded: {0}")]
    QuotaExceededError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Missing API key: {0}")]
    MissingApiKey(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("JSON error: {0}")]
    JsonError(String),

    /// Failure inside an SSE stream (decoding or chunk reassembly)
    #[error("Stream error: {0}")]
    StreamError(String),

    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    #[error("Timeout: {0}")]
    TimeoutError(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl LlmError {
    /// Build an `ApiError` without details.
    pub fn api_error(code: u16, message: impl Into<String>) -> Self {
        Self::ApiError {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Build an `ApiError` carrying the provider's error body.
    pub fn api_error_with_details(
        code: u16,
        message: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        Self::ApiError {
            code,
            message: message.into(),
            details: Some(details),
        }
    }

    /// HTTP status code, when the error originated from a response.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::ApiError { code, .. } => Some(*code),
            Self::AuthenticationError(_) => Some(401),
            Self::RateLimitError(_) => Some(429),
            _ => None,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::AuthenticationError(_) | Self::MissingApiKey(_) => ErrorCategory::Authentication,
            Self::RateLimitError(_) | Self::QuotaExceededError(_) => ErrorCategory::RateLimit,
            Self::ApiError { code, .. } if (500..=599).contains(code) => ErrorCategory::Server,
            Self::ApiError { code, .. } if (400..=499).contains(code) => ErrorCategory::Client,
            Self::InvalidInput(_) => ErrorCategory::Client,
            Self::HttpError(_) | Self::TimeoutError(_) | Self::ConnectionError(_) => {
                ErrorCategory::Network
            }
            Self::ParseError(_) | Self::JsonError(_) | Self::StreamError(_) => {
                ErrorCategory::Parsing
            }
            Self::InvalidParameter(_) | Self::ConfigurationError(_) => ErrorCategory::Validation,
            Self::UnsupportedOperation(_) => ErrorCategory::Unsupported,
            _ => ErrorCategory::Unknown,
        }
    }

    /// Whether repeating the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::RateLimitError(_) | Self::TimeoutError(_) | Self::ConnectionError(_) => true,
            Self::ApiError { code, .. } => *code == 429 || (500..=599).contains(code),
            _ => false,
        }
    }
}
