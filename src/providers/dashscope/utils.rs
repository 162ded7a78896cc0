//! DashScope request helpers

use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use std::collections::HashMap;

use crate::error::LlmError;

/// Header (`X-DashScope-SSE`) that switches the generation endpoint to SSE output
pub const SSE_HEADER: &str = "x-dashscope-sse";

/// Build request headers: bearer auth, JSON content type, then custom headers.
pub fn build_headers(
    api_key: &str,
    custom_headers: &HashMap<String, String>,
) -> Result<HeaderMap, LlmError> {
    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {api_key}"))
            .map_err(|e| LlmError::ConfigurationError(format!("Invalid API key format: {e}")))?,
    );
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    for (name, value) in custom_headers {
        let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
            LlmError::ConfigurationError(format!("Invalid header name '{name}': {e}"))
        })?;
        let header_value = HeaderValue::from_str(value).map_err(|e| {
            LlmError::ConfigurationError(format!("Invalid header value for '{name}': {e}"))
        })?;
        headers.insert(header_name, header_value);
    }

    Ok(headers)
}

/// Headers for a streaming request
pub fn build_stream_headers(
    api_key: &str,
    custom_headers: &HashMap<String, String>,
) -> Result<HeaderMap, LlmError> {
    let mut headers = build_headers(api_key, custom_headers)?;
    headers.insert(SSE_HEADER, HeaderValue::from_static("enable"));
    headers.insert(ACCEPT, HeaderValue::from_static("text/event-stream"));
    Ok(headers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stream_headers_enable_sse() {
        let mut custom = HashMap::new();
        custom.insert("X-DashScope-WorkSpace".to_string(), "ws-1".to_string());
        let headers = build_stream_headers("sk-test", &custom).unwrap();
        assert_eq!(headers[AUTHORIZATION], "Bearer sk-test");
        assert_eq!(headers[SSE_HEADER], "enable");
        assert_eq!(headers[ACCEPT], "text/event-stream");
        assert_eq!(headers["x-dashscope-workspace"], "ws-1");
    }

    #[test]
    fn invalid_header_name_is_configuration_error() {
        let mut custom = HashMap::new();
        custom.insert("bad header".to_string(), "v".to_string());
        assert!(matches!(
            build_headers("sk", &custom),
            Err(LlmError::ConfigurationError(_))
        ));
    }
}
