use crate::error::LlmError;
use serde_json::Value;

use super::types::DashScopeErrorBody;

/// Classify a DashScope failure from its HTTP status and error body.
///
/// DashScope returns `{ "code": "...", "message": "...", "request_id": "..." }`.
/// The `code` is checked first, then the status, then message heuristics.
pub fn classify_dashscope_http_error(status: u16, body_text: &str) -> LlmError {
    let json: Option<Value> = serde_json::from_str(body_text).ok();
    let body: DashScopeErrorBody = json
        .as_ref()
        .and_then(|v| serde_json::from_value(v.clone()).ok())
        .unwrap_or_default();

    let message = match (&body.message, body_text.trim()) {
        (Some(m), _) if !m.is_empty() => m.clone(),
        (_, "") => format!("HTTP {status}"),
        (_, raw) => raw.to_string(),
    };
    let code = body.code.as_deref().unwrap_or("");

    if code == "InvalidApiKey" || status == 401 {
        return LlmError::AuthenticationError(message);
    }
    if code == "Arrearage" || code.contains("AllocationQuota") || code.contains("FreeTierOnly") {
        return LlmError::QuotaExceededError(message);
    }
    if code.starts_with("Throttling") || status == 429 {
        return LlmError::RateLimitError(message);
    }
    if code == "InvalidParameter" {
        return LlmError::InvalidParameter(message);
    }
    if status == 400 {
        return LlmError::InvalidInput(message);
    }

    let lower = message.to_lowercase();
    if lower.contains("api key") || lower.contains("unauthorized") {
        return LlmError::AuthenticationError(message);
    }
    if lower.contains("quota") {
        return LlmError::QuotaExceededError(message);
    }

    let message = if code.is_empty() {
        format!("dashscope API error: {message}")
    } else {
        format!("dashscope API error ({code}): {message}")
    };
    match json {
        Some(details) => LlmError::api_error_with_details(status, message, details),
        None => LlmError::api_error(status, message),
    }
}

/// Classify the payload of an `event:error` SSE event.
///
/// Stream errors carry no HTTP status; the code decides the variant and
/// unknown codes become a non-retryable `StreamError`.
pub fn classify_dashscope_stream_error(data: &str) -> LlmError {
    let body: DashScopeErrorBody = serde_json::from_str(data).unwrap_or_default();
    match body.code.as_deref() {
        Some(code)
            if code == "InvalidApiKey"
                || code == "Arrearage"
                || code.starts_with("Throttling")
                || code == "InvalidParameter" =>
        {
            classify_dashscope_http_error(0, data)
        }
        Some(code) => LlmError::StreamError(format!(
            "dashscope stream error ({code}): {}",
            body.message.unwrap_or_default()
        )),
        None => LlmError::StreamError(format!("dashscope stream error: {data}")),
    }
}
