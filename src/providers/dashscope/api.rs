//! Low-level DashScope HTTP API
//!
//! One endpoint, two modes: a JSON completion and an SSE chunk stream.

use eventsource_stream::Event;
use futures_util::StreamExt;
use secrecy::{ExposeSecret, SecretString};
use std::collections::HashMap;

use super::errors::{classify_dashscope_http_error, classify_dashscope_stream_error};
use super::merger::{ChunkStream, aggregate_tool_calls};
use super::types::{ChatCompletion, ChatCompletionChunk, ChatCompletionRequest};
use super::utils::{build_headers, build_stream_headers};
use crate::error::LlmError;
use crate::streaming::sse_event_stream;

/// Default DashScope base URL
pub const DEFAULT_BASE_URL: &str = "https://dashscope.aliyuncs.com/api/v1/services/aigc";

/// Path of the text generation endpoint, relative to the base URL
pub const TEXT_GENERATION_PATH: &str = "/text-generation/generation";

/// Thin client over the text generation endpoint
#[derive(Clone)]
pub struct DashScopeApi {
    http_client: reqwest::Client,
    base_url: String,
    api_key: SecretString,
    custom_headers: HashMap<String, String>,
}

impl std::fmt::Debug for DashScopeApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DashScopeApi")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .field("custom_headers", &self.custom_headers.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl DashScopeApi {
    pub fn new(
        http_client: reqwest::Client,
        base_url: impl Into<String>,
        api_key: SecretString,
        custom_headers: HashMap<String, String>,
    ) -> Self {
        Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            custom_headers,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self) -> String {
        format!("{}{}", self.base_url, TEXT_GENERATION_PATH)
    }

    /// Create a chat completion.
    ///
    /// Returns `Ok(None)` when the response body is empty or cannot be decoded.
    pub async fn chat_completion(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<Option<ChatCompletion>, LlmError> {
        let url = self.endpoint();
        let headers = build_headers(self.api_key.expose_secret(), &self.custom_headers)?;

        tracing::debug!(%url, model = %request.model, "sending DashScope chat request");
        let response = self
            .http_client
            .post(&url)
            .headers(headers)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(classify_dashscope_http_error(status.as_u16(), &body));
        }

        if body.trim().is_empty() {
            tracing::warn!(model = %request.model, "DashScope returned an empty response body");
            return Ok(None);
        }

        match serde_json::from_str::<ChatCompletion>(&body) {
            Ok(completion) => Ok(Some(completion)),
            Err(e) => {
                tracing::warn!(model = %request.model, error = %e, "could not decode DashScope response body");
                Ok(None)
            }
        }
    }

    /// Create a streaming chat completion.
    ///
    /// The stream ends at `[DONE]`. Tool-call deltas are merged so each call
    /// arrives as a single chunk.
    pub async fn chat_completion_stream(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<ChunkStream, LlmError> {
        let url = self.endpoint();
        let headers = build_stream_headers(self.api_key.expose_secret(), &self.custom_headers)?;

        tracing::debug!(%url, model = %request.model, "sending DashScope streaming chat request");
        let response = self
            .http_client
            .post(&url)
            .headers(headers)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_dashscope_http_error(status.as_u16(), &body));
        }

        let chunks = sse_event_stream(response).map(|event| event.and_then(decode_chunk));
        Ok(aggregate_tool_calls(chunks))
    }
}

/// Decode one SSE event into a chunk; `event:error` events become errors.
fn decode_chunk(event: Event) -> Result<ChatCompletionChunk, LlmError> {
    if event.event == "error" {
        return Err(classify_dashscope_stream_error(&event.data));
    }
    serde_json::from_str(&event.data)
        .map_err(|e| LlmError::ParseError(format!("Failed to parse DashScope chunk: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::dashscope::types::{ChatCompletionMessage, MessageContent, Role};
    use tracing_test::traced_test;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn api_for(server: &MockServer) -> DashScopeApi {
        DashScopeApi::new(
            reqwest::Client::new(),
            server.uri(),
            SecretString::from("sk-test".to_string()),
            HashMap::new(),
        )
    }

    fn request() -> ChatCompletionRequest {
        ChatCompletionRequest::new(
            "qwen-turbo",
            vec![ChatCompletionMessage::new(
                Role::User,
                MessageContent::Text("hi".into()),
            )],
        )
    }

    #[tokio::test]
    #[traced_test]
    async fn empty_body_is_none_with_warning() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(TEXT_GENERATION_PATH))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let completion = api_for(&server).chat_completion(&request()).await.unwrap();
        assert!(completion.is_none());
        assert!(logs_contain("empty response body"));
    }

    #[tokio::test]
    #[traced_test]
    async fn undecodable_body_is_none_with_warning() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(TEXT_GENERATION_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let completion = api_for(&server).chat_completion(&request()).await.unwrap();
        assert!(completion.is_none());
        assert!(logs_contain("could not decode DashScope response body"));
    }

    fn event(name: &str, data: &str) -> Event {
        Event {
            event: name.to_string(),
            data: data.to_string(),
            id: String::new(),
            retry: None,
        }
    }

    #[test]
    fn decode_chunk_reads_result_events() {
        let chunk = decode_chunk(event(
            "result",
            r#"{"request_id":"r","output":{"choices":[{"finish_reason":"null","message":{"role":"assistant","content":"Hi"}}]}}"#,
        ))
        .unwrap();
        assert_eq!(chunk.request_id.as_deref(), Some("r"));
        assert!(chunk.first_choice().is_some());
    }

    #[test]
    fn decode_chunk_classifies_error_events() {
        let err = decode_chunk(event(
            "error",
            r#"{"code":"InvalidApiKey","message":"Invalid API-key provided."}"#,
        ))
        .unwrap_err();
        assert!(matches!(err, LlmError::AuthenticationError(_)));
    }

    #[test]
    fn decode_chunk_rejects_garbage() {
        let err = decode_chunk(event("result", "not json")).unwrap_err();
        assert!(matches!(err, LlmError::ParseError(_)));
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let api = DashScopeApi::new(
            reqwest::Client::new(),
            "http://localhost:1234/",
            SecretString::from("sk-secret-value".to_string()),
            HashMap::new(),
        );
        assert_eq!(api.endpoint(), "http://localhost:1234/text-generation/generation");
        assert!(!format!("{api:?}").contains("secret-value"));
    }
}
