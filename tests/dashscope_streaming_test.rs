//! DashScope SSE streaming tests
//!
//! Streams are requested with `X-DashScope-SSE: enable`; each event carries a
//! full chunk as JSON and the stream ends with `data: [DONE]`.

use futures_util::StreamExt;
use serde_json::{Value, json};
use siumai_dashscope::prelude::*;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_partial_json, header, method, path},
};

const GENERATION_PATH: &str = "/text-generation/generation";

fn model_for(server: &MockServer) -> DashScopeChatModel {
    DashScopeChatModel::builder()
        .api_key("test-api-key")
        .base_url(server.uri())
        .with_retry(None)
        .build()
        .unwrap()
}

/// Render chunks the way DashScope frames them, followed by `[DONE]`.
fn sse_body(chunks: &[Value]) -> String {
    let mut body = String::new();
    for (i, chunk) in chunks.iter().enumerate() {
        body.push_str(&format!(
            "id:{}\nevent:result\n:HTTP_STATUS/200\ndata:{}\n\n",
            i + 1,
            chunk
        ));
    }
    body.push_str("data: [DONE]\n\n");
    body
}

fn text_chunk(content: &str, role: Option<&str>, finish: &str, usage: Option<Value>) -> Value {
    let mut message = json!({"content": content});
    if let Some(role) = role {
        message["role"] = json!(role);
    }
    let mut chunk = json!({
        "request_id": "stream-req-1",
        "output": {"choices": [{"message": message, "finish_reason": finish}]}
    });
    if let Some(usage) = usage {
        chunk["usage"] = usage;
    }
    chunk
}

async fn mount_stream(server: &MockServer, body: String) {
    Mock::given(method("POST"))
        .and(path(GENERATION_PATH))
        .and(header("x-dashscope-sse", "enable"))
        .and(header("accept", "text/event-stream"))
        .and(header("authorization", "Bearer test-api-key"))
        .and(body_partial_json(json!({"parameters": {"incremental_output": true}})))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_text_stream_continues_role_and_stops_at_done() {
    let mock_server = MockServer::start().await;
    let mut body = sse_body(&[
        text_chunk("Hel", Some("assistant"), "null", None),
        text_chunk("lo", None, "null", None),
        text_chunk(
            "!",
            None,
            "stop",
            Some(json!({"input_tokens": 8, "output_tokens": 3, "total_tokens": 11})),
        ),
    ]);
    // Anything after [DONE] is never surfaced
    body.push_str(&format!(
        "data:{}\n\n",
        text_chunk("ignored", None, "null", None)
    ));
    mount_stream(&mock_server, body).await;

    let model = model_for(&mock_server);
    let stream = model.chat_stream(Prompt::from("Say hello")).await.unwrap();
    let responses: Vec<ChatResponse> = stream.map(|r| r.unwrap()).collect().await;

    assert_eq!(responses.len(), 3);
    let texts: Vec<&str> = responses
        .iter()
        .map(|r| r.content_text().unwrap())
        .collect();
    assert_eq!(texts.concat(), "Hello!");

    for response in &responses {
        let generation = response.result().unwrap();
        assert_eq!(generation.property("role"), Some("assistant"));
        assert_eq!(generation.property("request_id"), Some("stream-req-1"));
    }

    assert_eq!(responses[0].result().unwrap().finish_reason, None);
    let last = responses.last().unwrap();
    assert_eq!(last.result().unwrap().finish_reason, Some(FinishReason::Stop));
    let usage = last.usage().unwrap();
    assert_eq!(usage.prompt_tokens, 8);
    assert_eq!(usage.completion_tokens, 3);
    assert_eq!(usage.total_tokens, 11);
}

#[tokio::test]
async fn test_streamed_tool_call_is_reassembled() {
    let mock_server = MockServer::start().await;
    let body = sse_body(&[
        json!({
            "request_id": "tool-req",
            "output": {"choices": [{
                "finish_reason": "null",
                "message": {
                    "role": "assistant",
                    "content": "",
                    "tool_calls": [{"type": "function", "function": {"name": "lookup", "arguments": "{\"q\":"}}]
                }
            }]}
        }),
        json!({
            "request_id": "tool-req",
            "output": {"choices": [{
                "finish_reason": "null",
                "message": {
                    "content": "",
                    "tool_calls": [{"type": "function", "function": {"arguments": "\"x\"}"}}]
                }
            }]}
        }),
        json!({
            "request_id": "tool-req",
            "output": {"choices": [{"finish_reason": "tool_calls", "message": {"content": ""}}]},
            "usage": {"input_tokens": 20, "output_tokens": 9, "total_tokens": 29}
        }),
    ]);
    mount_stream(&mock_server, body).await;

    let lookup = Tool::function(
        "lookup",
        "Look up a value",
        json!({"type": "object", "properties": {"q": {"type": "string"}}}),
    );
    let prompt = Prompt::from("Find x")
        .with_options(DashScopeChatOptions::new().with_tools(vec![lookup]));

    let responses: Vec<ChatResponse> = model_for(&mock_server)
        .chat_stream(prompt)
        .await
        .unwrap()
        .map(|r| r.unwrap())
        .collect()
        .await;

    assert_eq!(responses.len(), 1);
    let generation = responses[0].result().unwrap();
    assert_eq!(generation.finish_reason, Some(FinishReason::ToolCalls));
    assert_eq!(generation.property("role"), Some("assistant"));
    assert_eq!(generation.tool_calls.len(), 1);
    let call = &generation.tool_calls[0];
    assert_eq!(call.function.name, "lookup");
    assert_eq!(call.function.arguments, "{\"q\":\"x\"}");
    assert_eq!(call.arguments_json().unwrap(), json!({"q": "x"}));
    assert_eq!(responses[0].usage().unwrap().total_tokens, 29);
}

#[tokio::test]
async fn test_two_tool_calls_in_one_delta_fail_the_stream() {
    let mock_server = MockServer::start().await;
    let call = json!({"type": "function", "function": {"name": "a", "arguments": "{}"}});
    let body = sse_body(&[
        json!({
            "request_id": "bad-req",
            "output": {"choices": [{
                "finish_reason": "null",
                "message": {"role": "assistant", "tool_calls": [call.clone()]}
            }]}
        }),
        json!({
            "request_id": "bad-req",
            "output": {"choices": [{
                "finish_reason": "null",
                "message": {"tool_calls": [call.clone(), call]}
            }]}
        }),
    ]);
    mount_stream(&mock_server, body).await;

    let results: Vec<Result<ChatResponse, LlmError>> = model_for(&mock_server)
        .chat_stream(Prompt::from("go"))
        .await
        .unwrap()
        .collect()
        .await;

    assert_eq!(results.len(), 1);
    assert!(matches!(results[0], Err(LlmError::StreamError(_))));
}

#[tokio::test]
async fn test_error_event_is_surfaced() {
    let mock_server = MockServer::start().await;
    let mut body = String::new();
    body.push_str(&format!(
        "id:1\nevent:result\n:HTTP_STATUS/200\ndata:{}\n\n",
        text_chunk("Hi", Some("assistant"), "null", None)
    ));
    body.push_str(
        "id:2\nevent:error\n:HTTP_STATUS/429\ndata:{\"code\":\"Throttling.RateQuota\",\"message\":\"Requests rate limit exceeded, please try again later.\",\"request_id\":\"stream-req-1\"}\n\n",
    );
    mount_stream(&mock_server, body).await;

    let results: Vec<Result<ChatResponse, LlmError>> = model_for(&mock_server)
        .chat_stream(Prompt::from("hi"))
        .await
        .unwrap()
        .collect()
        .await;

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].as_ref().unwrap().content_text(), Some("Hi"));
    assert!(matches!(results[1], Err(LlmError::RateLimitError(_))));
}

#[tokio::test]
async fn test_stream_rejected_before_first_event() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GENERATION_PATH))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "code": "InvalidApiKey",
            "message": "Invalid API-key provided."
        })))
        .mount(&mock_server)
        .await;

    let result = model_for(&mock_server).chat_stream(Prompt::from("hi")).await;
    assert!(matches!(result, Err(LlmError::AuthenticationError(_))));
}
