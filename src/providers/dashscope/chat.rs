//! `DashScope` Chat Capability Implementation
//!
//! Implements the `ChatCapability` trait for `DashScope`: prompt to request
//! translation, option merging, and response mapping for both call styles.

use async_trait::async_trait;
use futures_util::StreamExt;
use serde_json::Value;
use std::collections::HashMap;

use super::api::DashScopeApi;
use super::builder::DashScopeBuilder;
use super::config::DashScopeConfig;
use super::metadata::response_metadata;
use super::models::DashScopeModel;
use super::options::{DashScopeChatOptions, resolve_function_tools};
use super::types::{
    ChatCompletion, ChatCompletionChunk, ChatCompletionFunction, ChatCompletionMessage,
    ChatCompletionParameters, ChatCompletionRequest, Choice, FunctionTool, MediaContent,
    MessageContent, Output, Role, ToolCall as WireToolCall,
};
use crate::error::LlmError;
use crate::retry_api::{RetryOptions, maybe_retry};
use crate::streaming::ChatStream;
use crate::traits::ChatCapability;
use crate::types::{
    ChatMessage, ChatResponse, FunctionCall, Generation, Media, MediaData, MessageRole, Prompt,
    Tool, ToolCall,
};
use crate::utils::mime::to_data_url;

/// DashScope chat model
#[derive(Debug, Clone)]
pub struct DashScopeChatModel {
    api: DashScopeApi,
    default_options: DashScopeChatOptions,
    retry_options: Option<RetryOptions>,
}

impl DashScopeChatModel {
    /// Create a model from a configuration, building the HTTP client from
    /// `config.http_config`.
    pub fn new(config: DashScopeConfig) -> Result<Self, LlmError> {
        let http_client = config.http_config.build_client()?;
        Self::with_http_client(config, http_client)
    }

    /// Create a model that sends requests through `http_client`.
    pub fn with_http_client(
        config: DashScopeConfig,
        http_client: reqwest::Client,
    ) -> Result<Self, LlmError> {
        config.validate()?;
        let api = DashScopeApi::new(
            http_client,
            config.base_url,
            config.api_key,
            config.http_config.headers,
        );
        Ok(Self {
            api,
            default_options: config.default_options,
            retry_options: config.retry_options,
        })
    }

    pub fn builder() -> DashScopeBuilder {
        DashScopeBuilder::new()
    }

    pub fn default_options(&self) -> &DashScopeChatOptions {
        &self.default_options
    }

    /// The low-level API client
    pub fn api(&self) -> &DashScopeApi {
        &self.api
    }

    /// Translate a prompt into a DashScope request.
    ///
    /// Streaming requests ask for incremental output unless the options say
    /// otherwise.
    pub fn create_request(
        &self,
        prompt: &Prompt<DashScopeChatOptions>,
        stream: bool,
    ) -> Result<ChatCompletionRequest, LlmError> {
        let runtime = prompt.options.as_ref();
        let options = DashScopeChatOptions::merge(runtime, &self.default_options);

        let messages = prompt
            .messages
            .iter()
            .map(to_wire_message)
            .collect::<Result<Vec<_>, _>>()?;

        let mut tools: Vec<Tool> = options.tools.clone().unwrap_or_default();
        for tool in resolve_function_tools(runtime, &self.default_options)? {
            if !tools.iter().any(|t| t.function.name == tool.function.name) {
                tools.push(tool);
            }
        }

        let incremental_output = match (options.incremental_output, stream) {
            (Some(value), _) => Some(value),
            (None, true) => Some(true),
            (None, false) => None,
        };

        let parameters = ChatCompletionParameters {
            temperature: options.temperature,
            top_p: options.top_p,
            result_format: Some(options.result_format.unwrap_or_default()),
            seed: options.seed,
            max_tokens: options.max_tokens,
            top_k: options.top_k,
            repetition_penalty: options.repetition_penalty,
            presence_penalty: options.presence_penalty,
            stop: options.stop.clone(),
            enable_search: options.enable_search,
            incremental_output,
            tools: (!tools.is_empty())
                .then(|| tools.into_iter().map(FunctionTool::from).collect()),
            tool_choice: options.tool_choice.clone(),
        };

        let model = options
            .model
            .unwrap_or_else(|| DashScopeModel::default().into());
        if prompt.messages.iter().any(|m| !m.media.is_empty())
            && model
                .parse::<DashScopeModel>()
                .is_ok_and(|known| !known.supports_vision())
        {
            tracing::warn!(%model, "image parts sent to a model without vision support");
        }
        Ok(ChatCompletionRequest::new(model, messages).with_parameters(parameters))
    }
}

#[async_trait]
impl ChatCapability for DashScopeChatModel {
    type Options = DashScopeChatOptions;

    async fn chat(&self, prompt: Prompt<Self::Options>) -> Result<ChatResponse, LlmError> {
        let request = self.create_request(&prompt, false)?;
        let completion = maybe_retry(self.retry_options.clone(), || {
            self.api.chat_completion(&request)
        })
        .await?;

        let Some(completion) = completion else {
            tracing::warn!(model = %request.model, "no chat completion returned");
            return Ok(ChatResponse::empty());
        };
        Ok(completion_to_response(completion, &request.model))
    }

    async fn chat_stream(&self, prompt: Prompt<Self::Options>) -> Result<ChatStream, LlmError> {
        let request = self.create_request(&prompt, true)?;
        let mut chunks = maybe_retry(self.retry_options.clone(), || {
            self.api.chat_completion_stream(&request)
        })
        .await?;

        let model = request.model;
        let stream = async_stream::try_stream! {
            let mut roles = RoleTracker::default();
            while let Some(chunk) = chunks.next().await {
                let chunk = chunk?;
                yield chunk_to_response(chunk, &model, &mut roles);
            }
        };
        Ok(Box::pin(stream))
    }
}

fn to_wire_role(role: MessageRole) -> Role {
    match role {
        MessageRole::System => Role::System,
        MessageRole::User => Role::User,
        MessageRole::Assistant => Role::Assistant,
        MessageRole::Tool => Role::Tool,
    }
}

fn to_wire_message(message: &ChatMessage) -> Result<ChatCompletionMessage, LlmError> {
    let content = if message.media.is_empty() {
        MessageContent::Text(message.content.clone())
    } else {
        let mut parts = Vec::with_capacity(message.media.len() + 1);
        parts.push(MediaContent::text(message.content.clone()));
        for media in &message.media {
            parts.push(MediaContent::image(media_url(media)?));
        }
        MessageContent::Parts(parts)
    };

    let tool_calls: Vec<WireToolCall> = message
        .tool_calls
        .iter()
        .map(|call| WireToolCall {
            id: call.id.clone(),
            r#type: Some(call.r#type.clone()),
            function: ChatCompletionFunction {
                name: Some(call.function.name.clone()),
                arguments: Some(call.function.arguments.clone()),
            },
        })
        .collect();

    Ok(ChatCompletionMessage {
        role: Some(to_wire_role(message.role)),
        content: Some(content),
        name: message.name.clone(),
        tool_calls: (!tool_calls.is_empty()).then_some(tool_calls),
    })
}

/// URL for an image part.
///
/// Bytes must resolve to `image/*`. URLs pass through unless a declared MIME
/// type says they are not images.
fn media_url(media: &Media) -> Result<String, LlmError> {
    match &media.data {
        MediaData::Bytes(bytes) => {
            let mime_type = media.resolved_mime_type();
            ensure_image(&mime_type)?;
            Ok(to_data_url(&mime_type, bytes))
        }
        MediaData::Url(url) => {
            if let Some(mime_type) = media.declared_mime_type() {
                ensure_image(&mime_type)?;
            }
            Ok(url.clone())
        }
    }
}

fn ensure_image(mime_type: &str) -> Result<(), LlmError> {
    if mime_type.starts_with("image/") {
        Ok(())
    } else {
        Err(LlmError::UnsupportedOperation(format!(
            "Unsupported media type: {mime_type}"
        )))
    }
}

fn from_wire_tool_call(call: &WireToolCall) -> ToolCall {
    ToolCall {
        id: call.id.clone(),
        r#type: call.r#type.clone().unwrap_or_else(|| "function".to_string()),
        function: FunctionCall {
            name: call.function.name.clone().unwrap_or_default(),
            arguments: call.function.arguments.clone().unwrap_or_default(),
        },
    }
}

fn properties(
    request_id: Option<&str>,
    role: Role,
    finish_reason: Option<&str>,
) -> HashMap<String, Value> {
    let mut map = HashMap::new();
    map.insert(
        "request_id".to_string(),
        request_id.map_or(Value::Null, |id| Value::String(id.to_string())),
    );
    map.insert("role".to_string(), Value::String(role.as_str().to_string()));
    if let Some(reason) = finish_reason {
        map.insert("finishReason".to_string(), Value::String(reason.to_string()));
    }
    map
}

fn choice_generation(choice: &Choice, request_id: Option<&str>, role: Role) -> Generation {
    Generation {
        content: choice.message.content_text(),
        tool_calls: choice
            .message
            .tool_calls()
            .iter()
            .map(from_wire_tool_call)
            .collect(),
        finish_reason: choice.finish_reason.clone().map(Into::into),
        properties: properties(
            request_id,
            role,
            choice.finish_reason.as_ref().map(|r| r.as_str()),
        ),
    }
}

fn text_generation(output: &Output, request_id: Option<&str>) -> Generation {
    Generation {
        content: output.text.clone(),
        tool_calls: Vec::new(),
        finish_reason: output.finish_reason.clone().map(Into::into),
        properties: properties(
            request_id,
            Role::Assistant,
            output.finish_reason.as_ref().map(|r| r.as_str()),
        ),
    }
}

/// Generations of an output: one per choice, or one from `text` when the
/// output has no choices.
fn output_generations(
    output: &Output,
    request_id: Option<&str>,
    mut role_for: impl FnMut(&Choice) -> Role,
) -> Vec<Generation> {
    let choices = output.choices();
    if !choices.is_empty() {
        return choices
            .iter()
            .map(|choice| {
                let role = role_for(choice);
                choice_generation(choice, request_id, role)
            })
            .collect();
    }
    if output.text.is_some() {
        return vec![text_generation(output, request_id)];
    }
    Vec::new()
}

fn completion_to_response(completion: ChatCompletion, model: &str) -> ChatResponse {
    let request_id = completion.request_id.as_deref();
    let generations = match &completion.output {
        Some(output) => output_generations(output, request_id, |choice| {
            choice.message.role.unwrap_or_default()
        }),
        None => Vec::new(),
    };
    if generations.is_empty() {
        tracing::warn!(?request_id, "DashScope response contained no generations");
    }

    let response = ChatResponse::new(generations);
    match completion.usage {
        Some(usage) => response.with_metadata(response_metadata(request_id, model, usage)),
        None => response,
    }
}

/// Per-stream role memory.
///
/// DashScope only sends the role on the first chunk of a response; later
/// chunks reuse it. A new request id starts over.
#[derive(Debug, Default)]
struct RoleTracker {
    request_id: Option<String>,
    role: Option<Role>,
}

impl RoleTracker {
    fn resolve(&mut self, request_id: Option<&str>, role: Option<Role>) -> Role {
        if request_id.is_some() && request_id != self.request_id.as_deref() {
            self.request_id = request_id.map(str::to_string);
            self.role = None;
        }
        if self.role.is_none() {
            self.role = role;
        }
        self.role.unwrap_or_default()
    }
}

fn chunk_to_response(
    chunk: ChatCompletionChunk,
    model: &str,
    roles: &mut RoleTracker,
) -> ChatResponse {
    let request_id = chunk.request_id.as_deref();
    let generations = match &chunk.output {
        Some(output) => output_generations(output, request_id, |choice| {
            roles.resolve(request_id, choice.message.role)
        }),
        None => Vec::new(),
    };

    let response = ChatResponse::new(generations);
    match chunk.usage {
        Some(usage) => response.with_metadata(response_metadata(request_id, model, usage)),
        None => response,
    }
}
