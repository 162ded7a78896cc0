//! DashScope API wire types
//!
//! Request and response bodies of the `text-generation/generation` endpoint.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Message role on the wire
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    #[default]
    Assistant,
    Tool,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::Tool => "tool",
        }
    }
}

/// One part of a multimodal message: either text or an image URL
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Image URL or `data:` URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl MediaContent {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            image: None,
        }
    }

    pub fn image(url: impl Into<String>) -> Self {
        Self {
            text: None,
            image: Some(url.into()),
        }
    }
}

/// Message content: a plain string or a list of parts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<MediaContent>),
}

/// A message, or a message fragment when streaming
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletionMessage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<MessageContent>,
    /// Function name for `tool` messages
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,
}

impl ChatCompletionMessage {
    pub fn new(role: Role, content: MessageContent) -> Self {
        Self {
            role: Some(role),
            content: Some(content),
            name: None,
            tool_calls: None,
        }
    }

    /// Text content; parts are joined without separator.
    pub fn content_text(&self) -> Option<String> {
        match self.content.as_ref()? {
            MessageContent::Text(text) => Some(text.clone()),
            MessageContent::Parts(parts) => {
                let text: String = parts.iter().filter_map(|p| p.text.as_deref()).collect();
                Some(text)
            }
        }
    }

    /// Tool calls as a slice; empty when absent
    pub fn tool_calls(&self) -> &[ToolCall] {
        self.tool_calls.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub r#type: Option<String>,
    #[serde(default)]
    pub function: ChatCompletionFunction,
}

/// Function name and (possibly partial) JSON arguments
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletionFunction {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arguments: Option<String>,
}

/// Tool definition sent in `parameters.tools`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionTool {
    #[serde(rename = "type")]
    pub r#type: String,
    pub function: FunctionDefinition,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDefinition {
    pub description: String,
    pub name: String,
    pub parameters: serde_json::Value,
}

impl From<crate::types::Tool> for FunctionTool {
    fn from(tool: crate::types::Tool) -> Self {
        Self {
            r#type: tool.r#type,
            function: FunctionDefinition {
                description: tool.function.description,
                name: tool.function.name,
                parameters: tool.function.parameters,
            },
        }
    }
}

/// Output shape requested via `result_format`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultFormat {
    /// `output.text` plus `output.finish_reason`
    Text,
    /// `output.choices[]`
    #[default]
    Message,
}

/// Tool choice directive
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolChoice {
    None,
    Auto,
    /// Force a call to the named function
    Function(String),
}

impl Serialize for ToolChoice {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::None => serializer.serialize_str("none"),
            Self::Auto => serializer.serialize_str("auto"),
            Self::Function(name) => serde_json::json!({
                "type": "function",
                "function": { "name": name }
            })
            .serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for ToolChoice {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        match &value {
            serde_json::Value::String(s) if s == "none" => Ok(Self::None),
            serde_json::Value::String(s) if s == "auto" => Ok(Self::Auto),
            serde_json::Value::Object(_) => value
                .pointer("/function/name")
                .and_then(|n| n.as_str())
                .map(|n| Self::Function(n.to_string()))
                .ok_or_else(|| serde::de::Error::custom("tool_choice object without function name")),
            other => Err(serde::de::Error::custom(format!(
                "unsupported tool_choice: {other}"
            ))),
        }
    }
}

/// Generation parameters. Absent fields are omitted from the request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletionParameters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_format: Option<ResultFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repetition_penalty: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub presence_penalty: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_search: Option<bool>,
    /// Stream deltas instead of cumulative text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub incremental_output: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<FunctionTool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<ToolChoice>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletionInput {
    pub messages: Vec<ChatCompletionMessage>,
}

/// Request body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub input: ChatCompletionInput,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<ChatCompletionParameters>,
}

impl ChatCompletionRequest {
    pub fn new(model: impl Into<String>, messages: Vec<ChatCompletionMessage>) -> Self {
        Self {
            model: model.into(),
            input: ChatCompletionInput { messages },
            parameters: None,
        }
    }

    pub fn with_parameters(mut self, parameters: ChatCompletionParameters) -> Self {
        self.parameters = Some(parameters);
        self
    }
}

/// Why generation stopped. DashScope sends the string `"null"` while a
/// stream is still in progress; that decodes as an absent reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCompletionFinishReason {
    Stop,
    Length,
    ToolCalls,
    Other(String),
}

impl ChatCompletionFinishReason {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Stop => "stop",
            Self::Length => "length",
            Self::ToolCalls => "tool_calls",
            Self::Other(reason) => reason,
        }
    }

    /// Parse a wire value; `"null"` and `""` mean in progress.
    pub fn from_wire(value: &str) -> Option<Self> {
        match value {
            "" | "null" => None,
            "stop" => Some(Self::Stop),
            "length" => Some(Self::Length),
            "tool_calls" => Some(Self::ToolCalls),
            other => Some(Self::Other(other.to_string())),
        }
    }
}

impl Serialize for ChatCompletionFinishReason {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

fn deserialize_finish_reason<'de, D>(
    deserializer: D,
) -> Result<Option<ChatCompletionFinishReason>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(ChatCompletionFinishReason::from_wire))
}

impl From<ChatCompletionFinishReason> for crate::types::FinishReason {
    fn from(reason: ChatCompletionFinishReason) -> Self {
        match reason {
            ChatCompletionFinishReason::Stop => Self::Stop,
            ChatCompletionFinishReason::Length => Self::Length,
            ChatCompletionFinishReason::ToolCalls => Self::ToolCalls,
            ChatCompletionFinishReason::Other(reason) => Self::Other(reason),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    #[serde(
        default,
        deserialize_with = "deserialize_finish_reason",
        skip_serializing_if = "Option::is_none"
    )]
    pub finish_reason: Option<ChatCompletionFinishReason>,
    #[serde(default)]
    pub message: ChatCompletionMessage,
}

/// Response output. `text` format fills `text`; `message` format fills `choices`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Output {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_finish_reason",
        skip_serializing_if = "Option::is_none"
    )]
    pub finish_reason: Option<ChatCompletionFinishReason>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<Choice>>,
}

impl Output {
    pub fn choices(&self) -> &[Choice] {
        self.choices.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_tokens: Option<u32>,
}

/// Non-streaming response body
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletion {
    #[serde(default)]
    pub request_id: Option<String>,
    #[serde(default)]
    pub output: Option<Output>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

/// One SSE event of a streaming response.
///
/// `ChatCompletionChunk::default()` is the empty initial chunk for merging.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletionChunk {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<Output>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object: Option<String>,
}

impl ChatCompletionChunk {
    /// First choice, if the chunk carries one
    pub fn first_choice(&self) -> Option<&Choice> {
        self.output.as_ref()?.choices().first()
    }
}

/// Error body returned on non-success statuses and `event:error` SSE events
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashScopeErrorBody {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub request_id: Option<String>,
}
