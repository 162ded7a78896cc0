//! Chat response types

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::tools::ToolCall;

/// Why the model stopped generating.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    /// Natural stop point or a stop sequence
    Stop,
    /// `max_tokens` reached
    Length,
    /// The model requested tool calls
    ToolCalls,
    /// Any other provider-specific reason
    Other(String),
}

impl FinishReason {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Stop => "stop",
            Self::Length => "length",
            Self::ToolCalls => "tool_calls",
            Self::Other(reason) => reason,
        }
    }
}

/// Token usage
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Response-level metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseMetadata {
    /// Provider request id
    pub id: Option<String>,
    pub model: Option<String>,
    pub usage: Usage,
    pub provider: String,
}

/// One generated alternative
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Generation {
    /// Generated text; absent for pure tool-call turns
    pub content: Option<String>,
    pub tool_calls: Vec<ToolCall>,
    pub finish_reason: Option<FinishReason>,
    /// Provider properties (`request_id`, `role`, `finishReason`)
    pub properties: HashMap<String, serde_json::Value>,
}

impl Generation {
    pub fn text(&self) -> Option<&str> {
        self.content.as_deref()
    }

    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).and_then(|v| v.as_str())
    }
}

/// Chat response: zero or more generations plus optional metadata
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatResponse {
    pub generations: Vec<Generation>,
    pub metadata: Option<ResponseMetadata>,
}

impl ChatResponse {
    pub fn new(generations: Vec<Generation>) -> Self {
        Self {
            generations,
            metadata: None,
        }
    }

    /// Response with no generations
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_metadata(mut self, metadata: ResponseMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// First generation, if any
    pub fn result(&self) -> Option<&Generation> {
        self.generations.first()
    }

    /// Text of the first generation
    pub fn content_text(&self) -> Option<&str> {
        self.result().and_then(Generation::text)
    }

    pub fn usage(&self) -> Option<&Usage> {
        self.metadata.as_ref().map(|m| &m.usage)
    }
}
