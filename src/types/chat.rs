//! Chat message and prompt types

use serde::{Deserialize, Serialize};

use super::tools::ToolCall;

/// Message role
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
    Tool,
}

/// Payload of a media attachment
#[derive(Debug, Clone, PartialEq)]
pub enum MediaData {
    /// Raw bytes, sent inline as a base64 data URL
    Bytes(Vec<u8>),
    /// A URL, or a data URL already prepared by the caller
    Url(String),
}

/// Media attached to a message
#[derive(Debug, Clone, PartialEq)]
pub struct Media {
    /// MIME type; guessed from the payload when absent
    pub mime_type: Option<String>,
    pub data: MediaData,
}

impl Media {
    pub fn from_bytes(mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            mime_type: Some(mime_type.into()),
            data: MediaData::Bytes(bytes),
        }
    }

    pub fn from_url(url: impl Into<String>) -> Self {
        Self {
            mime_type: None,
            data: MediaData::Url(url.into()),
        }
    }

    /// MIME type stated by the caller or by a `data:` URL header.
    pub fn declared_mime_type(&self) -> Option<String> {
        if let Some(mime) = &self.mime_type {
            return Some(mime.clone());
        }
        match &self.data {
            MediaData::Bytes(_) => None,
            MediaData::Url(url) => crate::utils::mime::mime_from_data_url(url),
        }
    }

    /// The declared MIME type, or a best-effort guess from the payload.
    pub fn resolved_mime_type(&self) -> String {
        if let Some(mime) = &self.mime_type {
            return mime.clone();
        }
        match &self.data {
            MediaData::Bytes(bytes) => crate::utils::mime::guess_mime(Some(bytes), None),
            MediaData::Url(url) => match crate::utils::mime::mime_from_data_url(url) {
                Some(mime) => mime,
                None => crate::utils::mime::guess_mime(None, Some(url)),
            },
        }
    }
}

/// Chat message
///
/// ```rust
/// use siumai_dashscope::types::{ChatMessage, Media};
///
/// let msg = ChatMessage::user("What is in this picture?")
///     .with_media(Media::from_url("https://example.com/cat.png"))
///     .build();
/// assert_eq!(msg.media.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
    pub media: Vec<Media>,
    /// For tool messages, the name of the function that produced the result
    pub name: Option<String>,
    /// Tool calls previously emitted by the assistant
    pub tool_calls: Vec<ToolCall>,
}

impl ChatMessage {
    pub fn user<S: Into<String>>(content: S) -> ChatMessageBuilder {
        ChatMessageBuilder::new(MessageRole::User, content)
    }

    pub fn system<S: Into<String>>(content: S) -> ChatMessageBuilder {
        ChatMessageBuilder::new(MessageRole::System, content)
    }

    pub fn assistant<S: Into<String>>(content: S) -> ChatMessageBuilder {
        ChatMessageBuilder::new(MessageRole::Assistant, content)
    }

    /// Creates a tool result message for the function `name`
    pub fn tool_result<N: Into<String>, S: Into<String>>(name: N, result: S) -> ChatMessageBuilder {
        ChatMessageBuilder::new(MessageRole::Tool, result).with_name(name)
    }
}

/// Builder for `ChatMessage`
#[derive(Debug, Clone)]
pub struct ChatMessageBuilder {
    message: ChatMessage,
}

impl ChatMessageBuilder {
    fn new<S: Into<String>>(role: MessageRole, content: S) -> Self {
        Self {
            message: ChatMessage {
                role,
                content: content.into(),
                media: Vec::new(),
                name: None,
                tool_calls: Vec::new(),
            },
        }
    }

    pub fn with_media(mut self, media: Media) -> Self {
        self.message.media.push(media);
        self
    }

    pub fn with_image_url(self, url: impl Into<String>) -> Self {
        self.with_media(Media::from_url(url))
    }

    pub fn with_image_bytes(self, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.with_media(Media::from_bytes(mime_type, bytes))
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.message.name = Some(name.into());
        self
    }

    pub fn with_tool_calls(mut self, tool_calls: Vec<ToolCall>) -> Self {
        self.message.tool_calls = tool_calls;
        self
    }

    pub fn build(self) -> ChatMessage {
        self.message
    }
}

/// Messages plus optional per-call options.
///
/// Options given here take precedence over the model's defaults field by field.
#[derive(Debug, Clone)]
pub struct Prompt<O> {
    pub messages: Vec<ChatMessage>,
    pub options: Option<O>,
}

impl<O> Prompt<O> {
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            options: None,
        }
    }

    pub fn with_options(mut self, options: O) -> Self {
        self.options = Some(options);
        self
    }
}

impl<O> From<ChatMessage> for Prompt<O> {
    fn from(message: ChatMessage) -> Self {
        Self::new(vec![message])
    }
}

impl<O> From<&str> for Prompt<O> {
    fn from(text: &str) -> Self {
        Self::new(vec![ChatMessage::user(text).build()])
    }
}
