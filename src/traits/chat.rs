//! Chat capability trait

use async_trait::async_trait;

use crate::error::LlmError;
use crate::streaming::ChatStream;
use crate::types::{ChatMessage, ChatResponse, Prompt};

#[async_trait]
pub trait ChatCapability: Send + Sync {
    /// Per-call options accepted in a `Prompt`
    type Options: Send + Sync + 'static;

    /// Send a prompt and wait for the full response.
    async fn chat(&self, prompt: Prompt<Self::Options>) -> Result<ChatResponse, LlmError>;

    /// Send a prompt and receive incremental responses.
    async fn chat_stream(&self, prompt: Prompt<Self::Options>) -> Result<ChatStream, LlmError>;

    /// Ask a single question and return the text of the first generation.
    async fn ask(&self, question: String) -> Result<String, LlmError> {
        let response = self
            .chat(Prompt::new(vec![ChatMessage::user(question).build()]))
            .await?;
        response
            .content_text()
            .map(str::to_string)
            .ok_or_else(|| LlmError::ParseError("No text in response".to_string()))
    }
}
