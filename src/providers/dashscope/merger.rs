//! Streaming chunk merger
//!
//! DashScope streams a tool call as a series of deltas: the first carries the
//! function name, later ones carry argument fragments, and the last carries the
//! `tool_calls` finish reason. `ChunkMerger` folds such deltas into one
//! cumulative chunk, and `aggregate_tool_calls` applies the fold to a chunk
//! stream so callers see each tool call exactly once, fully assembled.

use futures::Stream;
use futures_util::StreamExt;
use std::pin::Pin;

use super::types::{
    ChatCompletionChunk, ChatCompletionFinishReason, ChatCompletionFunction,
    ChatCompletionMessage, Choice, Output, Role, ToolCall,
};
use crate::error::LlmError;

/// Stream of decoded (and tool-call aggregated) chunks
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<ChatCompletionChunk, LlmError>> + Send>>;

/// Stateless merger for streamed chunks.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChunkMerger;

impl ChunkMerger {
    /// Merge `current` into the accumulated `previous` chunk.
    ///
    /// Fails when `current` carries more than one tool call; the streaming
    /// protocol sends at most one in-progress call per delta.
    pub fn merge(
        &self,
        previous: Option<ChatCompletionChunk>,
        current: ChatCompletionChunk,
    ) -> Result<ChatCompletionChunk, LlmError> {
        let Some(previous) = previous else {
            return Ok(current);
        };

        let output = match (previous.output, current.output) {
            (None, None) => None,
            (Some(prev), None) => Some(prev),
            (None, Some(cur)) => Some(cur),
            (Some(prev), Some(cur)) => Some(self.merge_output(prev, cur)?),
        };

        Ok(ChatCompletionChunk {
            request_id: current.request_id.or(previous.request_id),
            output,
            usage: current.usage.or(previous.usage),
            object: current.object.or(previous.object),
        })
    }

    fn merge_output(&self, previous: Output, current: Output) -> Result<Output, LlmError> {
        let prev_choice = previous.choices.and_then(|c| c.into_iter().next());
        let cur_choice = current.choices.and_then(|c| c.into_iter().next());

        let choice = match (prev_choice, cur_choice) {
            (None, None) => None,
            (Some(prev), None) => Some(prev),
            (None, Some(cur)) => Some(cur),
            (Some(prev), Some(cur)) => Some(self.merge_choice(prev, cur)?),
        };

        Ok(Output {
            text: current.text.or(previous.text),
            finish_reason: current.finish_reason.or(previous.finish_reason),
            choices: choice.map(|c| vec![c]),
        })
    }

    fn merge_choice(&self, previous: Choice, current: Choice) -> Result<Choice, LlmError> {
        Ok(Choice {
            finish_reason: current.finish_reason.or(previous.finish_reason),
            message: self.merge_message(previous.message, current.message)?,
        })
    }

    fn merge_message(
        &self,
        previous: ChatCompletionMessage,
        current: ChatCompletionMessage,
    ) -> Result<ChatCompletionMessage, LlmError> {
        let role = current.role.or(previous.role).unwrap_or(Role::Assistant);

        let mut current_calls = current.tool_calls.unwrap_or_default();
        if current_calls.len() > 1 {
            return Err(LlmError::StreamError(
                "Currently only one tool call is supported per message".to_string(),
            ));
        }

        let mut tool_calls = previous.tool_calls.unwrap_or_default();
        let last_previous = tool_calls.pop();
        match (last_previous, current_calls.pop()) {
            (None, None) => {}
            (Some(last), None) => tool_calls.push(last),
            (None, Some(call)) => tool_calls.push(call),
            (Some(last), Some(call)) => {
                if has_name(&call) {
                    tool_calls.push(last);
                    tool_calls.push(call);
                } else {
                    tool_calls.push(self.merge_tool_call(last, call));
                }
            }
        }

        Ok(ChatCompletionMessage {
            role: Some(role),
            content: current.content.or(previous.content),
            name: current.name.or(previous.name),
            tool_calls: (!tool_calls.is_empty()).then_some(tool_calls),
        })
    }

    fn merge_tool_call(&self, previous: ToolCall, current: ToolCall) -> ToolCall {
        ToolCall {
            id: current.id.filter(|id| !id.is_empty()).or(previous.id),
            r#type: current.r#type.filter(|t| !t.is_empty()).or(previous.r#type),
            function: self.merge_function(previous.function, current.function),
        }
    }

    fn merge_function(
        &self,
        previous: ChatCompletionFunction,
        current: ChatCompletionFunction,
    ) -> ChatCompletionFunction {
        let name = current
            .name
            .filter(|n| !n.is_empty())
            .or(previous.name);

        let mut arguments = previous.arguments.unwrap_or_default();
        arguments.push_str(current.arguments.as_deref().unwrap_or_default());

        ChatCompletionFunction {
            name,
            arguments: Some(arguments),
        }
    }

    /// True when the chunk's first choice carries at least one tool call.
    pub fn is_streaming_tool_function_call(&self, chunk: &ChatCompletionChunk) -> bool {
        chunk
            .first_choice()
            .is_some_and(|choice| !choice.message.tool_calls().is_empty())
    }

    /// True when the chunk carries a tool call and finished with `tool_calls`.
    pub fn is_streaming_tool_function_call_finish(&self, chunk: &ChatCompletionChunk) -> bool {
        self.is_streaming_tool_function_call(chunk)
            && chunk.first_choice().is_some_and(|choice| {
                choice.finish_reason == Some(ChatCompletionFinishReason::ToolCalls)
            })
    }
}

fn has_name(call: &ToolCall) -> bool {
    call.function.name.as_deref().is_some_and(|n| !n.is_empty())
}

/// Collapse each streamed tool call into a single merged chunk.
///
/// Chunks outside a tool call pass through unchanged. A chunk that starts a
/// tool call opens a window; following chunks are merged into it until the
/// merged chunk finishes with `tool_calls`, and then the window is emitted. An
/// open window is flushed when the input ends. A merge error ends the stream.
pub fn aggregate_tool_calls<S>(chunks: S) -> ChunkStream
where
    S: Stream<Item = Result<ChatCompletionChunk, LlmError>> + Send + 'static,
{
    let merger = ChunkMerger;
    let stream = async_stream::try_stream! {
        let mut chunks = Box::pin(chunks);
        let mut window: Option<ChatCompletionChunk> = None;

        while let Some(chunk) = chunks.next().await {
            let chunk = chunk?;

            if window.is_none() && !merger.is_streaming_tool_function_call(&chunk) {
                yield chunk;
                continue;
            }

            let merged = merger.merge(window.take(), chunk)?;
            if merger.is_streaming_tool_function_call_finish(&merged) {
                tracing::debug!(request_id = ?merged.request_id, "tool call assembled");
                yield merged;
            } else {
                window = Some(merged);
            }
        }

        if let Some(pending) = window {
            tracing::debug!(request_id = ?pending.request_id, "flushing unfinished tool call window");
            yield pending;
        }
    };
    Box::pin(stream)
}
