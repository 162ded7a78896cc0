//! Core Streaming Types
//!
//! `ChatStream` is what every streaming chat call returns. The `sse` submodule
//! turns an HTTP response body into a stream of SSE data payloads.

use futures::Stream;
use std::pin::Pin;

use crate::error::LlmError;
use crate::types::ChatResponse;

pub mod sse;

pub use sse::{DONE_MARKER, SseEventStream, sse_event_stream};

/// Chat Stream - Main interface for streaming responses
///
/// A pinned, boxed stream of incremental `ChatResponse`s. Dropping it cancels
/// the underlying request.
pub type ChatStream = Pin<Box<dyn Stream<Item = Result<ChatResponse, LlmError>> + Send>>;
