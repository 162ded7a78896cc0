//! # siumai-dashscope - DashScope chat models for Rust
//!
//! A client for Alibaba Cloud DashScope (Qwen) chat models behind a
//! provider-neutral chat interface.
//!
#![deny(unsafe_code)]

//! ## Features
//!
//! - **Blocking and streaming chat** through the `ChatCapability` trait.
//! - **Tool-call reassembly**: streamed function-call deltas are merged into
//!   complete calls before they reach the caller.
//! - **Layered options**: model defaults overridden per prompt, field by field.
//! - **Retry**: exponential backoff on rate limits, timeouts and 5xx responses.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use siumai_dashscope::prelude::*;
//! use futures_util::StreamExt;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let model = DashScopeChatModel::builder()
//!         .api_key("your-api-key")
//!         .model("qwen-plus")
//!         .build()?;
//!
//!     let response = model.chat(Prompt::from("Hello, world!")).await?;
//!     println!("{}", response.content_text().unwrap_or_default());
//!
//!     let mut stream = model.chat_stream(Prompt::from("Tell me a story")).await?;
//!     while let Some(part) = stream.next().await {
//!         print!("{}", part?.content_text().unwrap_or_default());
//!     }
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod providers;
pub mod retry;
pub mod retry_api;
pub mod streaming;
pub mod traits;
pub mod types;
pub mod utils;

pub use error::{ErrorCategory, LlmError};
pub use providers::dashscope::{
    DashScopeBuilder, DashScopeChatModel, DashScopeChatOptions, DashScopeConfig, DashScopeModel,
};
pub use streaming::ChatStream;
pub use traits::{ChatCapability, FunctionCallback};
pub use types::{ChatMessage, ChatResponse, Prompt};

/// Common imports
pub mod prelude {
    pub use crate::error::{ErrorCategory, LlmError};
    pub use crate::providers::dashscope::{
        DashScopeBuilder, DashScopeChatModel, DashScopeChatOptions, DashScopeConfig,
        DashScopeModel, ResultFormat, ToolChoice,
    };
    pub use crate::retry_api::*;
    pub use crate::streaming::ChatStream;
    pub use crate::traits::{ChatCapability, FunctionCallback};
    pub use crate::types::{
        ChatMessage, ChatResponse, FinishReason, Generation, HttpConfig, Media, MessageRole,
        Prompt, ResponseMetadata, Tool, ToolCall, Usage,
    };
}
