//! `DashScope` Provider Implementation
//!
//! Chat models served by Alibaba Cloud DashScope (the Qwen family) through
//! the native `text-generation/generation` endpoint.
//!
//! - `api`: low-level HTTP client (JSON completion and SSE chunk stream)
//! - `merger`: reassembly of streamed tool-call deltas
//! - `chat`: the `ChatCapability` implementation
//! - `options`, `config`, `builder`: configuration surface

pub mod api;
pub mod builder;
pub mod chat;
pub mod config;
pub mod errors;
pub mod merger;
pub mod metadata;
pub mod models;
pub mod options;
pub mod types;
pub mod utils;

pub use api::{DEFAULT_BASE_URL, DashScopeApi};
pub use builder::DashScopeBuilder;
pub use chat::DashScopeChatModel;
pub use config::DashScopeConfig;
pub use merger::{ChunkMerger, ChunkStream, aggregate_tool_calls};
pub use models::DashScopeModel;
pub use options::DashScopeChatOptions;
pub use types::{ResultFormat, ToolChoice};
