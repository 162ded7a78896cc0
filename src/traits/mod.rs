//! Capability traits
//!
//! - `ChatCapability`: blocking and streaming chat
//! - `FunctionCallback`: a function the model may call

pub mod chat;
pub mod function;

pub use chat::ChatCapability;
pub use function::FunctionCallback;
