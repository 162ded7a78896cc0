//! Provider-neutral types shared by the chat abstraction

pub mod chat;
pub mod http;
pub mod response;
pub mod tools;

pub use chat::*;
pub use http::*;
pub use response::*;
pub use tools::*;
