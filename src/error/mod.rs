//! Error Handling Module
//!
//! Core error types (`LlmError`, `ErrorCategory`) and conversions from the
//! transport and serialization errors the client encounters.
//!
//! # Example
//!
//! ```rust,ignore
//! use siumai_dashscope::error::{LlmError, ErrorCategory};
//!
//! let error = LlmError::api_error(404, "Not found");
//! assert_eq!(error.category(), ErrorCategory::Client);
//! assert!(!error.is_retryable());
//! ```

mod conversions;
pub mod types;

pub use types::*;
