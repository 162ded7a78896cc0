//! Response metadata for DashScope calls

use super::types;
use crate::types::{ResponseMetadata, Usage};

/// Provider name recorded in response metadata
pub const PROVIDER_NAME: &str = "dashscope";

impl From<types::Usage> for Usage {
    fn from(usage: types::Usage) -> Self {
        let prompt_tokens = usage.input_tokens.unwrap_or(0);
        let completion_tokens = usage.output_tokens.unwrap_or(0);
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: usage
                .total_tokens
                .unwrap_or(prompt_tokens.saturating_add(completion_tokens)),
        }
    }
}

/// Metadata for a completion or chunk that reported usage.
pub fn response_metadata(
    request_id: Option<&str>,
    model: &str,
    usage: types::Usage,
) -> ResponseMetadata {
    ResponseMetadata {
        id: request_id.map(str::to_string),
        model: Some(model.to_string()),
        usage: usage.into(),
        provider: PROVIDER_NAME.to_string(),
    }
}
