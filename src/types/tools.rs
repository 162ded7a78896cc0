//! Tool calling and function definition types

use serde::{Deserialize, Serialize};

/// A tool call emitted by the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Call id, when the provider assigns one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub r#type: String,
    pub function: FunctionCall,
}

impl ToolCall {
    /// Create a function tool call
    pub fn function(name: impl Into<String>, arguments: impl Into<String>) -> Self {
        Self {
            id: None,
            r#type: "function".to_string(),
            function: FunctionCall {
                name: name.into(),
                arguments: arguments.into(),
            },
        }
    }

    /// Parse the accumulated argument string as JSON.
    pub fn arguments_json(&self) -> Result<serde_json::Value, crate::error::LlmError> {
        if self.function.arguments.trim().is_empty() {
            return Ok(serde_json::Value::Object(Default::default()));
        }
        serde_json::from_str(&self.function.arguments).map_err(|e| {
            crate::error::LlmError::ParseError(format!(
                "Invalid arguments for tool call '{}': {e}",
                self.function.name
            ))
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    /// JSON-encoded arguments, exactly as produced by the model
    pub arguments: String,
}

/// Tool definition for function calling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tool {
    /// Tool type (usually "function")
    pub r#type: String,
    /// Function definition
    pub function: ToolFunction,
}

impl Tool {
    /// Create a new function tool
    pub fn function(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: serde_json::Value,
    ) -> Self {
        Self {
            r#type: "function".to_string(),
            function: ToolFunction {
                name: name.into(),
                description: description.into(),
                parameters,
            },
        }
    }
}

/// Tool function definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolFunction {
    /// Function name
    pub name: String,
    /// Function description
    pub description: String,
    /// JSON schema for function parameters
    pub parameters: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn arguments_json_parses_accumulated_fragments() {
        let call = ToolCall::function("lookup", r#"{"q":"x"}"#);
        assert_eq!(call.arguments_json().unwrap(), json!({"q": "x"}));
    }

    #[test]
    fn empty_arguments_parse_as_empty_object() {
        let call = ToolCall::function("now", "");
        assert_eq!(call.arguments_json().unwrap(), json!({}));
    }

    #[test]
    fn truncated_arguments_are_a_parse_error() {
        let call = ToolCall::function("lookup", r#"{"q":"#);
        assert!(matches!(
            call.arguments_json(),
            Err(crate::error::LlmError::ParseError(_))
        ));
    }
}
