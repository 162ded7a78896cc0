//! Function callbacks for tool calling

use crate::types::Tool;

/// A function the model may call.
///
/// Callbacks are registered on chat options and advertised to the model as
/// tools. Executing them is left to the caller.
pub trait FunctionCallback: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// JSON schema of the function's input
    fn input_type_schema(&self) -> serde_json::Value;

    /// The tool definition sent to the model
    fn to_tool(&self) -> Tool {
        Tool::function(self.name(), self.description(), self.input_type_schema())
    }
}

impl FunctionCallback for Tool {
    fn name(&self) -> &str {
        &self.function.name
    }

    fn description(&self) -> &str {
        &self.function.description
    }

    fn input_type_schema(&self) -> serde_json::Value {
        self.function.parameters.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn tool_is_its_own_callback() {
        let tool = Tool::function(
            "lookup",
            "Look something up",
            json!({"type": "object", "properties": {"q": {"type": "string"}}}),
        );
        let callback: &dyn FunctionCallback = &tool;
        assert_eq!(callback.name(), "lookup");
        assert_eq!(callback.to_tool(), tool);
    }
}
