//! DashScope chat options
//!
//! Options set on the model act as defaults; options passed with a prompt
//! override them field by field.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use super::models::DashScopeModel;
use super::types::{ResultFormat, ToolChoice};
use crate::error::LlmError;
use crate::traits::FunctionCallback;
use crate::types::Tool;

/// Default sampling temperature of a new model
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Chat options for DashScope models
#[derive(Clone, Default)]
pub struct DashScopeChatOptions {
    pub model: Option<String>,
    /// `message` (choices) or `text` (plain output)
    pub result_format: Option<ResultFormat>,
    pub seed: Option<u64>,
    pub max_tokens: Option<u32>,
    pub top_p: Option<f32>,
    pub top_k: Option<u32>,
    pub repetition_penalty: Option<f32>,
    pub presence_penalty: Option<f32>,
    pub temperature: Option<f32>,
    pub stop: Option<Vec<String>>,
    /// Let the model consult web search
    pub enable_search: Option<bool>,
    pub incremental_output: Option<bool>,
    pub tools: Option<Vec<Tool>>,
    pub tool_choice: Option<ToolChoice>,
    /// Callbacks registered with these options
    pub function_callbacks: Vec<Arc<dyn FunctionCallback>>,
    /// Names of registered functions to advertise to the model
    pub functions: HashSet<String>,
}

impl std::fmt::Debug for DashScopeChatOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DashScopeChatOptions")
            .field("model", &self.model)
            .field("result_format", &self.result_format)
            .field("seed", &self.seed)
            .field("max_tokens", &self.max_tokens)
            .field("top_p", &self.top_p)
            .field("top_k", &self.top_k)
            .field("repetition_penalty", &self.repetition_penalty)
            .field("presence_penalty", &self.presence_penalty)
            .field("temperature", &self.temperature)
            .field("stop", &self.stop)
            .field("enable_search", &self.enable_search)
            .field("incremental_output", &self.incremental_output)
            .field("tools", &self.tools)
            .field("tool_choice", &self.tool_choice)
            .field(
                "function_callbacks",
                &self
                    .function_callbacks
                    .iter()
                    .map(|cb| cb.name())
                    .collect::<Vec<_>>(),
            )
            .field("functions", &self.functions)
            .finish()
    }
}

impl DashScopeChatOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults used by a model built without explicit options
    pub fn model_defaults() -> Self {
        Self::new()
            .with_model(DashScopeModel::default())
            .with_temperature(DEFAULT_TEMPERATURE)
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub const fn with_result_format(mut self, result_format: ResultFormat) -> Self {
        self.result_format = Some(result_format);
        self
    }

    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub const fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub const fn with_top_p(mut self, top_p: f32) -> Self {
        self.top_p = Some(top_p);
        self
    }

    pub const fn with_top_k(mut self, top_k: u32) -> Self {
        self.top_k = Some(top_k);
        self
    }

    pub const fn with_repetition_penalty(mut self, penalty: f32) -> Self {
        self.repetition_penalty = Some(penalty);
        self
    }

    pub const fn with_presence_penalty(mut self, penalty: f32) -> Self {
        self.presence_penalty = Some(penalty);
        self
    }

    pub const fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_stop(mut self, stop: Vec<String>) -> Self {
        self.stop = Some(stop);
        self
    }

    pub const fn with_enable_search(mut self, enable: bool) -> Self {
        self.enable_search = Some(enable);
        self
    }

    pub const fn with_incremental_output(mut self, incremental: bool) -> Self {
        self.incremental_output = Some(incremental);
        self
    }

    pub fn with_tools(mut self, tools: Vec<Tool>) -> Self {
        self.tools = Some(tools);
        self
    }

    pub fn with_tool_choice(mut self, tool_choice: ToolChoice) -> Self {
        self.tool_choice = Some(tool_choice);
        self
    }

    /// Register a function callback
    pub fn with_function_callback(mut self, callback: Arc<dyn FunctionCallback>) -> Self {
        self.function_callbacks.push(callback);
        self
    }

    /// Enable a registered function by name
    pub fn with_function(mut self, name: impl Into<String>) -> Self {
        self.functions.insert(name.into());
        self
    }

    /// Field-wise merge: each field takes `runtime`'s value when set, else
    /// `defaults`'. Callbacks and enabled function names are kept from
    /// `runtime` only; see [`resolve_function_tools`] for how both sides'
    /// callbacks are combined.
    pub fn merge(runtime: Option<&Self>, defaults: &Self) -> Self {
        let Some(runtime) = runtime else {
            return defaults.clone();
        };
        Self {
            model: runtime.model.clone().or_else(|| defaults.model.clone()),
            result_format: runtime.result_format.or(defaults.result_format),
            seed: runtime.seed.or(defaults.seed),
            max_tokens: runtime.max_tokens.or(defaults.max_tokens),
            top_p: runtime.top_p.or(defaults.top_p),
            top_k: runtime.top_k.or(defaults.top_k),
            repetition_penalty: runtime.repetition_penalty.or(defaults.repetition_penalty),
            presence_penalty: runtime.presence_penalty.or(defaults.presence_penalty),
            temperature: runtime.temperature.or(defaults.temperature),
            stop: runtime.stop.clone().or_else(|| defaults.stop.clone()),
            enable_search: runtime.enable_search.or(defaults.enable_search),
            incremental_output: runtime.incremental_output.or(defaults.incremental_output),
            tools: runtime.tools.clone().or_else(|| defaults.tools.clone()),
            tool_choice: runtime
                .tool_choice
                .clone()
                .or_else(|| defaults.tool_choice.clone()),
            function_callbacks: runtime.function_callbacks.clone(),
            functions: runtime.functions.clone(),
        }
    }
}

/// Resolve the function tools to advertise for one request.
///
/// Default callbacks are registered first and runtime callbacks replace them
/// by name. Every runtime callback is enabled automatically; default
/// callbacks are enabled only when named in `functions` on either side.
/// Naming a function that is not registered is an error.
pub fn resolve_function_tools(
    runtime: Option<&DashScopeChatOptions>,
    defaults: &DashScopeChatOptions,
) -> Result<Vec<Tool>, LlmError> {
    let mut registry: HashMap<String, Arc<dyn FunctionCallback>> = HashMap::new();
    for callback in &defaults.function_callbacks {
        registry.insert(callback.name().to_string(), callback.clone());
    }

    let mut enabled: Vec<String> = Vec::new();

    if let Some(runtime) = runtime {
        for callback in &runtime.function_callbacks {
            registry.insert(callback.name().to_string(), callback.clone());
            enable(&mut enabled, callback.name());
        }
        let mut names: Vec<&String> = runtime.functions.iter().collect();
        names.sort();
        for name in names {
            enable(&mut enabled, name);
        }
    }
    let mut default_names: Vec<&String> = defaults.functions.iter().collect();
    default_names.sort();
    for name in default_names {
        enable(&mut enabled, name);
    }

    enabled
        .iter()
        .map(|name| {
            registry
                .get(name)
                .map(|callback| callback.to_tool())
                .ok_or_else(|| {
                    LlmError::InvalidParameter(format!(
                        "No function callback found for function name: {name}"
                    ))
                })
        })
        .collect()
}

fn enable(enabled: &mut Vec<String>, name: &str) {
    if !enabled.iter().any(|n| n == name) {
        enabled.push(name.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tool(name: &str) -> Arc<dyn FunctionCallback> {
        Arc::new(Tool::function(name, format!("{name} tool"), json!({"type": "object"})))
    }

    #[test]
    fn runtime_values_win_and_defaults_fill_gaps() {
        let defaults = DashScopeChatOptions::model_defaults()
            .with_top_k(50)
            .with_stop(vec!["END".into()]);
        let runtime = DashScopeChatOptions::new()
            .with_temperature(0.2)
            .with_model("qwen-max");

        let merged = DashScopeChatOptions::merge(Some(&runtime), &defaults);
        assert_eq!(merged.model.as_deref(), Some("qwen-max"));
        assert_eq!(merged.temperature, Some(0.2));
        assert_eq!(merged.top_k, Some(50));
        assert_eq!(merged.stop, Some(vec!["END".to_string()]));
        assert_eq!(merged.seed, None);
    }

    #[test]
    fn missing_runtime_options_yield_defaults() {
        let defaults = DashScopeChatOptions::model_defaults();
        let merged = DashScopeChatOptions::merge(None, &defaults);
        assert_eq!(merged.model.as_deref(), Some("qwen-turbo"));
        assert_eq!(merged.temperature, Some(DEFAULT_TEMPERATURE));
    }

    #[test]
    fn runtime_callbacks_are_enabled_automatically() {
        let defaults = DashScopeChatOptions::new().with_function_callback(tool("weather"));
        let runtime = DashScopeChatOptions::new().with_function_callback(tool("lookup"));

        let tools = resolve_function_tools(Some(&runtime), &defaults).unwrap();
        let names: Vec<_> = tools.iter().map(|t| t.function.name.as_str()).collect();
        assert_eq!(names, vec!["lookup"]);
    }

    #[test]
    fn default_callbacks_are_enabled_by_name() {
        let defaults = DashScopeChatOptions::new()
            .with_function_callback(tool("weather"))
            .with_function_callback(tool("clock"));
        let runtime = DashScopeChatOptions::new().with_function("weather");

        let tools = resolve_function_tools(Some(&runtime), &defaults).unwrap();
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0].function.name, "weather");
        assert_eq!(tools[0].function.description, "weather tool");
    }

    #[test]
    fn unknown_function_name_is_rejected() {
        let defaults = DashScopeChatOptions::new().with_function("missing");
        let err = resolve_function_tools(None, &defaults).unwrap_err();
        assert!(matches!(err, LlmError::InvalidParameter(_)));
    }

    #[test]
    fn debug_lists_callback_names() {
        let options = DashScopeChatOptions::new().with_function_callback(tool("lookup"));
        assert!(format!("{options:?}").contains("lookup"));
    }
}
