//! Tool definitions offered to the model

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Function part of a tool definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionSchema {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// JSON schema of the arguments object
    #[serde(default)]
    pub parameters: Value,
}

/// OpenAI-compatible tool definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSchema {
    #[serde(rename = "type", default = "default_tool_type")]
    pub r#type: String,
    pub function: FunctionSchema,
}

fn default_tool_type() -> String {
    "function".to_string()
}

impl ToolSchema {
    /// Create a function tool
    pub fn new(name: impl Into<String>, description: impl Into<String>, parameters: Value) -> Self {
        Self {
            r#type: default_tool_type(),
            function: FunctionSchema {
                name: name.into(),
                description: description.into(),
                parameters,
            },
        }
    }

    /// Tool name
    pub fn name(&self) -> &str {
        &self.function.name
    }

    /// Declared argument properties, if the schema has any
    pub fn properties(&self) -> Option<&Map<String, Value>> {
        self.function.parameters.get("properties")?.as_object()
    }

    /// Names listed under `required`
    pub fn required_params(&self) -> Vec<&str> {
        self.function
            .parameters
            .get("required")
            .and_then(Value::as_array)
            .map(|required| required.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    /// Whether `key` is a declared property (or required parameter)
    pub fn declares(&self, key: &str) -> bool {
        self.properties().is_some_and(|props| props.contains_key(key))
            || self.required_params().contains(&key)
    }
}

/// Tool-choice policy sent with the request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolChoice {
    /// Model decides
    #[default]
    Auto,
    /// Model must call a tool
    Required,
    /// Tools are disabled
    None,
}

impl ToolChoice {
    pub fn is_required(&self) -> bool {
        matches!(self, Self::Required)
    }
}
