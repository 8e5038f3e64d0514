//! Type definitions for model deltas.

use serde::{Deserialize, Serialize};

/// One incremental unit of model output.
///
/// A delta may carry any combination of answer text, reasoning text and
/// tool-call fragments. Provider usage metadata rides along untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Delta {
    /// Answer text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Reasoning ("thinking") text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning_content: Option<String>,
    /// Partial tool calls, each tagged with its index
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCallFragment>,
    /// Opaque usage/telemetry payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<serde_json::Value>,
}

impl Delta {
    /// Create a delta carrying answer text
    pub fn content(text: impl Into<String>) -> Self {
        Self {
            content: Some(text.into()),
            ..Self::default()
        }
    }

    /// Create a delta carrying reasoning text
    pub fn reasoning(text: impl Into<String>) -> Self {
        Self {
            reasoning_content: Some(text.into()),
            ..Self::default()
        }
    }

    /// Create a delta carrying tool-call fragments
    pub fn tool_calls(fragments: Vec<ToolCallFragment>) -> Self {
        Self {
            tool_calls: fragments,
            ..Self::default()
        }
    }

    /// Create a delta carrying only usage metadata
    pub fn usage(usage: serde_json::Value) -> Self {
        Self {
            usage: Some(usage),
            ..Self::default()
        }
    }

    /// Answer text, if present and non-empty
    pub fn text(&self) -> Option<&str> {
        self.content.as_deref().filter(|s| !s.is_empty())
    }

    /// Reasoning text, if present and non-empty
    pub fn reasoning_text(&self) -> Option<&str> {
        self.reasoning_content.as_deref().filter(|s| !s.is_empty())
    }

    /// True when the delta has no content, reasoning or tool calls
    pub fn is_empty(&self) -> bool {
        self.text().is_none() && self.reasoning_text().is_none() && self.tool_calls.is_empty()
    }
}

/// Partial data for one tool call, keyed by `index`.
///
/// Fragments sharing an index are merged: `id`/`name` overwrite when present,
/// `arguments` are concatenated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCallFragment {
    pub index: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arguments: Option<String>,
}

impl ToolCallFragment {
    /// Create an empty fragment for the given index
    pub fn new(index: usize) -> Self {
        Self {
            index,
            ..Self::default()
        }
    }

    /// Set the tool call id
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set the function name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set an arguments fragment
    pub fn with_arguments(mut self, arguments: impl Into<String>) -> Self {
        self.arguments = Some(arguments.into());
        self
    }
}
