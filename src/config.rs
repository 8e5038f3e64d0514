//! Per-turn configuration.

use crate::packets::{DocumentRef, Placement};
use crate::tools::ToolChoice;
use serde::{Deserialize, Serialize};

/// Reasoning effort hint for reasoning-capable models
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReasoningEffort {
    Low,
    Medium,
    High,
}

/// Generation parameters forwarded to the model client
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning_effort: Option<ReasoningEffort>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parallel_tool_calls: Option<bool>,
}

/// Policy and placement for one turn.
///
/// Every field has a default, so a partial JSON document is a valid config:
///
/// ```rust
/// use turn_stream::{TurnConfig, ToolChoice};
///
/// let config = TurnConfig::from_json_str(r#"{"tool_choice": "required"}"#).unwrap();
/// assert_eq!(config.tool_choice, ToolChoice::Required);
/// assert!(!config.deep_research);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TurnConfig {
    /// Tool-choice policy sent to the model
    pub tool_choice: ToolChoice,
    /// Deep-research mode: with mandatory tool choice, all content renders as reasoning
    pub deep_research: bool,
    /// Starting placement (turn, tab, sub-turn)
    pub placement: Placement,
    /// Pin every tool call to this tab (nested calls)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fixed_tab_index: Option<usize>,
    /// Documents already known when the answer starts
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_documents: Option<Vec<DocumentRef>>,
    /// Parameters forwarded to the model client
    pub generation: GenerationParams,
}

impl TurnConfig {
    /// Default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from a JSON document
    pub fn from_json_str(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Set the tool-choice policy
    pub fn with_tool_choice(mut self, tool_choice: ToolChoice) -> Self {
        self.tool_choice = tool_choice;
        self
    }

    /// Enable or disable deep-research mode
    pub fn with_deep_research(mut self, deep_research: bool) -> Self {
        self.deep_research = deep_research;
        self
    }

    /// Set the starting placement
    pub fn with_placement(mut self, placement: Placement) -> Self {
        self.placement = placement;
        self
    }

    /// Pin tool calls to one tab
    pub fn with_fixed_tab_index(mut self, tab_index: usize) -> Self {
        self.fixed_tab_index = Some(tab_index);
        self
    }

    /// Set documents carried on the answer start packet
    pub fn with_final_documents(mut self, documents: Vec<DocumentRef>) -> Self {
        self.final_documents = Some(documents);
        self
    }

    /// Set generation parameters
    pub fn with_generation(mut self, generation: GenerationParams) -> Self {
        self.generation = generation;
        self
    }

    /// Whether answer content is rendered as reasoning for this turn
    pub fn content_is_reasoning(&self) -> bool {
        self.deep_research && self.tool_choice.is_required()
    }
}
