//! Tool-call fragment accumulator.

use super::types::ToolCallFragment;
use crate::packets::{Placement, ToolCallKickoff};
use crate::tools::{generate_tool_call_id, parse_tool_args};
use std::collections::BTreeMap;
use tracing::{debug, trace};

/// A tool call under construction
#[derive(Debug, Clone)]
struct PendingToolCall {
    id: String,
    name: String,
    arguments: String,
}

/// Merges per-index tool-call fragments into complete invocations.
///
/// Indices may be sparse (Anthropic puts tool_use at index 1 when index 0 is
/// a text block), so entries are keyed by index rather than stored densely.
/// `BTreeMap` keeps finalization in index order.
#[derive(Debug, Default)]
pub struct ToolCallAccumulator {
    calls: BTreeMap<usize, PendingToolCall>,
}

impl ToolCallAccumulator {
    /// Create a new accumulator
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge one fragment into the entry at its index.
    ///
    /// The first fragment for an index creates the entry with a generated
    /// fallback id. `id` and `name` overwrite only when non-empty; argument
    /// text is always appended.
    pub fn merge(&mut self, fragment: ToolCallFragment) {
        trace!(index = fragment.index, "merging tool-call fragment");
        let call = self
            .calls
            .entry(fragment.index)
            .or_insert_with(|| PendingToolCall {
                id: generate_tool_call_id(),
                name: String::new(),
                arguments: String::new(),
            });

        if let Some(id) = fragment.id.filter(|id| !id.is_empty()) {
            call.id = id;
        }
        if let Some(name) = fragment.name.filter(|name| !name.is_empty()) {
            call.name = name;
        }
        if let Some(arguments) = fragment.arguments {
            call.arguments.push_str(&arguments);
        }
    }

    /// Number of indices seen so far
    pub fn len(&self) -> usize {
        self.calls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    /// Turn accumulated entries into kickoffs, in index order.
    ///
    /// Entries without both an id and a name are dropped. Each kickoff gets
    /// the tab of its position among the accumulated entries, unless
    /// `fixed_tab_index` pins every kickoff to one tab (nested calls).
    pub fn finalize(self, placement: Placement, fixed_tab_index: Option<usize>) -> Vec<ToolCallKickoff> {
        let total = self.calls.len();
        let kickoffs: Vec<ToolCallKickoff> = self
            .calls
            .into_values()
            .enumerate()
            .filter(|(_, call)| !call.id.is_empty() && !call.name.is_empty())
            .map(|(position, call)| {
                let tab_index = fixed_tab_index.unwrap_or(position);
                ToolCallKickoff::new(
                    call.id,
                    call.name,
                    parse_tool_args(&call.arguments),
                    placement.with_tab(tab_index),
                )
            })
            .collect();

        if kickoffs.len() < total {
            debug!(
                dropped = total - kickoffs.len(),
                "dropping tool-call fragments without a name"
            );
        }
        kickoffs
    }
}
