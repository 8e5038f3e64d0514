//! Packet placement (ordering / UI grouping metadata)

use serde::{Deserialize, Serialize};

/// Where a packet belongs in the rendered turn.
///
/// Placement is used purely for ordering and grouping; it never identifies
/// a tool call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Placement {
    /// Turn index, advanced once per closed reasoning section
    pub turn_index: usize,
    /// Tab (parallel tool call slot) within the turn
    #[serde(default)]
    pub tab_index: usize,
    /// Sub-turn index when running nested calls inside one turn
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_turn_index: Option<usize>,
}

impl Placement {
    /// Placement at the given turn, first tab, no sub-turn
    pub fn new(turn_index: usize) -> Self {
        Self {
            turn_index,
            tab_index: 0,
            sub_turn_index: None,
        }
    }

    /// Placement for a nested call
    pub fn nested(turn_index: usize, sub_turn_index: usize) -> Self {
        Self {
            turn_index,
            tab_index: 0,
            sub_turn_index: Some(sub_turn_index),
        }
    }

    /// Same turn/sub-turn, different tab
    pub fn with_tab(mut self, tab_index: usize) -> Self {
        self.tab_index = tab_index;
        self
    }

    /// Advance past a closed reasoning section.
    ///
    /// Bumps the sub-turn index when one is tracked, the turn index otherwise.
    pub fn advance(&mut self) {
        match self.sub_turn_index.as_mut() {
            Some(sub) => *sub += 1,
            None => self.turn_index += 1,
        }
    }
}
