//! Type definitions for turn results and partial-state recording.

use crate::history::{HistoryMessage, HistoryToolCall};
use crate::packets::{CitationInfo, Placement, ToolCallKickoff};
use serde::{Deserialize, Serialize};

/// Observable phase of a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnPhase {
    /// Nothing emitted yet, or only tool-call fragments merged
    Idle,
    /// A reasoning section is open
    Reasoning,
    /// The answer section is open
    Answer,
    /// The stream is exhausted (or failed); no more packets follow
    Done,
}

/// Everything a finished turn produced besides its packets
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TurnResult {
    /// Accumulated reasoning text
    pub reasoning: Option<String>,
    /// Accumulated answer text, as emitted to the client
    pub answer: Option<String>,
    /// Accumulated content before markup filtering
    pub raw_answer: Option<String>,
    /// Finalized tool calls, `None` when there are none
    pub tool_calls: Option<Vec<ToolCallKickoff>>,
    /// Whether a reasoning section was opened during the turn
    pub has_reasoned: bool,
    /// Citations emitted during the turn
    pub citations: Vec<CitationInfo>,
    /// Last provider usage payload seen, passed through untouched
    pub usage: Option<serde_json::Value>,
    /// Time from engine creation to the answer section opening
    pub pre_answer_processing_ms: Option<i64>,
    /// Placement after the turn; callers continue from here
    pub placement: Placement,
}

impl TurnResult {
    /// Assistant history message for the next model invocation
    pub fn to_history_message(&self) -> HistoryMessage {
        let tool_calls = self
            .tool_calls
            .iter()
            .flatten()
            .cloned()
            .map(HistoryToolCall::from)
            .collect();
        HistoryMessage::assistant_with_tools(self.answer.clone().unwrap_or_default(), tool_calls)
    }
}

/// Running turn state handed to a [`TurnStateRecorder`]
#[derive(Debug, Clone, Copy)]
pub struct TurnSnapshot<'s> {
    pub reasoning: &'s str,
    pub answer: &'s str,
    /// Set once the answer section has opened
    pub pre_answer_processing: Option<chrono::Duration>,
}

/// Receives partial turn state for persistence or resumption.
///
/// Called after every change to the reasoning or answer text.
pub trait TurnStateRecorder {
    fn record(&mut self, snapshot: &TurnSnapshot<'_>);
}
