//! Client-facing packet types

use super::placement::Placement;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A reference document already known when the answer starts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRef {
    /// Document identifier
    pub document_id: String,
    /// Display title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Source link
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

impl DocumentRef {
    pub fn new(document_id: impl Into<String>) -> Self {
        Self {
            document_id: document_id.into(),
            title: None,
            link: None,
        }
    }
}

/// Binds a citation number in the answer text to a document
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CitationInfo {
    /// 1-based citation number
    pub citation_number: usize,
    /// Cited document
    pub document_id: String,
}

impl CitationInfo {
    pub fn new(citation_number: usize, document_id: impl Into<String>) -> Self {
        Self {
            citation_number,
            document_id: document_id.into(),
        }
    }
}

/// A finalized, ready-to-execute tool invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallKickoff {
    /// Provider-supplied id, or a generated one
    pub tool_call_id: String,
    /// Name of the tool to call
    pub tool_name: String,
    /// Parsed arguments
    pub tool_args: Map<String, Value>,
    /// Ordering/grouping only, never identity
    pub placement: Placement,
}

impl ToolCallKickoff {
    /// Create a new kickoff
    pub fn new(
        tool_call_id: impl Into<String>,
        tool_name: impl Into<String>,
        tool_args: Map<String, Value>,
        placement: Placement,
    ) -> Self {
        Self {
            tool_call_id: tool_call_id.into(),
            tool_name: tool_name.into(),
            tool_args,
            placement,
        }
    }
}

/// Packet payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PacketObj {
    /// Reasoning section opened
    ReasoningStart,
    /// Reasoning text
    ReasoningDelta { reasoning: String },
    /// Reasoning section closed
    ReasoningDone,
    /// Answer section opened, optionally with documents already in play
    AnswerStart {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        final_documents: Option<Vec<DocumentRef>>,
    },
    /// Answer text
    AnswerDelta { content: String },
    /// Citation binding
    CitationInfo(CitationInfo),
    /// Finalized tool call
    ToolCallKickoff(ToolCallKickoff),
}

impl PacketObj {
    /// Snake-case packet kind, as serialized in the `type` tag
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ReasoningStart => "reasoning_start",
            Self::ReasoningDelta { .. } => "reasoning_delta",
            Self::ReasoningDone => "reasoning_done",
            Self::AnswerStart { .. } => "answer_start",
            Self::AnswerDelta { .. } => "answer_delta",
            Self::CitationInfo(_) => "citation_info",
            Self::ToolCallKickoff(_) => "tool_call_kickoff",
        }
    }
}

/// One client-facing packet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Packet {
    pub placement: Placement,
    pub obj: PacketObj,
}

impl Packet {
    pub fn new(placement: Placement, obj: PacketObj) -> Self {
        Self { placement, obj }
    }

    /// Kickoff packet, placed where the kickoff says
    pub fn tool_call(kickoff: ToolCallKickoff) -> Self {
        Self {
            placement: kickoff.placement,
            obj: PacketObj::ToolCallKickoff(kickoff),
        }
    }

    /// Serialize to a single JSON line
    pub fn to_json_line(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
