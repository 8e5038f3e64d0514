//! Model input history.
//!
//! History arrives already resolved (trimmed, files injected) and is handed to
//! the model client as-is. The only work done here is a strict translation
//! from loosely typed JSON messages: an unknown message type is a caller
//! defect and fails immediately.

use crate::error::HistoryError;
use crate::packets::ToolCallKickoff;
use crate::tools::parse_tool_args;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::str::FromStr;

/// Message role in a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// System-level instructions
    System,
    /// User input
    User,
    /// Assistant response
    Assistant,
    /// Tool execution result
    Tool,
}

impl MessageRole {
    /// Convert to string representation
    pub fn as_str(&self) -> &str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::Tool => "tool",
        }
    }
}

impl std::fmt::Display for MessageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for MessageRole {
    type Err = HistoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "system" => Ok(Self::System),
            "user" => Ok(Self::User),
            "assistant" => Ok(Self::Assistant),
            "tool" => Ok(Self::Tool),
            other => Err(HistoryError::UnknownMessageType(other.to_string())),
        }
    }
}

/// A tool call made by the assistant in an earlier turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryToolCall {
    pub id: String,
    pub name: String,
    pub arguments: Map<String, Value>,
}

impl From<ToolCallKickoff> for HistoryToolCall {
    fn from(kickoff: ToolCallKickoff) -> Self {
        Self {
            id: kickoff.tool_call_id,
            name: kickoff.tool_name,
            arguments: kickoff.tool_args,
        }
    }
}

/// One message of model input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryMessage {
    pub role: MessageRole,
    pub content: String,
    /// Tool calls requested by an assistant message
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<HistoryToolCall>,
    /// Tool call this message answers (tool role only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl HistoryMessage {
    fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            tool_calls: Vec::new(),
            tool_call_id: None,
        }
    }

    /// Create a system message
    pub fn system(text: impl Into<String>) -> Self {
        Self::new(MessageRole::System, text)
    }

    /// Create a user message
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(MessageRole::User, text)
    }

    /// Create an assistant message
    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, text)
    }

    /// Create an assistant message with tool calls
    pub fn assistant_with_tools(text: impl Into<String>, tool_calls: Vec<HistoryToolCall>) -> Self {
        Self {
            tool_calls,
            ..Self::new(MessageRole::Assistant, text)
        }
    }

    /// Create a tool result message
    pub fn tool_result(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            tool_call_id: Some(tool_call_id.into()),
            ..Self::new(MessageRole::Tool, content)
        }
    }

    /// Translate an OpenAI-style JSON message.
    ///
    /// Block content (`[{"type": "text", "text": ...}]`) is joined with
    /// newlines; tool-call arguments are parsed best-effort.
    pub fn from_value(value: &Value) -> Result<Self, HistoryError> {
        let role = value
            .get("role")
            .and_then(Value::as_str)
            .ok_or_else(|| HistoryError::MissingField {
                kind: "message".to_string(),
                field: "role",
            })?
            .parse::<MessageRole>()?;

        let content = match value.get("content") {
            Some(Value::String(text)) => text.clone(),
            Some(Value::Array(blocks)) => blocks
                .iter()
                .filter_map(|block| block.get("text").and_then(Value::as_str))
                .collect::<Vec<_>>()
                .join("\n"),
            _ => String::new(),
        };

        let mut message = Self::new(role, content);
        match role {
            MessageRole::Tool => {
                let id = value
                    .get("tool_call_id")
                    .and_then(Value::as_str)
                    .ok_or_else(|| HistoryError::MissingField {
                        kind: role.to_string(),
                        field: "tool_call_id",
                    })?;
                message.tool_call_id = Some(id.to_string());
            }
            MessageRole::Assistant => {
                if let Some(calls) = value.get("tool_calls").and_then(Value::as_array) {
                    message.tool_calls = calls.iter().filter_map(history_tool_call).collect();
                }
            }
            MessageRole::System | MessageRole::User => {}
        }
        Ok(message)
    }
}

fn history_tool_call(value: &Value) -> Option<HistoryToolCall> {
    let function = value.get("function")?;
    let arguments = match function.get("arguments") {
        Some(Value::String(raw)) => parse_tool_args(raw),
        Some(Value::Object(map)) => map.clone(),
        _ => Map::new(),
    };
    Some(HistoryToolCall {
        id: value.get("id")?.as_str()?.to_string(),
        name: function.get("name")?.as_str()?.to_string(),
        arguments,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packets::Placement;
    use serde_json::json;

    #[test]
    fn test_message_creation() {
        let msg = HistoryMessage::system("You are a helpful assistant");
        assert_eq!(msg.role, MessageRole::System);
        assert_eq!(msg.content, "You are a helpful assistant");

        let msg = HistoryMessage::tool_result("call_1", "72F");
        assert_eq!(msg.role, MessageRole::Tool);
        assert_eq!(msg.tool_call_id.as_deref(), Some("call_1"));
    }

    #[test]
    fn test_role_string_conversion() {
        for role in [
            MessageRole::System,
            MessageRole::User,
            MessageRole::Assistant,
            MessageRole::Tool,
        ] {
            assert_eq!(role.as_str().parse::<MessageRole>().unwrap(), role);
        }
    }

    #[test]
    fn test_unknown_message_type_is_error() {
        let err = HistoryMessage::from_value(&json!({"role": "developer", "content": "x"})).unwrap_err();
        assert_eq!(err, HistoryError::UnknownMessageType("developer".to_string()));
    }

    #[test]
    fn test_tool_message_requires_call_id() {
        let err = HistoryMessage::from_value(&json!({"role": "tool", "content": "x"})).unwrap_err();
        assert!(matches!(
            err,
            HistoryError::MissingField {
                field: "tool_call_id",
                ..
            }
        ));
    }

    #[test]
    fn test_assistant_message_with_tool_calls() {
        let msg = HistoryMessage::from_value(&json!({
            "role": "assistant",
            "content": [{"type": "text", "text": "Searching"}, {"type": "text", "text": "now"}],
            "tool_calls": [{
                "id": "call_7",
                "type": "function",
                "function": {"name": "search", "arguments": "{\"q\": \"rust\"}"}
            }]
        }))
        .unwrap();

        assert_eq!(msg.content, "Searching\nnow");
        assert_eq!(msg.tool_calls.len(), 1);
        assert_eq!(msg.tool_calls[0].name, "search");
        assert_eq!(msg.tool_calls[0].arguments["q"], "rust");
    }

    #[test]
    fn test_kickoff_converts_to_history_call() {
        let mut args = Map::new();
        args.insert("q".to_string(), json!("x"));
        let kickoff = ToolCallKickoff::new("call_1", "search", args, Placement::new(2));

        let call = HistoryToolCall::from(kickoff);
        assert_eq!(call.id, "call_1");
        assert_eq!(call.arguments["q"], "x");
    }
}
