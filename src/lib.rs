//! Streaming turn protocol engine
//!
//! This crate turns the incremental output of a chat model (a stream of
//! [`Delta`]s) into an ordered sequence of client-facing [`Packet`]s and a
//! final [`TurnResult`]. It is provider-agnostic: any source that yields
//! deltas can drive it, synchronously through [`ModelClient`] or
//! asynchronously through [`drive_stream`].
//!
//! ## What a turn does
//!
//! 1. **Sections**: reasoning text opens a reasoning section, answer text
//!    closes it (advancing the turn index) and opens the answer section
//! 2. **Markup filtering**: inline `<function_calls>` blocks never reach the
//!    client, even when split across chunks
//! 3. **Tool calls**: fragments are merged per index and finalized after the
//!    stream ends; when a tool call was required but none arrived, calls are
//!    recovered from the free text
//! 4. **Citations**: answer text is routed through an optional
//!    [`CitationPipeline`] that emits citation bindings in-band
//!
//! ## Example
//!
//! ```rust
//! use turn_stream::{Delta, PacketObj, TurnConfig, TurnStreamEngine};
//!
//! let tools: Vec<turn_stream::ToolSchema> = Vec::new();
//! let mut engine = TurnStreamEngine::new(TurnConfig::default(), &tools);
//! let mut packets = Vec::new();
//! packets.extend(engine.next_delta(Delta::reasoning("Thinking...")));
//! packets.extend(engine.next_delta(Delta::content("The answer is 42.")));
//!
//! let (tail, result) = engine.finish();
//! packets.extend(tail);
//!
//! assert!(matches!(packets[0].obj, PacketObj::ReasoningStart));
//! assert!(result.has_reasoned);
//! assert_eq!(result.answer.as_deref(), Some("The answer is 42."));
//! ```

pub mod citations;
pub mod config;
pub mod engine;
pub mod error;
pub mod history;
pub mod packets;
pub mod streaming;
pub mod tools;

pub use citations::{CitationOutput, CitationPipeline, MarkerCitationPipeline};
pub use config::{GenerationParams, ReasoningEffort, TurnConfig};
#[cfg(feature = "streaming")]
pub use engine::drive_stream;
pub use engine::{
    run_turn, start_turn, ModelClient, ModelRequest, TurnPackets, TurnPhase, TurnResult,
    TurnSnapshot, TurnStateRecorder, TurnStreamEngine,
};
pub use error::{CitationError, HistoryError, ParseError, TurnError};
pub use history::{HistoryMessage, HistoryToolCall, MessageRole};
pub use packets::{
    CitationInfo, DocumentRef, Packet, PacketObj, PacketSink, Placement, ToolCallKickoff,
};
pub use streaming::{Delta, ToolCallFragment};
pub use tools::{ToolChoice, ToolSchema};
