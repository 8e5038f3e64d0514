//! Error types for the turn engine.
//!
//! Only [`TurnError`] ever leaves the engine. The other errors describe
//! malformed provider output or collaborator failures and are degraded to
//! empty results where they occur.

use thiserror::Error;

/// Failure to interpret model-produced text (tool arguments, fallback candidates).
#[derive(Debug, Error)]
pub enum ParseError {
    /// Input was empty after sanitizing
    #[error("input is empty")]
    Empty,
    /// Input was not valid JSON
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// JSON parsed, but did not resolve to an object
    #[error("expected a JSON object, found {0}")]
    NotAnObject(&'static str),
}

/// Failure reported by a [`CitationPipeline`](crate::citations::CitationPipeline).
#[derive(Debug, Error)]
#[error("citation pipeline failed: {message}")]
pub struct CitationError {
    pub message: String,
}

impl CitationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Caller defects while translating loosely typed history into model input.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HistoryError {
    /// Message kind the translation does not know about
    #[error("unexpected message type: {0}")]
    UnknownMessageType(String),
    /// Required field absent for the given message kind
    #[error("message of type {kind} is missing field `{field}`")]
    MissingField { kind: String, field: &'static str },
}

/// Errors that terminate a turn without a [`TurnResult`](crate::engine::TurnResult).
#[derive(Debug, Error)]
pub enum TurnError<E> {
    /// The model client could not open a delta stream
    #[error("model request failed: {0}")]
    Request(E),
    /// The delta stream failed mid-turn
    #[error("upstream model source failed: {0}")]
    Upstream(E),
}

impl<E> TurnError<E> {
    /// The underlying collaborator error
    pub fn into_inner(self) -> E {
        match self {
            Self::Request(e) | Self::Upstream(e) => e,
        }
    }
}
