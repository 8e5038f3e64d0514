//! The streaming turn engine.
//!
//! A turn consumes one model response (a finite sequence of [`Delta`]s) and
//! produces an ordered packet sequence plus a [`TurnResult`]:
//!
//! ```text
//! Idle -> Reasoning <-> (closed) -> Answer -> finish() -> Done
//! ```
//!
//! Closing a reasoning section advances the placement (turn index, or
//! sub-turn index for nested calls). Tool calls are only emitted from
//! `finish()`, after the model stream is exhausted.
//!
//! [`Delta`]: crate::streaming::Delta

mod runner;
mod state;
mod types;

#[cfg(feature = "streaming")]
pub use runner::drive_stream;
pub use runner::{run_turn, start_turn, ModelClient, ModelRequest, TurnPackets};
pub use state::TurnStreamEngine;
pub use types::{TurnPhase, TurnResult, TurnSnapshot, TurnStateRecorder};
