//! Model delta types and the per-delta building blocks of the turn engine.
//!
//! - [`Delta`] / [`ToolCallFragment`]: what the model source yields
//! - [`MarkupFilter`]: strips inline tool-call markup from visible text
//! - [`ToolCallAccumulator`]: merges sparse, index-keyed tool-call fragments

mod accumulator;
mod filter;
mod types;

pub use accumulator::ToolCallAccumulator;
pub use filter::MarkupFilter;
pub use types::{Delta, ToolCallFragment};

#[cfg(test)]
mod tests;
