//! Tool schemas, argument parsing and fallback tool-call extraction.

mod args;
mod fallback;
mod schema;

pub use args::{
    normalize_tool_args, parse_tool_args, sanitize, strip_nul, try_normalize_tool_args,
    try_parse_tool_args,
};
pub use fallback::FallbackExtractor;
pub use schema::{FunctionSchema, ToolChoice, ToolSchema};

/// Generate a tool call id for calls the provider did not identify
pub fn generate_tool_call_id() -> String {
    format!("call_{}", ulid::Ulid::new().to_string().to_lowercase())
}
