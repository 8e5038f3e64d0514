//! Tool-argument parsing.
//!
//! Providers are inconsistent about how they encode tool arguments: plain JSON
//! objects, JSON objects whose values are JSON strings, or whole documents
//! that were encoded twice. Everything here resolves to a string-keyed map and
//! degrades to an empty one on failure.

use crate::error::ParseError;
use serde_json::{Map, Value};
use std::borrow::Cow;
use tracing::warn;

/// Remove NUL characters and unpaired UTF-16 surrogate escapes from JSON text.
///
/// Valid surrogate pairs (`\ud83d\ude00`) are kept; `\u0000` is removed along
/// with raw NUL characters.
pub fn sanitize(text: &str) -> Cow<'_, str> {
    if !text.contains('\0') && !text.contains("\\u") {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find(['\\', '\0']) {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        if tail.starts_with('\0') {
            rest = &tail[1..];
            continue;
        }

        match unicode_escape(tail) {
            Some(0) => rest = &tail[6..],
            Some(code) if is_high_surrogate(code) => match unicode_escape(&tail[6..]) {
                Some(low) if is_low_surrogate(low) => {
                    out.push_str(&tail[..12]);
                    rest = &tail[12..];
                }
                _ => rest = &tail[6..],
            },
            Some(code) if is_low_surrogate(code) => rest = &tail[6..],
            Some(_) => {
                out.push_str(&tail[..6]);
                rest = &tail[6..];
            }
            None => {
                // Any other escape: keep the backslash and the escaped char as a pair
                out.push('\\');
                let mut chars = tail[1..].chars();
                match chars.next() {
                    Some('\0') | None => {}
                    Some(c) => out.push(c),
                }
                rest = chars.as_str();
            }
        }
    }
    out.push_str(rest);
    Cow::Owned(out)
}

/// Strip NUL characters from free text
pub fn strip_nul(text: &str) -> Cow<'_, str> {
    if text.contains('\0') {
        Cow::Owned(text.replace('\0', ""))
    } else {
        Cow::Borrowed(text)
    }
}

fn unicode_escape(s: &str) -> Option<u32> {
    let hex = s.strip_prefix("\\u")?.get(..4)?;
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(hex, 16).ok()
}

fn is_high_surrogate(code: u32) -> bool {
    (0xD800..=0xDBFF).contains(&code)
}

fn is_low_surrogate(code: u32) -> bool {
    (0xDC00..=0xDFFF).contains(&code)
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn looks_like_json_container(text: &str) -> bool {
    let trimmed = text.trim();
    (trimmed.starts_with('{') && trimmed.ends_with('}'))
        || (trimmed.starts_with('[') && trimmed.ends_with(']'))
}

/// Replace string values that hold JSON objects/arrays with their parsed form.
///
/// Strings that merely look like JSON but fail to parse are left as-is.
fn expand_nested_json(map: &mut Map<String, Value>) {
    for value in map.values_mut() {
        let replacement = match value {
            Value::String(text) if looks_like_json_container(text) => {
                serde_json::from_str::<Value>(sanitize(text).trim()).ok()
            }
            Value::String(text) => {
                if text.contains('\0') {
                    *text = text.replace('\0', "");
                }
                None
            }
            Value::Object(inner) => {
                expand_nested_json(inner);
                None
            }
            _ => None,
        };

        if let Some(mut parsed) = replacement {
            if let Value::Object(inner) = &mut parsed {
                expand_nested_json(inner);
            }
            *value = parsed;
        }
    }
}

fn parse_json_text(text: &str) -> Result<Value, ParseError> {
    let cleaned = sanitize(text);
    let trimmed = cleaned.trim();
    if trimmed.is_empty() {
        return Err(ParseError::Empty);
    }
    Ok(serde_json::from_str(trimmed)?)
}

/// Parse raw accumulated argument text into a map.
pub fn try_parse_tool_args(raw: &str) -> Result<Map<String, Value>, ParseError> {
    match parse_json_text(raw)? {
        Value::Object(mut map) => {
            expand_nested_json(&mut map);
            Ok(map)
        }
        // Double-encoded: the document is a JSON string holding JSON
        Value::String(inner) => match parse_json_text(&inner)? {
            Value::Object(mut map) => {
                expand_nested_json(&mut map);
                Ok(map)
            }
            other => Err(ParseError::NotAnObject(value_kind(&other))),
        },
        other => Err(ParseError::NotAnObject(value_kind(&other))),
    }
}

/// Normalize an already-decoded arguments value into a map.
pub fn try_normalize_tool_args(value: Value) -> Result<Map<String, Value>, ParseError> {
    match value {
        Value::Object(mut map) => {
            expand_nested_json(&mut map);
            Ok(map)
        }
        Value::String(text) => try_parse_tool_args(&text),
        Value::Null => Err(ParseError::Empty),
        other => Err(ParseError::NotAnObject(value_kind(&other))),
    }
}

/// Best-effort variant of [`try_parse_tool_args`]; failures yield an empty map.
pub fn parse_tool_args(raw: &str) -> Map<String, Value> {
    degrade(try_parse_tool_args(raw), raw)
}

/// Best-effort variant of [`try_normalize_tool_args`]; failures yield an empty map.
pub fn normalize_tool_args(value: Value) -> Map<String, Value> {
    let shown = value.to_string();
    degrade(try_normalize_tool_args(value), &shown)
}

fn degrade(result: Result<Map<String, Value>, ParseError>, raw: &str) -> Map<String, Value> {
    match result {
        Ok(map) => map,
        Err(ParseError::Empty) => Map::new(),
        Err(e) => {
            warn!(error = %e, raw = %raw, "discarding unparsable tool arguments");
            Map::new()
        }
    }
}
