//! Tool-call recovery from free text.
//!
//! Used when tool choice was mandatory but the structured tool-call channel
//! stayed empty. Two syntaxes are recognized: JSON objects that look like a
//! tool call (several common shapes), and XML-style `<invoke>` blocks.

use super::args::{normalize_tool_args, strip_nul};
use super::{generate_tool_call_id, ToolSchema};
use crate::packets::{Placement, ToolCallKickoff};
use regex::Regex;
use serde_json::{Map, Value};
use std::ops::Range;
use std::sync::OnceLock;
use tracing::{debug, trace};

/// A balanced `{...}` substring that parsed as a JSON object
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct JsonCandidate {
    pub span: Range<usize>,
    pub object: Map<String, Value>,
}

/// Collect every JSON object embedded in `text`, nested ones included,
/// ordered by start offset.
///
/// One pass pairs braces with a stack of open offsets. String state is only
/// tracked while a brace is open, so quotes in surrounding prose are ignored.
pub(crate) fn find_json_objects(text: &str) -> Vec<JsonCandidate> {
    let mut spans = balanced_spans(text.as_bytes());
    spans.sort_unstable_by_key(|span| span.start);

    spans
        .into_iter()
        .filter_map(|span| match serde_json::from_str(&text[span.clone()]) {
            Ok(Value::Object(object)) => Some(JsonCandidate { span, object }),
            _ => None,
        })
        .collect()
}

/// Every brace-balanced `{...}` region, in closing order.
fn balanced_spans(bytes: &[u8]) -> Vec<Range<usize>> {
    let mut open: Vec<usize> = Vec::new();
    let mut spans = Vec::new();
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate() {
        if in_string {
            match b {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match b {
            b'"' if !open.is_empty() => in_string = true,
            b'{' => open.push(i),
            b'}' => {
                if let Some(start) = open.pop() {
                    spans.push(start..i + 1);
                }
            }
            _ => {}
        }
    }
    spans
}

/// Result of matching one candidate against the tool list
#[derive(Debug)]
struct CandidateMatch {
    tool_name: String,
    args: Map<String, Value>,
    /// The nested arguments object this match consumed, if any
    consumed: Option<Map<String, Value>>,
}

/// Recovers tool invocations from finished answer or reasoning text.
pub struct FallbackExtractor<'a> {
    tools: &'a [ToolSchema],
}

impl<'a> FallbackExtractor<'a> {
    /// Create an extractor over the tools offered to the model
    pub fn new(tools: &'a [ToolSchema]) -> Self {
        Self { tools }
    }

    /// Extract tool calls from `text`.
    ///
    /// Matches get generated ids and ascending tab indices under the turn and
    /// sub-turn of `placement`.
    pub fn extract(&self, text: &str, placement: Placement) -> Vec<ToolCallKickoff> {
        let mut calls = self.extract_json_calls(text);
        if calls.is_empty() {
            calls = self.extract_xml_calls(text);
        }
        debug!(count = calls.len(), "fallback tool-call extraction finished");

        calls
            .into_iter()
            .enumerate()
            .map(|(tab_index, (tool_name, tool_args))| {
                ToolCallKickoff::new(
                    generate_tool_call_id(),
                    tool_name,
                    tool_args,
                    placement.with_tab(tab_index),
                )
            })
            .collect()
    }

    fn find_tool(&self, name: &str) -> Option<&ToolSchema> {
        self.tools.iter().find(|tool| tool.name() == name)
    }

    fn extract_json_calls(&self, text: &str) -> Vec<(String, Map<String, Value>)> {
        let mut calls = Vec::new();
        let mut last_match: Option<(Range<usize>, Option<Map<String, Value>>)> = None;

        for candidate in find_json_objects(text) {
            if let Some((span, consumed)) = &last_match {
                if consumed.as_ref() == Some(&candidate.object) {
                    trace!("skipping arguments object already consumed by previous match");
                    continue;
                }
                if span.start <= candidate.span.start && candidate.span.end <= span.end {
                    continue;
                }
            }

            if let Some(m) = self.match_candidate(&candidate.object) {
                trace!(tool = %m.tool_name, "matched JSON tool call in text");
                calls.push((m.tool_name, m.args));
                last_match = Some((candidate.span, m.consumed));
            }
        }
        calls
    }

    fn match_candidate(&self, object: &Map<String, Value>) -> Option<CandidateMatch> {
        self.match_named(object)
            .or_else(|| {
                object
                    .get("function")
                    .and_then(Value::as_object)
                    .and_then(|function| self.match_named(function))
            })
            .or_else(|| self.match_keyed(object))
            .or_else(|| self.match_structural(object))
    }

    /// `{"name": N, "arguments"|"parameters": {...}}`
    fn match_named(&self, object: &Map<String, Value>) -> Option<CandidateMatch> {
        let name = object.get("name")?.as_str()?;
        let tool = self.find_tool(name)?;
        let raw_args = object.get("arguments").or_else(|| object.get("parameters"))?;

        Some(CandidateMatch {
            tool_name: tool.name().to_string(),
            args: normalize_tool_args(raw_args.clone()),
            consumed: raw_args.as_object().cloned(),
        })
    }

    /// `{N: {...}}`
    fn match_keyed(&self, object: &Map<String, Value>) -> Option<CandidateMatch> {
        if object.len() != 1 {
            return None;
        }
        let (name, value) = object.iter().next()?;
        let tool = self.find_tool(name)?;
        let inner = value.as_object()?;

        Some(CandidateMatch {
            tool_name: tool.name().to_string(),
            args: normalize_tool_args(value.clone()),
            consumed: Some(inner.clone()),
        })
    }

    /// Every required parameter of exactly one tool appears as a top-level key
    fn match_structural(&self, object: &Map<String, Value>) -> Option<CandidateMatch> {
        let mut matching = self.tools.iter().filter(|tool| {
            let required = tool.required_params();
            !required.is_empty() && required.iter().all(|key| object.contains_key(*key))
        });
        let tool = matching.next()?;
        if matching.next().is_some() {
            trace!("ambiguous structural tool match");
            return None;
        }

        let declared: Map<String, Value> = object
            .iter()
            .filter(|(key, _)| tool.declares(key))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        Some(CandidateMatch {
            tool_name: tool.name().to_string(),
            args: normalize_tool_args(Value::Object(declared)),
            consumed: None,
        })
    }

    fn extract_xml_calls(&self, text: &str) -> Vec<(String, Map<String, Value>)> {
        invoke_regex()
            .captures_iter(text)
            .filter_map(|caps| {
                let name = attribute(&caps[1], "name")?;
                let name = strip_nul(&unescape_entities(&name)).into_owned();
                if name.is_empty() {
                    return None;
                }
                Some((name, parse_xml_parameters(&caps[2])))
            })
            .collect()
    }
}

fn parse_xml_parameters(body: &str) -> Map<String, Value> {
    let mut args = Map::new();
    for caps in parameter_regex().captures_iter(body) {
        let Some(name) = attribute(&caps[1], "name") else {
            continue;
        };
        let name = strip_nul(&unescape_entities(&name)).into_owned();
        let raw = strip_nul(&unescape_entities(&caps[2])).into_owned();

        let value = if attribute(&caps[1], "string").as_deref() == Some("true") {
            Value::String(raw)
        } else {
            serde_json::from_str(&raw).unwrap_or(Value::String(raw))
        };
        args.insert(name, value);
    }
    args
}

/// Value of attribute `key` in a tag's attribute text (case-insensitive key)
fn attribute(attrs: &str, key: &str) -> Option<String> {
    attribute_regex()
        .captures_iter(attrs)
        .find(|caps| caps[1].eq_ignore_ascii_case(key))
        .and_then(|caps| caps.get(2).or_else(|| caps.get(3)))
        .map(|value| value.as_str().to_string())
}

/// HTML/XML entity unescape; the raw text is kept when it is not valid markup
fn unescape_entities(text: &str) -> String {
    match quick_xml::escape::unescape(text) {
        Ok(unescaped) => unescaped.into_owned(),
        Err(_) => text.to_string(),
    }
}

fn invoke_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<invoke\b([^>]*)>(.*?)</invoke\s*>").unwrap())
}

fn parameter_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<parameter\b([^>]*)>(.*?)</parameter\s*>").unwrap())
}

fn attribute_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"([A-Za-z_][\w-]*)\s*=\s*(?:"([^"]*)"|'([^']*)')"#).unwrap())
}
