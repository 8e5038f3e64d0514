//! Tests for the markup filter and tool-call accumulator

use super::*;
use crate::packets::Placement;
use serde_json::json;

fn filter_all(chunks: &[&str]) -> String {
    let mut filter = MarkupFilter::new();
    let mut out: String = chunks.iter().map(|chunk| filter.process(chunk)).collect();
    out.push_str(&filter.flush());
    out
}

// ============================================================================
// MarkupFilter
// ============================================================================

#[test]
fn test_plain_text_passes_through() {
    assert_eq!(filter_all(&["Hello ", "world", "!"]), "Hello world!");
}

#[test]
fn test_block_removed_in_single_chunk() {
    let out = filter_all(&["before<function_calls><invoke name=\"x\"/></function_calls>after"]);
    assert_eq!(out, "beforeafter");
}

#[test]
fn test_block_removed_for_every_split() {
    let input = "a <function_calls>X</function_calls> b";
    let expected = "a  b";

    // Every pair of cut points (covers N = 1, 2 and 3 chunks)
    for i in 0..=input.len() {
        for j in i..=input.len() {
            let chunks = [&input[..i], &input[i..j], &input[j..]];
            assert_eq!(filter_all(&chunks), expected, "split at {} / {}", i, j);
        }
    }

    // One byte per chunk
    let singles: Vec<String> = input.chars().map(String::from).collect();
    let singles: Vec<&str> = singles.iter().map(String::as_str).collect();
    assert_eq!(filter_all(&singles), expected);
}

#[test]
fn test_split_marker_never_leaks() {
    let mut filter = MarkupFilter::new();

    let first = filter.process("<function_c");
    assert_eq!(first, "");

    let second = filter.process("alls>hidden</function_calls>visible");
    assert_eq!(second, "visible");
    assert!(!second.contains("hidden"));
    assert!(!second.contains("function"));

    assert_eq!(filter.flush(), "");
}

#[test]
fn test_marker_is_case_insensitive_with_attributes() {
    let out = filter_all(&["x<FUNCTION_CALLS id=\"1\">", "secret", "</Function_Calls>y"]);
    assert_eq!(out, "xy");
}

#[test]
fn test_false_marker_is_kept() {
    let text = "use <function_calls_other> and <function_calls2> literally";
    assert_eq!(filter_all(&[text]), text);
}

#[test]
fn test_false_marker_split_after_name_is_kept() {
    assert_eq!(
        filter_all(&["x <function_calls", "_other> visible text"]),
        "x <function_calls_other> visible text"
    );
    assert_eq!(filter_all(&["see <function_calls", "2> here"]), "see <function_calls2> here");
}

#[test]
fn test_complete_marker_name_held_until_next_char() {
    let mut filter = MarkupFilter::new();
    assert_eq!(filter.process("a <function_calls"), "a ");
    assert!(!filter.is_inside_block());
    assert_eq!(filter.process(">hidden</function_calls> b"), " b");
    assert_eq!(filter.flush(), "");
}

#[test]
fn test_bare_marker_name_released_on_flush() {
    let mut filter = MarkupFilter::new();
    assert_eq!(filter.process("ends with <function_calls"), "ends with ");
    assert_eq!(filter.flush(), "<function_calls");
}

#[test]
fn test_partial_prefix_released_when_not_a_marker() {
    let mut filter = MarkupFilter::new();
    assert_eq!(filter.process("a <func"), "a ");
    assert_eq!(filter.process("ky> tag"), "<funcky> tag");
    assert_eq!(filter.flush(), "");
}

#[test]
fn test_trailing_partial_prefix_released_on_flush() {
    let mut filter = MarkupFilter::new();
    assert_eq!(filter.process("ends with <function_ca"), "ends with ");
    assert_eq!(filter.flush(), "<function_ca");
}

#[test]
fn test_unterminated_block_discarded_on_flush() {
    let mut filter = MarkupFilter::new();
    assert_eq!(filter.process("shown<function_calls>never closed"), "shown");
    assert!(filter.is_inside_block());
    assert_eq!(filter.flush(), "");
    assert!(!filter.is_inside_block());
}

#[test]
fn test_multiple_blocks() {
    let out = filter_all(&[
        "one<function_calls>a</function_calls>two",
        "<function_calls>b</function_",
        "calls>three",
    ]);
    assert_eq!(out, "onetwothree");
}

#[test]
fn test_multibyte_text_around_marker() {
    let out = filter_all(&["héllo <", "function_calls>ü</function_calls> wörld ✓"]);
    assert_eq!(out, "héllo  wörld ✓");
}

// ============================================================================
// ToolCallAccumulator
// ============================================================================

#[test]
fn test_tool_call_accumulation() {
    let mut acc = ToolCallAccumulator::new();

    acc.merge(ToolCallFragment::new(0).with_id("a"));
    acc.merge(ToolCallFragment::new(0).with_name("f"));
    acc.merge(ToolCallFragment::new(0).with_arguments("{\"x\":"));
    acc.merge(ToolCallFragment::new(0).with_arguments("1}"));

    let calls = acc.finalize(Placement::new(0), None);
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].tool_call_id, "a");
    assert_eq!(calls[0].tool_name, "f");
    assert_eq!(json!(calls[0].tool_args), json!({"x": 1}));
}

#[test]
fn test_empty_values_do_not_overwrite() {
    let mut acc = ToolCallAccumulator::new();

    acc.merge(ToolCallFragment::new(0).with_id("call_1").with_name("search"));
    acc.merge(
        ToolCallFragment::new(0)
            .with_id("")
            .with_name("")
            .with_arguments("{}"),
    );

    let calls = acc.finalize(Placement::new(0), None);
    assert_eq!(calls[0].tool_call_id, "call_1");
    assert_eq!(calls[0].tool_name, "search");
}

#[test]
fn test_missing_id_gets_generated_one() {
    let mut acc = ToolCallAccumulator::new();
    acc.merge(ToolCallFragment::new(0).with_name("search").with_arguments("{}"));

    let calls = acc.finalize(Placement::new(0), None);
    assert_eq!(calls.len(), 1);
    assert!(calls[0].tool_call_id.starts_with("call_"));
    assert!(calls[0].tool_call_id.len() > "call_".len());
}

#[test]
fn test_nameless_entry_dropped() {
    let mut acc = ToolCallAccumulator::new();
    acc.merge(ToolCallFragment::new(0).with_id("call_empty"));

    assert_eq!(acc.len(), 1);
    assert!(acc.finalize(Placement::new(0), None).is_empty());
}

#[test]
fn test_sparse_indices_finalize_in_order() {
    let mut acc = ToolCallAccumulator::new();

    acc.merge(ToolCallFragment::new(3).with_id("c").with_name("third"));
    acc.merge(ToolCallFragment::new(1).with_id("b").with_name("second"));
    acc.merge(ToolCallFragment::new(0).with_id("a").with_name("first"));

    let calls = acc.finalize(Placement::new(2), None);
    let names: Vec<&str> = calls.iter().map(|c| c.tool_name.as_str()).collect();
    assert_eq!(names, ["first", "second", "third"]);

    let tabs: Vec<usize> = calls.iter().map(|c| c.placement.tab_index).collect();
    assert_eq!(tabs, [0, 1, 2]);
    assert!(calls.iter().all(|c| c.placement.turn_index == 2));
}

#[test]
fn test_fixed_tab_index_for_nested_calls() {
    let mut acc = ToolCallAccumulator::new();
    acc.merge(ToolCallFragment::new(0).with_id("a").with_name("f"));
    acc.merge(ToolCallFragment::new(1).with_id("b").with_name("g"));

    let calls = acc.finalize(Placement::nested(4, 2), Some(7));
    for call in &calls {
        assert_eq!(call.placement.tab_index, 7);
        assert_eq!(call.placement.turn_index, 4);
        assert_eq!(call.placement.sub_turn_index, Some(2));
    }
}

#[test]
fn test_malformed_arguments_become_empty() {
    let mut acc = ToolCallAccumulator::new();
    acc.merge(
        ToolCallFragment::new(0)
            .with_id("a")
            .with_name("f")
            .with_arguments("{\"x\": "),
    );

    let calls = acc.finalize(Placement::new(0), None);
    assert_eq!(calls.len(), 1);
    assert!(calls[0].tool_args.is_empty());
}

// ============================================================================
// Delta
// ============================================================================

#[test]
fn test_delta_emptiness() {
    assert!(Delta::default().is_empty());
    assert!(Delta::content("").is_empty());
    assert!(Delta::usage(json!({"prompt_tokens": 3})).is_empty());
    assert!(!Delta::content("x").is_empty());
    assert!(!Delta::reasoning("x").is_empty());
    assert!(!Delta::tool_calls(vec![ToolCallFragment::new(0)]).is_empty());
}

#[test]
fn test_delta_deserializes_provider_shape() {
    let delta: Delta = serde_json::from_value(json!({
        "content": "hi",
        "tool_calls": [{"index": 1, "id": "call_9", "arguments": "{}"}]
    }))
    .unwrap();

    assert_eq!(delta.text(), Some("hi"));
    assert_eq!(delta.tool_calls[0].index, 1);
    assert_eq!(delta.tool_calls[0].id.as_deref(), Some("call_9"));
    assert!(delta.tool_calls[0].name.is_none());
}
