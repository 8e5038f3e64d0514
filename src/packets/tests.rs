//! Tests for packet serialization and placement

use super::*;
use pretty_assertions::assert_eq;
use serde_json::{json, Map};

#[test]
fn test_answer_delta_serialization() {
    let packet = Packet::new(
        Placement::new(1),
        PacketObj::AnswerDelta {
            content: "hi".to_string(),
        },
    );

    let json = serde_json::to_value(&packet).unwrap();
    assert_eq!(
        json,
        json!({
            "placement": {"turn_index": 1, "tab_index": 0},
            "obj": {"type": "answer_delta", "content": "hi"}
        })
    );
}

#[test]
fn test_unit_and_newtype_variants_are_tagged() {
    let start = serde_json::to_value(PacketObj::ReasoningStart).unwrap();
    assert_eq!(start, json!({"type": "reasoning_start"}));

    let citation = serde_json::to_value(PacketObj::CitationInfo(CitationInfo::new(2, "doc"))).unwrap();
    assert_eq!(
        citation,
        json!({"type": "citation_info", "citation_number": 2, "document_id": "doc"})
    );
}

#[test]
fn test_answer_start_documents_omitted_when_absent() {
    let empty = serde_json::to_value(PacketObj::AnswerStart {
        final_documents: None,
    })
    .unwrap();
    assert_eq!(empty, json!({"type": "answer_start"}));

    let with_docs = PacketObj::AnswerStart {
        final_documents: Some(vec![DocumentRef::new("d1")]),
    };
    let json = serde_json::to_value(&with_docs).unwrap();
    assert_eq!(json["final_documents"][0]["document_id"], "d1");
}

#[test]
fn test_kind_matches_serialized_tag() {
    let objs = vec![
        PacketObj::ReasoningStart,
        PacketObj::ReasoningDelta {
            reasoning: "r".into(),
        },
        PacketObj::ReasoningDone,
        PacketObj::AnswerStart {
            final_documents: None,
        },
        PacketObj::AnswerDelta { content: "c".into() },
        PacketObj::CitationInfo(CitationInfo::new(1, "d")),
        PacketObj::ToolCallKickoff(ToolCallKickoff::new(
            "call_1",
            "search",
            Map::new(),
            Placement::new(0),
        )),
    ];

    for obj in objs {
        let json = serde_json::to_value(&obj).unwrap();
        assert_eq!(json["type"], obj.kind());
    }
}

#[test]
fn test_packet_deserialization() {
    let line = r#"{"placement":{"turn_index":2,"sub_turn_index":1},"obj":{"type":"reasoning_delta","reasoning":"thinking"}}"#;

    let packet: Packet = serde_json::from_str(line).unwrap();

    assert_eq!(packet.placement, Placement::nested(2, 1));
    assert_eq!(
        packet.obj,
        PacketObj::ReasoningDelta {
            reasoning: "thinking".into()
        }
    );
}

#[test]
fn test_tool_call_packet_uses_kickoff_placement() {
    let kickoff = ToolCallKickoff::new("call_1", "search", Map::new(), Placement::new(4).with_tab(2));

    let packet = Packet::tool_call(kickoff);

    assert_eq!(packet.placement, Placement::new(4).with_tab(2));
    assert_eq!(packet.obj.kind(), "tool_call_kickoff");
    assert!(packet.to_json_line().unwrap().contains("\"tool_name\":\"search\""));
}

#[test]
fn test_placement_advance_turn() {
    let mut placement = Placement::new(3);
    placement.advance();
    assert_eq!(placement, Placement::new(4));
}

#[test]
fn test_placement_advance_sub_turn() {
    let mut placement = Placement::nested(3, 0);
    placement.advance();
    assert_eq!(placement.turn_index, 3);
    assert_eq!(placement.sub_turn_index, Some(1));
}

#[test]
fn test_vec_sink_through_mut_ref() {
    fn emit_two(sink: &mut impl PacketSink) {
        sink.emit(Packet::new(Placement::new(0), PacketObj::ReasoningStart));
        sink.emit(Packet::new(Placement::new(0), PacketObj::ReasoningDone));
    }

    let mut packets = Vec::new();
    emit_two(&mut &mut packets);

    assert_eq!(packets.len(), 2);
    assert_eq!(packets[1].obj, PacketObj::ReasoningDone);
}
