//! The per-turn state machine.

use super::types::{TurnPhase, TurnResult, TurnSnapshot, TurnStateRecorder};
use crate::citations::{CitationOutput, CitationPipeline};
use crate::config::TurnConfig;
use crate::packets::{CitationInfo, Packet, PacketObj, Placement, ToolCallKickoff};
use crate::streaming::{Delta, MarkupFilter, ToolCallAccumulator};
use crate::tools::{FallbackExtractor, ToolSchema};
use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{debug, trace, warn};

/// Turns a sequence of model deltas into ordered client packets.
///
/// Drive it with [`next_delta`](Self::next_delta) for every delta, then call
/// [`finish`](Self::finish) once the source is exhausted. Dropping the engine
/// before `finish` abandons the turn: no result, no tool calls.
///
/// ```rust
/// use turn_stream::{Delta, PacketObj, TurnConfig, TurnStreamEngine};
///
/// let tools: Vec<turn_stream::ToolSchema> = Vec::new();
/// let mut engine = TurnStreamEngine::new(TurnConfig::default(), &tools);
/// let packets = engine.next_delta(Delta::content("Hello"));
/// assert!(matches!(packets[0].obj, PacketObj::AnswerStart { .. }));
///
/// let (_, result) = engine.finish();
/// assert_eq!(result.answer.as_deref(), Some("Hello"));
/// ```
pub struct TurnStreamEngine<'a> {
    config: TurnConfig,
    tools: &'a [ToolSchema],
    citation_pipeline: Option<&'a mut dyn CitationPipeline>,
    recorder: Option<&'a mut dyn TurnStateRecorder>,

    filter: MarkupFilter,
    accumulator: ToolCallAccumulator,
    placement: Placement,
    reasoning_open: bool,
    answer_open: bool,
    has_reasoned: bool,

    reasoning: String,
    answer: String,
    raw_answer: String,
    citations: Vec<CitationInfo>,
    usage: Option<Value>,

    started_at: DateTime<Utc>,
    pre_answer_processing: Option<chrono::Duration>,
}

impl<'a> TurnStreamEngine<'a> {
    /// Create an engine for one turn over the tools offered to the model
    pub fn new(config: TurnConfig, tools: &'a [ToolSchema]) -> Self {
        Self {
            placement: config.placement,
            config,
            tools,
            citation_pipeline: None,
            recorder: None,
            filter: MarkupFilter::new(),
            accumulator: ToolCallAccumulator::new(),
            reasoning_open: false,
            answer_open: false,
            has_reasoned: false,
            reasoning: String::new(),
            answer: String::new(),
            raw_answer: String::new(),
            citations: Vec::new(),
            usage: None,
            started_at: Utc::now(),
            pre_answer_processing: None,
        }
    }

    /// Route answer text through a citation pipeline
    pub fn with_citation_pipeline(mut self, pipeline: &'a mut dyn CitationPipeline) -> Self {
        self.citation_pipeline = Some(pipeline);
        self
    }

    /// Report partial state to a recorder
    pub fn with_recorder(mut self, recorder: &'a mut dyn TurnStateRecorder) -> Self {
        self.recorder = Some(recorder);
        self
    }

    pub fn config(&self) -> &TurnConfig {
        &self.config
    }

    pub fn tools(&self) -> &'a [ToolSchema] {
        self.tools
    }

    /// Placement the next packet will carry
    pub fn placement(&self) -> Placement {
        self.placement
    }

    pub fn phase(&self) -> TurnPhase {
        if self.reasoning_open {
            TurnPhase::Reasoning
        } else if self.answer_open {
            TurnPhase::Answer
        } else {
            TurnPhase::Idle
        }
    }

    /// Consume one delta and return the packets it produces, in order.
    ///
    /// Reasoning text is handled first, then answer content, then tool-call
    /// fragments. Fragments never produce packets before [`finish`](Self::finish).
    pub fn next_delta(&mut self, mut delta: Delta) -> Vec<Packet> {
        let mut packets = Vec::new();

        let has_usage = delta.usage.is_some();
        if let Some(usage) = delta.usage.take() {
            trace!("usage metadata received");
            self.usage = Some(usage);
        }

        if delta.is_empty() {
            if !has_usage {
                debug!(placement = ?self.placement, "skipping empty delta");
            }
            return packets;
        }

        if let Some(reasoning) = delta.reasoning_text() {
            trace!(text = %reasoning, "reasoning delta");
            self.push_reasoning(reasoning, &mut packets);
        }

        if let Some(content) = delta.text() {
            trace!(text = %content, "content delta");
            self.raw_answer.push_str(content);
            let visible = self.filter.process(content);
            self.handle_content(&visible, &mut packets);
        }

        if !delta.tool_calls.is_empty() {
            self.close_reasoning(&mut packets);
            for fragment in delta.tool_calls {
                self.accumulator.merge(fragment);
            }
        }

        packets
    }

    /// Finalize the turn.
    ///
    /// Emits the trailing filtered content, closes any open reasoning section,
    /// flushes the citation pipeline and finally emits one kickoff packet per
    /// tool call.
    pub fn finish(mut self) -> (Vec<Packet>, TurnResult) {
        let mut packets = Vec::new();

        let trailing = self.filter.flush();
        self.handle_content(&trailing, &mut packets);
        self.close_reasoning(&mut packets);
        self.flush_citations(&mut packets);

        let tool_calls = self.collect_tool_calls();
        debug!(
            tool_calls = tool_calls.len(),
            citations = self.citations.len(),
            has_reasoned = self.has_reasoned,
            "turn finished"
        );
        packets.extend(tool_calls.iter().cloned().map(Packet::tool_call));

        let result = TurnResult {
            reasoning: non_empty(self.reasoning),
            answer: non_empty(self.answer),
            raw_answer: non_empty(self.raw_answer),
            tool_calls: (!tool_calls.is_empty()).then_some(tool_calls),
            has_reasoned: self.has_reasoned,
            citations: self.citations,
            usage: self.usage,
            pre_answer_processing_ms: self.pre_answer_processing.map(|d| d.num_milliseconds()),
            placement: self.placement,
        };
        (packets, result)
    }

    // ========================================================================
    // Sections
    // ========================================================================

    fn push_reasoning(&mut self, text: &str, packets: &mut Vec<Packet>) {
        if !self.reasoning_open {
            debug!(placement = ?self.placement, "reasoning section opened");
            packets.push(Packet::new(self.placement, PacketObj::ReasoningStart));
            self.reasoning_open = true;
            self.has_reasoned = true;
        }
        self.reasoning.push_str(text);
        packets.push(Packet::new(
            self.placement,
            PacketObj::ReasoningDelta {
                reasoning: text.to_string(),
            },
        ));
        self.record();
    }

    fn close_reasoning(&mut self, packets: &mut Vec<Packet>) {
        if !self.reasoning_open {
            return;
        }
        packets.push(Packet::new(self.placement, PacketObj::ReasoningDone));
        self.reasoning_open = false;
        self.placement.advance();
        debug!(
            turn_index = self.placement.turn_index,
            sub_turn_index = ?self.placement.sub_turn_index,
            "reasoning section closed"
        );
    }

    fn open_answer(&mut self, packets: &mut Vec<Packet>) {
        if self.answer_open {
            return;
        }
        self.pre_answer_processing = Some(Utc::now().signed_duration_since(self.started_at));
        packets.push(Packet::new(
            self.placement,
            PacketObj::AnswerStart {
                final_documents: self.config.final_documents.clone(),
            },
        ));
        self.answer_open = true;
        debug!(placement = ?self.placement, "answer section opened");
    }

    /// Filtered content: reasoning in deep-research mode, answer otherwise
    fn handle_content(&mut self, text: &str, packets: &mut Vec<Packet>) {
        if text.is_empty() {
            return;
        }
        if self.config.content_is_reasoning() {
            self.push_reasoning(text, packets);
            return;
        }

        self.close_reasoning(packets);
        self.open_answer(packets);

        let processed = self
            .citation_pipeline
            .as_deref_mut()
            .map(|pipeline| pipeline.process_token(Some(text)));
        match processed {
            None => self.emit_answer_text(text.to_string(), packets),
            Some(Ok(outputs)) => self.emit_citation_outputs(outputs, packets),
            Some(Err(e)) => {
                warn!(error = %e, "citation pipeline failed, emitting chunk without citations");
                self.emit_answer_text(text.to_string(), packets);
            }
        }
    }

    fn flush_citations(&mut self, packets: &mut Vec<Packet>) {
        let Some(pipeline) = self.citation_pipeline.as_deref_mut() else {
            return;
        };
        match pipeline.process_token(None) {
            Ok(outputs) if outputs.is_empty() => {}
            Ok(outputs) => {
                self.open_answer(packets);
                self.emit_citation_outputs(outputs, packets);
            }
            Err(e) => warn!(error = %e, "citation pipeline failed to flush"),
        }
    }

    fn emit_citation_outputs(&mut self, outputs: Vec<CitationOutput>, packets: &mut Vec<Packet>) {
        for output in outputs {
            match output {
                CitationOutput::Text(text) if text.is_empty() => {}
                CitationOutput::Text(text) => self.emit_answer_text(text, packets),
                CitationOutput::Citation(info) => {
                    self.citations.push(info.clone());
                    packets.push(Packet::new(self.placement, PacketObj::CitationInfo(info)));
                }
            }
        }
    }

    fn emit_answer_text(&mut self, text: String, packets: &mut Vec<Packet>) {
        self.answer.push_str(&text);
        packets.push(Packet::new(self.placement, PacketObj::AnswerDelta { content: text }));
        self.record();
    }

    fn record(&mut self) {
        if let Some(recorder) = self.recorder.as_deref_mut() {
            recorder.record(&TurnSnapshot {
                reasoning: &self.reasoning,
                answer: &self.answer,
                pre_answer_processing: self.pre_answer_processing,
            });
        }
    }

    // ========================================================================
    // Tool calls
    // ========================================================================

    /// Structured calls, or calls recovered from free text when a tool call
    /// was mandatory and the structured channel stayed empty.
    fn collect_tool_calls(&mut self) -> Vec<ToolCallKickoff> {
        let accumulator = std::mem::take(&mut self.accumulator);
        let calls = accumulator.finalize(self.placement, self.config.fixed_tab_index);
        if !calls.is_empty() || !self.config.tool_choice.is_required() {
            return calls;
        }

        let extractor = FallbackExtractor::new(self.tools);
        for (source, text) in [("answer", &self.raw_answer), ("reasoning", &self.reasoning)] {
            if text.trim().is_empty() {
                continue;
            }
            let recovered = extractor.extract(text, self.placement);
            if !recovered.is_empty() {
                debug!(source, count = recovered.len(), "recovered tool calls from free text");
                return recovered;
            }
        }
        debug!("tool call was required but none could be recovered");
        calls
    }
}

fn non_empty(text: String) -> Option<String> {
    (!text.is_empty()).then_some(text)
}
