//! Turn entry points: the model-client seam, the lazy packet iterator and the
//! async adapter.

use super::state::TurnStreamEngine;
use super::types::{TurnPhase, TurnResult};
use crate::config::{GenerationParams, TurnConfig};
use crate::error::TurnError;
use crate::history::HistoryMessage;
use crate::packets::{Packet, PacketSink};
use crate::streaming::Delta;
use crate::tools::{ToolChoice, ToolSchema};
use std::collections::VecDeque;
use tracing::debug;

/// Everything the model client needs to open a delta stream
#[derive(Debug, Clone, Copy)]
pub struct ModelRequest<'r> {
    /// Already-resolved model input
    pub history: &'r [HistoryMessage],
    pub tools: &'r [ToolSchema],
    pub tool_choice: ToolChoice,
    pub generation: &'r GenerationParams,
}

impl<'r> ModelRequest<'r> {
    pub fn new(history: &'r [HistoryMessage], tools: &'r [ToolSchema], config: &'r TurnConfig) -> Self {
        Self {
            history,
            tools,
            tool_choice: config.tool_choice,
            generation: &config.generation,
        }
    }
}

/// A model handle that can stream deltas for a request
pub trait ModelClient {
    type Error;
    type Stream: Iterator<Item = Result<Delta, Self::Error>>;

    /// Open a delta stream; the stream ends at the end of the model response
    fn stream(&self, request: &ModelRequest<'_>) -> Result<Self::Stream, Self::Error>;
}

/// Lazy packet sequence for one turn.
///
/// Each call to `next` pulls deltas from the source until at least one packet
/// is ready. An upstream error is yielded once and ends the sequence without a
/// result. Dropping the iterator early cancels the turn and drops the source.
pub struct TurnPackets<'a, I> {
    engine: Option<TurnStreamEngine<'a>>,
    source: I,
    pending: VecDeque<Packet>,
    result: Option<TurnResult>,
}

impl<'a, I> TurnPackets<'a, I> {
    pub fn new(engine: TurnStreamEngine<'a>, source: I) -> Self {
        Self {
            engine: Some(engine),
            source,
            pending: VecDeque::new(),
            result: None,
        }
    }

    pub fn phase(&self) -> TurnPhase {
        match &self.engine {
            Some(engine) => engine.phase(),
            None => TurnPhase::Done,
        }
    }

    /// The turn result, once the source is exhausted
    pub fn result(&self) -> Option<&TurnResult> {
        self.result.as_ref()
    }

    /// Consume the iterator, returning the result if the turn completed
    pub fn into_result(self) -> Option<TurnResult> {
        self.result
    }
}

impl<'a, I, E> Iterator for TurnPackets<'a, I>
where
    I: Iterator<Item = Result<Delta, E>>,
{
    type Item = Result<Packet, E>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(packet) = self.pending.pop_front() {
                return Some(Ok(packet));
            }
            let engine = self.engine.as_mut()?;
            match self.source.next() {
                Some(Ok(delta)) => self.pending.extend(engine.next_delta(delta)),
                Some(Err(e)) => {
                    debug!("model source failed, ending turn without a result");
                    self.engine = None;
                    return Some(Err(e));
                }
                None => {
                    if let Some(engine) = self.engine.take() {
                        let (packets, result) = engine.finish();
                        self.pending.extend(packets);
                        self.result = Some(result);
                    }
                }
            }
        }
    }
}

/// Open the model stream for `engine` and return the lazy packet sequence
pub fn start_turn<'a, C>(
    client: &C,
    history: &[HistoryMessage],
    engine: TurnStreamEngine<'a>,
) -> Result<TurnPackets<'a, C::Stream>, TurnError<C::Error>>
where
    C: ModelClient,
{
    let request = ModelRequest::new(history, engine.tools(), engine.config());
    let source = client.stream(&request).map_err(TurnError::Request)?;
    Ok(TurnPackets::new(engine, source))
}

/// Run one turn to completion, delivering every packet to `sink`.
///
/// Upstream failures end the turn: packets already delivered stay delivered,
/// nothing follows them, and no [`TurnResult`] is produced.
pub fn run_turn<C, S>(
    client: &C,
    history: &[HistoryMessage],
    engine: TurnStreamEngine<'_>,
    sink: &mut S,
) -> Result<TurnResult, TurnError<C::Error>>
where
    C: ModelClient,
    S: PacketSink + ?Sized,
{
    let mut packets = start_turn(client, history, engine)?;
    for packet in packets.by_ref() {
        sink.emit(packet.map_err(TurnError::Upstream)?);
    }
    Ok(packets.into_result().unwrap_or_default())
}

/// Drive `engine` from an async delta stream.
///
/// This is a convenience for providers that expose a `futures` stream; packet
/// order and error semantics match [`run_turn`].
#[cfg(feature = "streaming")]
pub async fn drive_stream<St, E, S>(
    mut stream: St,
    mut engine: TurnStreamEngine<'_>,
    sink: &mut S,
) -> Result<TurnResult, TurnError<E>>
where
    St: futures_util::Stream<Item = Result<Delta, E>> + Unpin,
    S: PacketSink + ?Sized,
{
    use futures_util::StreamExt;

    while let Some(delta) = stream.next().await {
        let delta = delta.map_err(TurnError::Upstream)?;
        for packet in engine.next_delta(delta) {
            sink.emit(packet);
        }
    }

    let (packets, result) = engine.finish();
    for packet in packets {
        sink.emit(packet);
    }
    Ok(result)
}
