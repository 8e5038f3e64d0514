//! Client-facing packets
//!
//! Every packet the engine emits carries a [`Placement`]. Packets for one
//! turn form a single append-only sequence:
//!
//! - [`PacketObj::ReasoningStart`] / [`PacketObj::ReasoningDelta`] / [`PacketObj::ReasoningDone`]
//! - [`PacketObj::AnswerStart`] (at most once per turn) / [`PacketObj::AnswerDelta`]
//! - [`PacketObj::CitationInfo`]
//! - [`PacketObj::ToolCallKickoff`] (only after the model stream is exhausted)

mod packet;
mod placement;

pub use packet::{CitationInfo, DocumentRef, Packet, PacketObj, ToolCallKickoff};
pub use placement::Placement;

/// Receives packets for delivery to the client.
pub trait PacketSink {
    fn emit(&mut self, packet: Packet);
}

impl PacketSink for Vec<Packet> {
    fn emit(&mut self, packet: Packet) {
        self.push(packet);
    }
}

impl<S: PacketSink + ?Sized> PacketSink for &mut S {
    fn emit(&mut self, packet: Packet) {
        (**self).emit(packet);
    }
}

#[cfg(test)]
mod tests;
