//! Streaming filter for inline tool-call markup.
//!
//! Some providers leak their tool-call syntax into the visible text as
//! `<function_calls> ... </function_calls>` blocks. [`MarkupFilter`] removes
//! those blocks from a chunked text stream without ever emitting part of a
//! marker, no matter where chunk boundaries fall.

use tracing::{trace, warn};

const OPEN_MARKER: &str = "<function_calls";
const CLOSE_MARKER: &str = "</function_calls>";

/// Removes `<function_calls ...> ... </function_calls>` blocks from streamed text.
///
/// Tag matching is case-insensitive and ignores attributes. Text outside the
/// blocks passes through unchanged and in order.
#[derive(Debug, Default)]
pub struct MarkupFilter {
    buffer: String,
    inside_block: bool,
}

impl MarkupFilter {
    /// Create a new filter
    pub fn new() -> Self {
        Self::default()
    }

    /// True while an opened block has not been closed yet
    pub fn is_inside_block(&self) -> bool {
        self.inside_block
    }

    /// Feed a chunk and return the text that is safe to show.
    ///
    /// A trailing fragment that could still grow into an open marker is held
    /// back until the next chunk (or [`flush`](Self::flush)).
    pub fn process(&mut self, chunk: &str) -> String {
        self.buffer.push_str(chunk);
        let mut visible = String::new();

        while !self.buffer.is_empty() {
            let lowered = self.buffer.to_ascii_lowercase();

            if self.inside_block {
                let Some(pos) = lowered.find(CLOSE_MARKER) else {
                    break;
                };
                trace!("closing markup block");
                self.buffer.drain(..pos + CLOSE_MARKER.len());
                self.inside_block = false;
                continue;
            }

            match find_open_marker(&lowered) {
                Some(pos) => {
                    trace!("opening markup block");
                    visible.push_str(&self.buffer[..pos]);
                    self.buffer.drain(..pos + OPEN_MARKER.len());
                    self.inside_block = true;
                }
                None => {
                    let emit_len = self.buffer.len() - partial_marker_len(&lowered);
                    visible.push_str(&self.buffer[..emit_len]);
                    self.buffer.drain(..emit_len);
                    break;
                }
            }
        }

        visible
    }

    /// End of stream: release whatever is still buffered.
    ///
    /// An unterminated block is discarded rather than shown.
    pub fn flush(&mut self) -> String {
        let remaining = std::mem::take(&mut self.buffer);
        if self.inside_block {
            self.inside_block = false;
            if !remaining.is_empty() {
                warn!(
                    discarded = remaining.len(),
                    "discarding unterminated markup block at end of stream"
                );
            }
            return String::new();
        }
        remaining
    }
}

/// Position of the first real open marker in `lowered`.
///
/// The marker must be followed by `>` or whitespace, so `<function_calls2`
/// and `<function_calls_other>` don't count. A marker at the very end of the
/// buffer is undecided and left to [`partial_marker_len`].
fn find_open_marker(lowered: &str) -> Option<usize> {
    lowered.match_indices(OPEN_MARKER).map(|(pos, _)| pos).find(|&pos| {
        match lowered[pos + OPEN_MARKER.len()..].chars().next() {
            None => false,
            Some('>') => true,
            Some(c) => c.is_whitespace(),
        }
    })
}

/// Length of the longest suffix of `lowered` that is a prefix of the open
/// marker, the complete marker included.
fn partial_marker_len(lowered: &str) -> usize {
    let bytes = lowered.as_bytes();
    let marker = OPEN_MARKER.as_bytes();
    (1..=marker.len().min(bytes.len()))
        .rev()
        .find(|&k| bytes[bytes.len() - k..] == marker[..k])
        .unwrap_or(0)
}
