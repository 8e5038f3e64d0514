//! Streaming citation pipeline

use super::marker_regex;
use crate::error::CitationError;
use crate::packets::CitationInfo;
use std::collections::HashSet;

/// Longest trailing partial marker held back before it is released as text
const MAX_PENDING_MARKER: usize = 2048;

/// One item produced by a citation pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CitationOutput {
    /// Plain answer text
    Text(String),
    /// A citation binding
    Citation(CitationInfo),
}

/// Turns answer text into text fragments and citation bindings.
///
/// Called once per filtered content chunk with `Some(text)`, then once with
/// `None` at the end of the turn to flush anything buffered.
pub trait CitationPipeline {
    fn process_token(&mut self, token: Option<&str>) -> Result<Vec<CitationOutput>, CitationError>;
}

/// Citation pipeline for `[[n]](link)` markers over a positional document list.
///
/// Marker `n` refers to the `n`-th document (1-based). Each number yields one
/// [`CitationInfo`] the first time it appears; numbers without a document are
/// passed through as text only. A marker split across chunks is held back
/// until it completes.
#[derive(Debug, Default)]
pub struct MarkerCitationPipeline {
    documents: Vec<String>,
    buffer: String,
    cited: HashSet<usize>,
}

impl MarkerCitationPipeline {
    /// Create a pipeline over document ids in citation order
    pub fn new(documents: Vec<String>) -> Self {
        Self {
            documents,
            ..Self::default()
        }
    }

    fn resolve(&mut self, number: &str) -> Option<CitationInfo> {
        let number: usize = number.parse().ok()?;
        let document_id = self.documents.get(number.checked_sub(1)?)?;
        self.cited
            .insert(number)
            .then(|| CitationInfo::new(number, document_id.clone()))
    }

    fn drain_complete(&mut self) -> Vec<CitationOutput> {
        let buffer = std::mem::take(&mut self.buffer);
        let mut outputs = Vec::new();
        let mut text = String::new();
        let mut cursor = 0;

        for caps in marker_regex().captures_iter(&buffer) {
            let Some(marker) = caps.get(0) else {
                continue;
            };
            text.push_str(&buffer[cursor..marker.end()]);
            cursor = marker.end();
            if let Some(info) = self.resolve(caps[1].trim()) {
                outputs.push(CitationOutput::Text(std::mem::take(&mut text)));
                outputs.push(CitationOutput::Citation(info));
            }
        }

        let rest = &buffer[cursor..];
        let hold = pending_marker_start(rest).unwrap_or(rest.len());
        text.push_str(&rest[..hold]);
        self.buffer = rest[hold..].to_string();

        outputs.push(CitationOutput::Text(text));
        outputs.retain(|output| !matches!(output, CitationOutput::Text(t) if t.is_empty()));
        outputs
    }
}

impl CitationPipeline for MarkerCitationPipeline {
    fn process_token(&mut self, token: Option<&str>) -> Result<Vec<CitationOutput>, CitationError> {
        match token {
            Some(text) => {
                self.buffer.push_str(text);
                Ok(self.drain_complete())
            }
            None => {
                let mut outputs = self.drain_complete();
                let rest = std::mem::take(&mut self.buffer);
                if !rest.is_empty() {
                    outputs.push(CitationOutput::Text(rest));
                }
                Ok(outputs)
            }
        }
    }
}

/// Start of a trailing fragment that could still complete into a marker
fn pending_marker_start(text: &str) -> Option<usize> {
    text.match_indices('[')
        .map(|(pos, _)| pos)
        .find(|&pos| text.len() - pos <= MAX_PENDING_MARKER && is_marker_prefix(&text[pos..]))
}

/// Whether `s` is a (possibly complete) prefix of `[[<digits>]](<link>)`
fn is_marker_prefix(s: &str) -> bool {
    let Some(rest) = s.strip_prefix('[') else {
        return false;
    };
    let rest = match rest.strip_prefix('[') {
        Some(rest) => rest,
        None => return rest.is_empty(),
    };

    let digits_end = rest
        .find(|c: char| !c.is_ascii_digit() && c != ' ')
        .unwrap_or(rest.len());
    let rest = &rest[digits_end..];
    if rest.len() <= 3 {
        return "]](".starts_with(rest);
    }
    match rest.strip_prefix("]](") {
        Some(link) => !link.contains(')'),
        None => false,
    }
}
