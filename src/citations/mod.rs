//! Citation handling for `[[n]](link)` markers.
//!
//! Three concerns live here:
//!
//! - [`CitationPipeline`]: the streaming collaborator fed with answer text
//!   during the turn ([`MarkerCitationPipeline`] is the stock implementation)
//! - [`reorder_by_appearance`]: dense renumbering of a finished answer
//! - [`resolve_citations`]: mapping citation numbers to persisted documents

mod pipeline;
mod renumber;
mod resolve;

pub use pipeline::{CitationOutput, CitationPipeline, MarkerCitationPipeline};
pub use renumber::{reorder_by_appearance, RenumberedCitations};
pub use resolve::{
    parse_citation_numbers, resolve_by_document_id, resolve_citations, resolve_positional,
    DocumentIdTable, ResolveStrategy,
};

use regex::Regex;
use std::sync::OnceLock;

/// `[[<number>]](<link>)`; group 1 is the raw number text, group 2 the link
fn marker_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[\[([^\[\]]*)\]\]\(([^)]*)\)").unwrap())
}
