//! Citation renumbering by first appearance

use super::marker_regex;
use crate::packets::CitationInfo;
use regex::Captures;
use std::collections::HashMap;

/// Answer text and citation list after renumbering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenumberedCitations {
    pub text: String,
    pub citations: Vec<CitationInfo>,
}

/// Renumber `[[n]](link)` markers densely, in order of first appearance.
///
/// Each first-seen number that has a candidate citation gets the next number
/// starting at 1, and every marker with that number is rewritten. Markers
/// whose content does not parse, or that have no candidate, are left as they
/// are. Candidates never referenced in the text are appended after the
/// referenced ones, keeping their relative order. Running the function on its
/// own output changes nothing.
pub fn reorder_by_appearance(text: &str, candidates: &[CitationInfo]) -> RenumberedCitations {
    let mut by_number: HashMap<usize, &CitationInfo> = HashMap::new();
    for candidate in candidates {
        by_number.entry(candidate.citation_number).or_insert(candidate);
    }

    let mut renumbered: HashMap<usize, usize> = HashMap::new();
    let mut citations: Vec<CitationInfo> = Vec::new();

    let rewritten = marker_regex().replace_all(text, |caps: &Captures| {
        let original = &caps[0];
        let Ok(number) = caps[1].trim().parse::<usize>() else {
            return original.to_string();
        };
        let Some(candidate) = by_number.get(&number) else {
            return original.to_string();
        };

        let new_number = *renumbered.entry(number).or_insert_with(|| {
            citations.push(CitationInfo::new(citations.len() + 1, candidate.document_id.clone()));
            citations.len()
        });
        format!("[[{}]]({})", new_number, &caps[2])
    });
    let text = rewritten.into_owned();

    for candidate in candidates {
        if renumbered.contains_key(&candidate.citation_number) {
            continue;
        }
        renumbered.insert(candidate.citation_number, citations.len() + 1);
        citations.push(CitationInfo::new(citations.len() + 1, candidate.document_id.clone()));
    }

    RenumberedCitations { text, citations }
}
