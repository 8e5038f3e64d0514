//! Citation number to persisted document resolution

use super::marker_regex;
use crate::packets::CitationInfo;
use std::collections::{BTreeMap, HashMap};

/// Document id to persisted id lookup, first occurrence wins
#[derive(Debug, Clone)]
pub struct DocumentIdTable<T> {
    entries: HashMap<String, T>,
}

impl<T> Default for DocumentIdTable<T> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<T> DocumentIdTable<T> {
    /// Build from `(document_id, persisted_id)` pairs; later duplicates are ignored
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, T)>,
        S: Into<String>,
    {
        let mut entries = HashMap::new();
        for (document_id, persisted) in pairs {
            entries.entry(document_id.into()).or_insert(persisted);
        }
        Self { entries }
    }

    pub fn get(&self, document_id: &str) -> Option<&T> {
        self.entries.get(document_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// How citation numbers map to persisted documents
#[derive(Debug, Clone, Copy)]
pub enum ResolveStrategy<'a, T> {
    /// Number `n` is the `n`-th entry (1-based) of a caller-ordered list
    Positional(&'a [T]),
    /// Look up each citation's `document_id`
    ByDocumentId(&'a DocumentIdTable<T>),
}

/// Map citation numbers to persisted ids by position; out-of-range numbers are dropped.
pub fn resolve_positional<T: Clone>(
    numbers: impl IntoIterator<Item = usize>,
    documents: &[T],
) -> BTreeMap<usize, T> {
    let mut resolved = BTreeMap::new();
    for number in numbers {
        let Some(persisted) = number.checked_sub(1).and_then(|i| documents.get(i)) else {
            continue;
        };
        resolved.entry(number).or_insert_with(|| persisted.clone());
    }
    resolved
}

/// Map citations to persisted ids through their document ids.
///
/// Duplicate citation numbers keep their first resolution; unknown document
/// ids are dropped.
pub fn resolve_by_document_id<T: Clone>(
    citations: &[CitationInfo],
    table: &DocumentIdTable<T>,
) -> BTreeMap<usize, T> {
    let mut resolved = BTreeMap::new();
    for citation in citations {
        if resolved.contains_key(&citation.citation_number) {
            continue;
        }
        if let Some(persisted) = table.get(&citation.document_id) {
            resolved.insert(citation.citation_number, persisted.clone());
        }
    }
    resolved
}

/// Resolve a citation stream with the given strategy
pub fn resolve_citations<T: Clone>(
    citations: &[CitationInfo],
    strategy: ResolveStrategy<'_, T>,
) -> BTreeMap<usize, T> {
    match strategy {
        ResolveStrategy::Positional(documents) => {
            resolve_positional(citations.iter().map(|c| c.citation_number), documents)
        }
        ResolveStrategy::ByDocumentId(table) => resolve_by_document_id(citations, table),
    }
}

/// Citation numbers referenced by markers in `text`, in order of appearance.
///
/// Marker contents that are not integers are skipped.
pub fn parse_citation_numbers(text: &str) -> Vec<usize> {
    marker_regex()
        .captures_iter(text)
        .filter_map(|caps| caps[1].trim().parse().ok())
        .collect()
}
