//! Element matching.
//!
//! Selection runs in two explicit phases:
//!
//! 1. [`collect_matches`] walks the tree read-only and returns the paths of
//!    matching elements in document order.
//! 2. [`assign_missing_ids`] writes a synthetic `id="_selected_<n>"` into every
//!    match that has none, `n` being the match's position in this selection,
//!    and snapshots each match.
//!
//! Phase 2 means **selecting mutates the document**. Selecting again on the
//! serialized result finds the same elements with the same ids, which is what
//! lets the compositor look matches up by id afterwards.

use serde::Serialize;

use super::document::{Attributes, Document, Element, ElementPath};
use super::selector::SelectorQuery;
use crate::debug;

/// Prefix for ids generated during selection.
pub const SYNTHETIC_ID_PREFIX: &str = "_selected_";

/// Snapshot of a matched element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchResult {
    pub id: String,
    /// Local tag name (namespace prefix stripped).
    pub tag: String,
    pub attributes: Attributes,
}

impl SelectorQuery {
    /// Check a single element against every constraint of the query.
    pub fn matches(&self, element: &Element) -> bool {
        if let Some(tag) = &self.tag
            && element.local_name() != tag
        {
            return false;
        }

        if let Some(id) = &self.id
            && element.attr("id") != Some(id.as_str())
        {
            return false;
        }

        if !self.classes.is_empty() {
            let class_attr = element.attr("class").unwrap_or_default();
            let present: Vec<&str> = class_attr.split_whitespace().collect();
            if !self.classes.iter().all(|class| present.contains(&class.as_str())) {
                return false;
            }
        }

        self.attributes.iter().all(|(name, expected)| match expected {
            Some(expected) => element.attr(name) == Some(expected.as_str()),
            None => element.attributes().contains(name),
        })
    }
}

/// Paths of all elements below the root that match `query`, in document order.
pub fn collect_matches(document: &Document, query: &SelectorQuery) -> Vec<ElementPath> {
    document
        .root()
        .descendants()
        .filter(|(_, element)| query.matches(element))
        .map(|(path, _)| path)
        .collect()
}

/// Give every match without an id a synthetic one and snapshot the matches.
///
/// This is the mutating half of selection.
pub fn assign_missing_ids(document: &mut Document, matches: &[ElementPath]) -> Vec<MatchResult> {
    let mut results = Vec::with_capacity(matches.len());
    for (ordinal, path) in matches.iter().enumerate() {
        let Some(element) = document.element_at_mut(path) else {
            continue;
        };

        let existing = element.id().map(str::to_string);
        let id = match existing {
            Some(id) => id,
            None => {
                let id = format!("{SYNTHETIC_ID_PREFIX}{ordinal}");
                debug!("select"; "assigning id `{}` to <{}>", id, element.name());
                element.attributes_mut().set("id", id.as_str());
                id
            }
        };

        results.push(MatchResult {
            id,
            tag: element.local_name().to_string(),
            attributes: element.attributes().clone(),
        });
    }
    results
}

/// Select on a parsed document: collect matches, then assign missing ids.
pub fn select(document: &mut Document, query: &SelectorQuery) -> Vec<MatchResult> {
    let matches = collect_matches(document, query);
    debug!("select"; "`{}` matched {} element(s)", query, matches.len());
    assign_missing_ids(document, &matches)
}

/// Select on document text.
///
/// Returns the re-serialized document (with any synthetic ids written in) and
/// the matches. Text that does not parse comes back unchanged with no matches.
pub fn select_elements(text: &str, selector: &str) -> (String, Vec<MatchResult>) {
    let mut document = match Document::parse(text) {
        Ok(document) => document,
        Err(err) => {
            debug!("select"; "document does not parse: {}", err);
            return (text.to_string(), Vec::new());
        }
    };
    let matches = select(&mut document, &SelectorQuery::parse(selector));
    (document.to_xml(), matches)
}
