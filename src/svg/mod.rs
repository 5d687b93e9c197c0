//! SVG selection and transformation.
//!
//! # Modules
//!
//! - [`selector`]: compact selector text → [`SelectorQuery`]
//! - [`document`]: ordered, owned document tree built with quick-xml
//! - [`matcher`]: query matching and synthetic id assignment
//! - [`transform`]: [`TransformRequest`] composition onto one element
//! - [`optimize`]: regex size-reduction pipeline (text in, text out)
//!
//! # Flow
//!
//! ```text
//! document text ──► Document::parse ──► select (collect, assign ids)
//!                                             │
//!                                             ▼
//!            to_xml ◄── apply_transform per matched id
//! ```
//!
//! Every call parses its own tree and drops it after serializing, so calls on
//! independent texts can run in parallel without coordination.

pub mod document;
pub mod error;
pub mod matcher;
pub mod optimize;
pub mod selector;
mod serialize;
pub mod transform;

#[cfg(test)]
mod tests;

pub use document::{Attribute, Attributes, Document, Element, ElementPath, Node};
pub use error::DocumentError;
pub use matcher::{MatchResult, assign_missing_ids, collect_matches, select, select_elements};
pub use optimize::{OptimizeLevel, OptimizeOptions, OptimizeReport, OptimizeStats, optimize};
pub use selector::SelectorQuery;
pub use transform::{DIRECT_ATTRIBUTES, TransformRequest, apply_transform};

use serde::Serialize;

use crate::debug;

/// Outcome of [`transform_matching`].
///
/// Failures are reported here rather than as `Err`; on failure
/// `modified_document` is the input text, byte for byte.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub original_document: String,
    pub modified_document: String,
    pub matched_elements: usize,
    /// Matches as they were before the transform (synthetic ids included).
    pub elements: Vec<MatchResult>,
}

impl TransformOutcome {
    fn failure(text: &str, error: String) -> Self {
        Self {
            success: false,
            error: Some(error),
            original_document: text.to_string(),
            modified_document: text.to_string(),
            matched_elements: 0,
            elements: Vec::new(),
        }
    }
}

/// Select elements with `selector` and apply `request` to each of them.
///
/// The selection assigns `_selected_<n>` ids to matches without one; those
/// ids are part of the modified document. Matches are transformed in
/// document order, looked up by id (so with duplicate ids the first element
/// carrying the id receives every transform for that id).
pub fn transform_matching(text: &str, selector: &str, request: &TransformRequest) -> TransformOutcome {
    let mut document = match Document::parse(text) {
        Ok(document) => document,
        Err(err) => return TransformOutcome::failure(text, format!("Failed to parse document: {err}")),
    };

    let query = SelectorQuery::parse(selector);
    let elements = select(&mut document, &query);
    if elements.is_empty() {
        return TransformOutcome::failure(
            text,
            format!("No elements found matching selector: '{selector}'"),
        );
    }

    for key in request.ignored_keys() {
        debug!("transform"; "ignoring unknown request key `{}`", key);
    }

    for element in &elements {
        document.apply_transform(&element.id, request);
    }

    TransformOutcome {
        success: true,
        error: None,
        original_document: text.to_string(),
        modified_document: document.to_xml(),
        matched_elements: elements.len(),
        elements,
    }
}
