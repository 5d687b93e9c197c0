//! Document parsing errors.

use quick_xml::escape::EscapeError;
use quick_xml::events::attributes::AttrError;
use thiserror::Error;

/// Reasons a document is rejected as not well-formed.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("XML syntax error at byte {position}")]
    Syntax {
        position: usize,
        #[source]
        source: quick_xml::Error,
    },

    #[error("malformed attribute")]
    Attribute(#[from] AttrError),

    #[error("invalid escape sequence in attribute value")]
    Escape(#[from] EscapeError),

    #[error("cannot copy markup through: {0}")]
    Passthrough(String),

    #[error("invalid UTF-8 in markup")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("closing tag `</{found}>` does not match open element `<{expected}>`")]
    MismatchedEnd { expected: String, found: String },

    #[error("closing tag `</{0}>` has no open element")]
    UnexpectedEnd(String),

    #[error("element `<{0}>` is never closed")]
    Unclosed(String),

    #[error("document has no root element")]
    NoRoot,

    #[error("document has more than one root element (second is `<{0}>`)")]
    MultipleRoots(String),

    #[error("text outside the root element")]
    TextOutsideRoot,
}
