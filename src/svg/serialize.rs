//! Render a [`Document`] back to markup.
//!
//! Raw nodes and untouched attribute values are written exactly as parsed,
//! in their original quotes.
//! Attributes whose value changed (or that were added) are written
//! double-quoted and escaped. Namespace declarations are ordinary attributes
//! here, so `xmlns` and `xmlns:xlink` come back out unchanged.

use std::fmt::{self, Write};

use super::document::{Attribute, Document, Element, Node};
use crate::utils::xml::escape_attr;

impl Document {
    /// Serialize the whole document.
    pub fn to_xml(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for node in &self.prolog {
            write_node(f, node)?;
        }
        write_element(f, &self.root)?;
        for node in &self.epilog {
            write_node(f, node)?;
        }
        Ok(())
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_element(f, self)
    }
}

fn write_node(out: &mut impl Write, node: &Node) -> fmt::Result {
    match node {
        Node::Element(element) => write_element(out, element),
        Node::Raw(raw) => out.write_str(raw),
    }
}

fn write_element(out: &mut impl Write, element: &Element) -> fmt::Result {
    write!(out, "<{}", element.name())?;
    for attr in element.attributes().iter() {
        write_attribute(out, attr)?;
    }

    if element.is_self_closing() {
        return out.write_str("/>");
    }

    out.write_char('>')?;
    for child in element.children() {
        write_node(out, child)?;
    }
    write!(out, "</{}>", element.name())
}

fn write_attribute(out: &mut impl Write, attr: &Attribute) -> fmt::Result {
    match attr.raw() {
        Some(raw) => write!(out, " {}={q}{}{q}", attr.name(), raw, q = attr.quote()),
        None => write!(out, " {}=\"{}\"", attr.name(), escape_attr(attr.value())),
    }
}
