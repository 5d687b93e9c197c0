//! In-memory document tree.
//!
//! The tree is built from text with `quick-xml` and keeps everything needed to
//! write the document back out faithfully:
//!
//! - elements keep their qualified tag name and self-closing form
//! - attributes keep their insertion order and, until overwritten, their raw
//!   escaped text (so `xmlns`/`xmlns:xlink` and untouched values round-trip)
//! - everything that is not an element (text, comments, CDATA, processing
//!   instructions, the XML declaration, doctype) is kept as raw markup
//!
//! Children are owned by their parent; there are no back-edges. Elements below
//! the root are addressed by [`ElementPath`], the list of child indices from
//! the root down, which stays valid as long as the structure is not changed.

use quick_xml::{Reader, Writer};
use quick_xml::escape::unescape;
use quick_xml::events::{BytesStart, Event};
use serde::ser::{Serialize, SerializeMap, Serializer};

use super::error::DocumentError;
use crate::utils::xml::local_name;

/// Position of an element in the tree: child indices from the root down.
///
/// The root itself is the empty path.
pub type ElementPath = Vec<usize>;

// ============================================================================
// Attributes
// ============================================================================

/// A single attribute.
#[derive(Debug, Clone)]
pub struct Attribute {
    name: String,
    value: String,
    /// Escaped source text between the quotes, dropped once the value changes.
    raw: Option<String>,
    /// Quote character the source used; `"` for changed or added values.
    quote: char,
}

// Equality is by name and value; how the value was spelled in the source does not matter.
impl PartialEq for Attribute {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.value == other.value
    }
}

impl Eq for Attribute {}

impl Attribute {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Source text to write between the quotes, if still untouched.
    pub(super) fn raw(&self) -> Option<&str> {
        self.raw.as_deref()
    }

    pub(super) fn quote(&self) -> char {
        self.quote
    }
}

/// Ordered attribute map.
///
/// Insertion order is kept; overwriting a value keeps its position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    entries: Vec<Attribute>,
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|attr| attr.name == name)
            .map(|attr| attr.value.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|attr| attr.name == name)
    }

    /// Set a value, replacing an existing one in place or appending.
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.entries.iter_mut().find(|attr| attr.name == name) {
            Some(attr) => {
                if attr.value != value {
                    attr.value = value;
                    attr.raw = None;
                    attr.quote = '"';
                }
            }
            None => self.entries.push(Attribute {
                name: name.to_string(),
                value,
                raw: None,
                quote: '"',
            }),
        }
    }

    /// Append a parsed attribute, keeping its source text.
    fn push_parsed(&mut self, name: String, value: String, raw: String, quote: char) {
        self.entries.push(Attribute {
            name,
            value,
            raw: Some(raw),
            quote,
        });
    }

    pub fn iter(&self) -> impl Iterator<Item = &Attribute> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for Attributes {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for attr in &self.entries {
            map.serialize_entry(&attr.name, &attr.value)?;
        }
        map.end()
    }
}

/// Quote character of each attribute in the raw attribute text of a start
/// tag, in source order.
fn attribute_quotes(raw: &[u8]) -> Vec<char> {
    let mut quotes = Vec::new();
    let mut rest = raw;
    while let Some(eq) = rest.iter().position(|&b| b == b'=') {
        rest = &rest[eq + 1..];
        let Some(open) = rest.iter().position(|b| !b.is_ascii_whitespace()) else {
            break;
        };
        let quote = rest[open];
        if quote != b'"' && quote != b'\'' {
            break;
        }
        rest = &rest[open + 1..];
        let Some(close) = rest.iter().position(|&b| b == quote) else {
            break;
        };
        quotes.push(char::from(quote));
        rest = &rest[close + 1..];
    }
    quotes
}

// ============================================================================
// Nodes
// ============================================================================

/// A child of an element, or a top-level item around the root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    /// Markup copied through verbatim.
    Raw(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    name: String,
    attributes: Attributes,
    children: Vec<Node>,
    self_closing: bool,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Attributes::new(),
            children: Vec::new(),
            self_closing: true,
        }
    }

    fn from_start(tag: &BytesStart<'_>, self_closing: bool) -> Result<Self, DocumentError> {
        let name = std::str::from_utf8(tag.name().as_ref())?.to_string();
        let mut attributes = Attributes::new();
        let mut quotes = attribute_quotes(tag.attributes_raw()).into_iter();
        for attr in tag.attributes() {
            let attr = attr?;
            let key = std::str::from_utf8(attr.key.as_ref())?.to_string();
            let raw = std::str::from_utf8(&attr.value)?;
            let value = unescape(raw)?.into_owned();
            let quote = quotes.next().unwrap_or('"');
            attributes.push_parsed(key, value, raw.to_string(), quote);
        }
        Ok(Self {
            name,
            attributes,
            children: Vec::new(),
            self_closing,
        })
    }

    /// Qualified tag name as written (`circle`, `svg:circle`).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Tag name without namespace prefix.
    pub fn local_name(&self) -> &str {
        local_name(&self.name)
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn attributes_mut(&mut self) -> &mut Attributes {
        &mut self.attributes
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name)
    }

    /// Identifier, treating an empty `id` as absent.
    pub fn id(&self) -> Option<&str> {
        self.attr("id").filter(|id| !id.is_empty())
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub(super) fn is_self_closing(&self) -> bool {
        self.self_closing && self.children.is_empty()
    }

    /// Append a child node.
    pub fn push(&mut self, node: Node) {
        self.self_closing = false;
        self.children.push(node);
    }

    /// All elements below this one in document order, with their paths
    /// relative to this element.
    pub fn descendants(&self) -> Descendants<'_> {
        let mut stack = Vec::new();
        push_children(&mut stack, &[], self);
        Descendants { stack }
    }

    /// Resolve a path relative to this element.
    pub fn element_at(&self, path: &[usize]) -> Option<&Element> {
        let mut current = self;
        for &index in path {
            current = match current.children.get(index)? {
                Node::Element(element) => element,
                Node::Raw(_) => return None,
            };
        }
        Some(current)
    }

    /// Resolve a path relative to this element, mutably.
    pub fn element_at_mut(&mut self, path: &[usize]) -> Option<&mut Element> {
        let mut current = self;
        for &index in path {
            current = match current.children.get_mut(index)? {
                Node::Element(element) => element,
                Node::Raw(_) => return None,
            };
        }
        Some(current)
    }
}

/// Depth-first, parent-before-children iterator over elements.
pub struct Descendants<'a> {
    stack: Vec<(ElementPath, &'a Element)>,
}

fn push_children<'a>(
    stack: &mut Vec<(ElementPath, &'a Element)>,
    path: &[usize],
    element: &'a Element,
) {
    // Reversed so the first child is popped first.
    for (index, child) in element.children.iter().enumerate().rev() {
        if let Node::Element(child) = child {
            let mut child_path = Vec::with_capacity(path.len() + 1);
            child_path.extend_from_slice(path);
            child_path.push(index);
            stack.push((child_path, child));
        }
    }
}

impl<'a> Iterator for Descendants<'a> {
    type Item = (ElementPath, &'a Element);

    fn next(&mut self) -> Option<Self::Item> {
        let (path, element) = self.stack.pop()?;
        push_children(&mut self.stack, &path, element);
        Some((path, element))
    }
}

// ============================================================================
// Document
// ============================================================================

/// A parsed document: one root element plus whatever surrounds it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub(super) prolog: Vec<Node>,
    pub(super) root: Element,
    pub(super) epilog: Vec<Node>,
}

impl Document {
    /// Parse well-formed markup.
    ///
    /// A leading byte order mark is kept as the first prolog node.
    pub fn parse(text: &str) -> Result<Self, DocumentError> {
        let mut builder = TreeBuilder::default();
        let body = match text.strip_prefix(BOM) {
            Some(rest) => {
                builder.prolog.push(Node::Raw(BOM.to_string()));
                rest
            }
            None => text,
        };
        let offset = text.len() - body.len();

        let mut reader = Reader::from_str(body);
        reader.config_mut().trim_text(false);

        loop {
            let event = reader.read_event().map_err(|source| DocumentError::Syntax {
                position: position(reader.error_position()).saturating_add(offset),
                source,
            })?;

            match event {
                Event::Start(tag) => builder.open(Element::from_start(&tag, false)?),
                Event::Empty(tag) => builder.attach(Node::Element(Element::from_start(&tag, true)?))?,
                Event::End(tag) => builder.close(std::str::from_utf8(tag.name().as_ref())?)?,
                Event::Text(text) => builder.text(std::str::from_utf8(&text)?)?,
                Event::Eof => break,
                event => builder.attach(Node::Raw(raw_markup(event)?))?,
            }
        }
        builder.finish()
    }

    pub fn root(&self) -> &Element {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut Element {
        &mut self.root
    }

    /// Every element, root included, in document order.
    pub fn elements(&self) -> impl Iterator<Item = (ElementPath, &Element)> {
        std::iter::once((Vec::new(), &self.root)).chain(self.root.descendants())
    }

    pub fn element_at(&self, path: &[usize]) -> Option<&Element> {
        self.root.element_at(path)
    }

    pub fn element_at_mut(&mut self, path: &[usize]) -> Option<&mut Element> {
        self.root.element_at_mut(path)
    }

    /// Path of the first element (root included) whose `id` equals `id`.
    ///
    /// Linear scan in document order; with duplicate ids the first one wins.
    pub fn find_by_id(&self, id: &str) -> Option<ElementPath> {
        self.elements()
            .find(|(_, element)| element.attr("id") == Some(id))
            .map(|(path, _)| path)
    }
}

const BOM: char = '\u{feff}';

#[inline]
fn position(offset: u64) -> usize {
    usize::try_from(offset).unwrap_or(usize::MAX)
}

/// Write a non-element event back out exactly as the writer would emit it.
fn raw_markup(event: Event<'_>) -> Result<String, DocumentError> {
    let mut writer = Writer::new(Vec::new());
    writer
        .write_event(event)
        .map_err(|err| DocumentError::Passthrough(err.to_string()))?;
    String::from_utf8(writer.into_inner()).map_err(|err| DocumentError::Utf8(err.utf8_error()))
}

/// Stack machine turning reader events into a tree.
#[derive(Default)]
struct TreeBuilder {
    open: Vec<Element>,
    prolog: Vec<Node>,
    root: Option<Element>,
    epilog: Vec<Node>,
}

impl TreeBuilder {
    fn open(&mut self, element: Element) {
        self.open.push(element);
    }

    fn close(&mut self, name: &str) -> Result<(), DocumentError> {
        let element = self
            .open
            .pop()
            .ok_or_else(|| DocumentError::UnexpectedEnd(name.to_string()))?;
        if element.name != name {
            return Err(DocumentError::MismatchedEnd {
                expected: element.name,
                found: name.to_string(),
            });
        }
        self.attach(Node::Element(element))
    }

    fn text(&mut self, raw: &str) -> Result<(), DocumentError> {
        if self.open.is_empty() && !raw.trim().is_empty() {
            return Err(DocumentError::TextOutsideRoot);
        }
        self.attach(Node::Raw(raw.to_string()))
    }

    fn attach(&mut self, node: Node) -> Result<(), DocumentError> {
        if let Some(parent) = self.open.last_mut() {
            parent.push(node);
            return Ok(());
        }
        match node {
            Node::Element(element) => {
                if self.root.is_some() {
                    return Err(DocumentError::MultipleRoots(element.name));
                }
                self.root = Some(element);
            }
            Node::Raw(raw) if self.root.is_none() => self.prolog.push(Node::Raw(raw)),
            Node::Raw(raw) => self.epilog.push(Node::Raw(raw)),
        }
        Ok(())
    }

    fn finish(self) -> Result<Document, DocumentError> {
        if let Some(element) = self.open.last() {
            return Err(DocumentError::Unclosed(element.name.clone()));
        }
        let root = self.root.ok_or(DocumentError::NoRoot)?;
        Ok(Document {
            prolog: self.prolog,
            root,
            epilog: self.epilog,
        })
    }
}
