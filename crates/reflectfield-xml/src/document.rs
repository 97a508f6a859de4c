//! Arena-backed document tree.
//!
//! A [`Document`] stores every node (root, elements, attributes, text) in one
//! vector in document order, so a node id doubles as its document position.
//! Whitespace-only text between elements is dropped; comments, processing
//! instructions and declarations are skipped.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::error::XmlError;

/// Index of a node inside its [`Document`]. Ordering is document order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// The document root (the parent of the document element).
    pub const ROOT: Self = Self(0);
}

/// What a node is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// The document root.
    Root,
    /// An element with its tag name.
    Element(String),
    /// An attribute of an element.
    Attribute {
        /// Attribute name.
        name: String,
        /// Unescaped attribute value.
        value: String,
    },
    /// A run of character data.
    Text(String),
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    attributes: Vec<NodeId>,
}

impl Node {
    fn new(kind: NodeKind, parent: Option<NodeId>) -> Self {
        Self {
            kind,
            parent,
            children: Vec::new(),
            attributes: Vec::new(),
        }
    }
}

/// An immutable XML document tree.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
}

impl Default for Document {
    fn default() -> Self {
        Self::empty()
    }
}

impl Document {
    /// A document with a root but no document element.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            nodes: vec![Node::new(NodeKind::Root, None)],
        }
    }

    /// Parse XML text into a document.
    ///
    /// # Errors
    ///
    /// Returns `XmlError` if the XML is not well formed, has more than one
    /// document element, or carries text outside the document element.
    pub fn parse(xml: &str) -> Result<Self, XmlError> {
        let mut reader = Reader::from_str(xml);
        let mut doc = Self::empty();
        let mut stack = vec![NodeId::ROOT];
        let mut text = String::new();

        loop {
            match reader.read_event()? {
                Event::Start(e) => {
                    let parent = current(&stack);
                    doc.flush_text(parent, &mut text)?;
                    let id = doc.push_element(parent, &e)?;
                    stack.push(id);
                }
                Event::Empty(e) => {
                    let parent = current(&stack);
                    doc.flush_text(parent, &mut text)?;
                    doc.push_element(parent, &e)?;
                }
                Event::End(_) => {
                    doc.flush_text(current(&stack), &mut text)?;
                    if stack.len() <= 1 {
                        return Err(XmlError::Malformed("unexpected closing tag".to_owned()));
                    }
                    stack.pop();
                }
                Event::Text(e) => {
                    let decoded = e.decode().map_err(|err| XmlError::Decode(err.to_string()))?;
                    let unescaped = quick_xml::escape::unescape(&decoded)
                        .map_err(|err| XmlError::Decode(err.to_string()))?;
                    text.push_str(&unescaped);
                }
                Event::CData(e) => {
                    let raw = std::str::from_utf8(&e).map_err(|err| XmlError::Decode(err.to_string()))?;
                    text.push_str(raw);
                }
                Event::GeneralRef(e) => {
                    let name = e.decode().map_err(|err| XmlError::Decode(err.to_string()))?;
                    text.push_str(&resolve_reference(&name)?);
                }
                Event::Eof => break,
                // Declarations, comments, processing instructions, doctypes.
                _ => {}
            }
        }

        if stack.len() > 1 {
            let open = doc.name(current(&stack)).to_owned();
            return Err(XmlError::Malformed(format!("unclosed element <{open}>")));
        }
        doc.flush_text(NodeId::ROOT, &mut text)?;

        tracing::trace!(nodes = doc.nodes.len(), "parsed document");
        Ok(doc)
    }

    fn push_node(&mut self, kind: NodeKind, parent: NodeId) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new(kind, Some(parent)));
        id
    }

    fn push_element(&mut self, parent: NodeId, start: &BytesStart<'_>) -> Result<NodeId, XmlError> {
        if parent == NodeId::ROOT && self.document_element().is_some() {
            return Err(XmlError::Malformed("more than one document element".to_owned()));
        }

        let name = decode_name(start.name().as_ref())?;
        let id = self.push_node(NodeKind::Element(name), parent);
        self.nodes[parent.0].children.push(id);

        for attr in start.attributes() {
            let attr = attr?;
            let name = decode_name(attr.key.as_ref())?;
            let raw = std::str::from_utf8(&attr.value).map_err(|err| XmlError::Decode(err.to_string()))?;
            let value = quick_xml::escape::unescape(raw)
                .map_err(|err| XmlError::Decode(err.to_string()))?
                .into_owned();
            let attr_id = self.push_node(NodeKind::Attribute { name, value }, id);
            self.nodes[id.0].attributes.push(attr_id);
        }

        Ok(id)
    }

    fn flush_text(&mut self, parent: NodeId, text: &mut String) -> Result<(), XmlError> {
        if text.trim().is_empty() {
            text.clear();
            return Ok(());
        }
        if parent == NodeId::ROOT {
            return Err(XmlError::Malformed("text outside the document element".to_owned()));
        }
        let id = self.push_node(NodeKind::Text(std::mem::take(text)), parent);
        self.nodes[parent.0].children.push(id);
        Ok(())
    }

    /// The document root node.
    #[must_use]
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// The outermost element, if any.
    #[must_use]
    pub fn document_element(&self) -> Option<NodeId> {
        self.nodes[0].children.first().copied()
    }

    /// Number of nodes in the arena, attributes and text included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the document has no document element.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.document_element().is_none()
    }

    /// The kind of `id`.
    #[must_use]
    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.0].kind
    }

    /// Parent of `id`; attributes report their owning element.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    /// Element and text children of `id`, in document order.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// Attributes of `id`, in document order.
    #[must_use]
    pub fn attributes(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].attributes
    }

    /// Tag or attribute name of `id`; empty for the root and text nodes.
    #[must_use]
    pub fn name(&self, id: NodeId) -> &str {
        match self.kind(id) {
            NodeKind::Element(name) | NodeKind::Attribute { name, .. } => name,
            NodeKind::Root | NodeKind::Text(_) => "",
        }
    }

    /// All element and text descendants of `id` in document order.
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut pending: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(next) = pending.pop() {
            out.push(next);
            pending.extend(self.children(next).iter().rev().copied());
        }
        out
    }

    /// The XPath string-value of `id`.
    #[must_use]
    pub fn string_value(&self, id: NodeId) -> String {
        match self.kind(id) {
            NodeKind::Attribute { value, .. } => value.clone(),
            NodeKind::Text(text) => text.clone(),
            NodeKind::Root | NodeKind::Element(_) => self
                .descendants(id)
                .into_iter()
                .filter_map(|n| match self.kind(n) {
                    NodeKind::Text(text) => Some(text.as_str()),
                    _ => None,
                })
                .collect(),
        }
    }
}

fn current(stack: &[NodeId]) -> NodeId {
    stack.last().copied().unwrap_or(NodeId::ROOT)
}

fn decode_name(raw: &[u8]) -> Result<String, XmlError> {
    std::str::from_utf8(raw)
        .map(str::to_owned)
        .map_err(|err| XmlError::Decode(err.to_string()))
}

/// Resolve a character or predefined entity reference (`#38`, `#x26`, `amp`).
fn resolve_reference(name: &str) -> Result<String, XmlError> {
    if let Some(code) = name.strip_prefix('#') {
        let parsed = match code.strip_prefix('x') {
            Some(hex) => u32::from_str_radix(hex, 16),
            None => code.parse::<u32>(),
        };
        return parsed
            .ok()
            .and_then(char::from_u32)
            .map(String::from)
            .ok_or_else(|| XmlError::Decode(format!("invalid character reference &{name};")));
    }

    quick_xml::escape::resolve_predefined_entity(name)
        .map(str::to_owned)
        .ok_or_else(|| XmlError::Decode(format!("unknown entity &{name};")))
}
