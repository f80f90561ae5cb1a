//! # XML Construction — Canonical Byte Production
//!
//! The document tree is built from typed `XmlElement` values and rendered
//! through one canonicalization path. `CanonicalXml` has a private inner
//! field; the only way to construct it is [`XmlElement::canonical()`], so
//! any function that digests or signs XML must accept `&CanonicalXml` and
//! therefore cannot be handed bytes produced some other way.
//!
//! ## Canonical Form
//!
//! - UTF-8, no XML declaration inside canonical output.
//! - Attributes sorted lexicographically by name, double-quoted.
//! - No inter-element whitespace; empty elements render as `<a></a>`,
//!   never self-closing.
//! - Text escapes `&`, `<`, `>`; attribute values additionally escape `"`.
//! - `Verbatim` nodes pass through byte-for-byte. The authorization block
//!   extracted from a CAF file is embedded this way and never re-encoded.
//!
//! Signed documents are rendered with [`XmlElement::render_document()`],
//! which emits the declaration followed by the same canonical body, so the
//! bytes a verifier re-canonicalizes are the bytes that were signed.

/// A node in the document tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlNode {
    /// A child element.
    Element(XmlElement),
    /// Character data, escaped on render.
    Text(String),
    /// Raw markup passed through untouched (CAF authorization block).
    Verbatim(String),
}

/// An XML element: name, attributes, ordered children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlElement {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<XmlNode>,
}

impl XmlElement {
    /// New element with no attributes or children.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Builder: add an attribute.
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    /// Builder: append a child element.
    pub fn child(mut self, element: XmlElement) -> Self {
        self.children.push(XmlNode::Element(element));
        self
    }

    /// Builder: append a leaf child element containing text.
    pub fn text(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.children.push(XmlNode::Element(
            XmlElement::new(name).content(value.to_string()),
        ));
        self
    }

    /// Builder: append a leaf child only when the value is present.
    pub fn opt_text<T: ToString>(self, name: impl Into<String>, value: Option<T>) -> Self {
        match value {
            Some(v) => self.text(name, v),
            None => self,
        }
    }

    /// Builder: set this element's own character data.
    pub fn content(mut self, value: impl Into<String>) -> Self {
        self.children.push(XmlNode::Text(value.into()));
        self
    }

    /// Builder: append raw markup, passed through untouched on render.
    pub fn verbatim(mut self, raw: impl Into<String>) -> Self {
        self.children.push(XmlNode::Verbatim(raw.into()));
        self
    }

    /// Append a child element in place.
    pub fn push_child(&mut self, element: XmlElement) {
        self.children.push(XmlNode::Element(element));
    }

    /// Element name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Attribute value by name.
    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Set or replace an attribute in place.
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((name, value)),
        }
    }

    /// Child elements, in document order.
    pub fn child_elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|node| match node {
            XmlNode::Element(el) => Some(el),
            _ => None,
        })
    }

    /// Depth-first search for the first descendant (or self) with `name`.
    pub fn find(&self, name: &str) -> Option<&XmlElement> {
        if self.name == name {
            return Some(self);
        }
        self.child_elements().find_map(|el| el.find(name))
    }

    /// Mutable depth-first search for the first descendant (or self) with `name`.
    pub fn find_mut(&mut self, name: &str) -> Option<&mut XmlElement> {
        if self.name == name {
            return Some(self);
        }
        for node in &mut self.children {
            if let XmlNode::Element(el) = node {
                if let Some(found) = el.find_mut(name) {
                    return Some(found);
                }
            }
        }
        None
    }

    /// Concatenated character data directly under this element.
    pub fn text_content(&self) -> String {
        self.children
            .iter()
            .filter_map(|node| match node {
                XmlNode::Text(t) => Some(t.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Render this element in canonical form. The sole constructor of
    /// [`CanonicalXml`].
    pub fn canonical(&self) -> CanonicalXml {
        let mut out = String::new();
        self.render_into(&mut out);
        CanonicalXml(out.into_bytes())
    }

    /// Render a complete document: XML declaration plus canonical body.
    pub fn render_document(&self) -> Vec<u8> {
        let mut out = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        self.render_into(&mut out);
        out.into_bytes()
    }

    fn render_into(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.name);
        let mut attrs: Vec<&(String, String)> = self.attributes.iter().collect();
        attrs.sort_by(|a, b| a.0.cmp(&b.0));
        for (name, value) in attrs {
            out.push(' ');
            out.push_str(name);
            out.push_str("=\"");
            out.push_str(&escape_attribute(value));
            out.push('"');
        }
        out.push('>');
        for node in &self.children {
            match node {
                XmlNode::Element(el) => el.render_into(out),
                XmlNode::Text(t) => out.push_str(&escape_text(t)),
                XmlNode::Verbatim(raw) => out.push_str(raw),
            }
        }
        out.push_str("</");
        out.push_str(&self.name);
        out.push('>');
    }
}

/// Canonical XML bytes, produced exclusively by [`XmlElement::canonical()`].
///
/// The inner field is private: downstream code cannot fabricate a
/// `CanonicalXml` from arbitrary bytes, so everything that reaches a digest
/// or a signature went through the one rendering path above.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalXml(Vec<u8>);

impl CanonicalXml {
    /// The canonical bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the canonical byte sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for CanonicalXml {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

fn escape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

fn escape_attribute(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
