use serde::ser::{Serialize, SerializeMap, Serializer};

use super::{ATTRIBUTES_KEY, CONTENT_KEY, ROOT_KEY};

/// A decoded XML value: either text, or an element with children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Trimmed text of an attribute-less element without child elements.
    Text(String),
    /// Anything else.
    Element(Element),
}

/// The children of one tag name under a parent.
///
/// A tag that appears once is stored as `Single`, never as a one-element
/// `Multiple`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    Single(Node),
    Multiple(Vec<Node>),
}

/// An element as an ordered map from child local name to [`Entry`], plus
/// its attributes and, when it carries attributes but only text, that text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    pub(crate) children: Vec<(String, Entry)>,
    pub(crate) attributes: Vec<(String, String)>,
    pub(crate) content: Option<String>,
    pub(crate) root: Option<String>,
}

impl Node {
    /// The text of a scalar node, or the `@content` of an element.
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Text(t) => Some(t),
            Self::Element(e) => e.content(),
        }
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Self::Element(e) => Some(e),
            Self::Text(_) => None,
        }
    }

    /// Shortcut for [`Element::child`] on element nodes.
    pub fn child(&self, name: &str) -> Option<&Node> {
        self.as_element().and_then(|e| e.child(name))
    }

    /// Shortcut for [`Element::attribute`] on element nodes.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.as_element().and_then(|e| e.attribute(name))
    }
}

impl Entry {
    /// All nodes of this entry, one or many.
    pub fn as_slice(&self) -> &[Node] {
        match self {
            Self::Single(node) => std::slice::from_ref(node),
            Self::Multiple(nodes) => nodes,
        }
    }

    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    pub fn is_empty(&self) -> bool {
        self.as_slice().is_empty()
    }

    /// The first node.
    pub fn first(&self) -> Option<&Node> {
        self.as_slice().first()
    }
}

impl Element {
    /// Look up the entry for a child local name.
    pub fn get(&self, name: &str) -> Option<&Entry> {
        self.children
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, entry)| entry)
    }

    /// First child with the given local name.
    pub fn child(&self, name: &str) -> Option<&Node> {
        self.get(name).and_then(Entry::first)
    }

    /// All children with the given local name, in document order.
    pub fn children(&self, name: &str) -> &[Node] {
        self.get(name).map(Entry::as_slice).unwrap_or(&[])
    }

    /// Child local names in first-occurrence order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.children.iter().map(|(key, _)| key.as_str())
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &Entry)> {
        self.children.iter().map(|(key, entry)| (key.as_str(), entry))
    }

    /// Attribute value by local name.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Attributes in document order, namespace declarations excluded.
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    pub fn has_attributes(&self) -> bool {
        !self.attributes.is_empty()
    }

    /// Text of an element that has attributes but no child elements.
    pub fn content(&self) -> Option<&str> {
        self.content.as_deref()
    }

    /// Local name of the document element, when requested at decode time.
    pub fn root(&self) -> Option<&str> {
        self.root.as_deref()
    }

    /// Drop the `@root` marker.
    pub fn without_root(mut self) -> Self {
        self.root = None;
        self
    }

    /// True when there are no children, attributes, content or root marker.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
            && self.attributes.is_empty()
            && self.content.is_none()
            && self.root.is_none()
    }
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Text(text) => serializer.serialize_str(text),
            Self::Element(element) => element.serialize(serializer),
        }
    }
}

impl Serialize for Entry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Single(node) => node.serialize(serializer),
            Self::Multiple(nodes) => nodes.serialize(serializer),
        }
    }
}

/// Serializes with the reserved-key layout: child names, then `@content`,
/// `@attributes` and `@root` when present.
impl Serialize for Element {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        for (key, entry) in &self.children {
            map.serialize_entry(key, entry)?;
        }
        if let Some(content) = &self.content {
            map.serialize_entry(CONTENT_KEY, content)?;
        }
        if !self.attributes.is_empty() {
            map.serialize_entry(ATTRIBUTES_KEY, &AttributeMap(&self.attributes))?;
        }
        if let Some(root) = &self.root {
            map.serialize_entry(ROOT_KEY, root)?;
        }
        map.end()
    }
}

struct AttributeMap<'a>(&'a [(String, String)]);

impl Serialize for AttributeMap<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in self.0 {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}
