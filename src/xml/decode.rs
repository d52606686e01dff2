use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use super::{Element, Entry, Node};
use crate::core::AnafError;

const INVALID_XML: &str = "Invalid XML provided";

/// Decode an XML document into an [`Element`] tree.
///
/// Tag and attribute names lose their namespace prefix, whitespace-only text
/// is dropped, a tag seen once under a parent becomes [`Entry::Single`] and
/// attribute-bearing text elements keep their text as `content`. With
/// `include_root` the document element's local name is kept as the `@root`
/// marker.
///
/// ```
/// let doc = anaf::xml::convert(
///     r#"<header xmlns="mfp:anaf:dgti:spv:respUploadFisier:v1" index_incarcare="3828"/>"#,
///     false,
/// )
/// .unwrap();
/// assert_eq!(doc.attribute("index_incarcare"), Some("3828"));
/// assert_eq!(doc.root(), None);
/// ```
///
/// # Errors
///
/// [`AnafError::Xml`] with the parser diagnostic for malformed input, or
/// `"Invalid XML provided"` when the document has no root element.
pub fn convert(xml: &str, include_root: bool) -> Result<Element, AnafError> {
    let mut reader = Reader::from_str(xml);
    let config = reader.config_mut();
    config.trim_text(true);
    config.expand_empty_elements = true;
    config.check_end_names = true;

    let mut stack: Vec<Frame> = Vec::new();
    let mut root: Option<(String, Node)> = None;

    loop {
        let event = reader.read_event().map_err(|e| AnafError::Xml(e.to_string()))?;
        match event {
            Event::Start(ref e) => {
                if root.is_some() {
                    return Err(AnafError::Xml(
                        "Extra content at the end of the document".into(),
                    ));
                }
                stack.push(Frame::open(e)?);
            }
            Event::Text(ref e) => {
                let text = e.unescape().map_err(|e| AnafError::Xml(e.to_string()))?;
                push_text(&mut stack, root.is_some(), text.trim())?;
            }
            Event::CData(ref e) => {
                let text = std::str::from_utf8(e).map_err(|e| AnafError::Xml(e.to_string()))?;
                push_text(&mut stack, root.is_some(), text.trim())?;
            }
            Event::End(_) => {
                let Some(frame) = stack.pop() else {
                    return Err(AnafError::Xml(INVALID_XML.into()));
                };
                let (name, node) = frame.close();
                match stack.last_mut() {
                    Some(parent) => parent.add_child(name, node),
                    None => root = Some((name, node)),
                }
            }
            Event::Eof => break,
            // Declarations, comments, processing instructions, DOCTYPE.
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(AnafError::Xml(format!(
            "Premature end of data in tag {}",
            open.name
        )));
    }

    let (name, node) = root.ok_or_else(|| AnafError::Xml(INVALID_XML.into()))?;
    let mut element = match node {
        Node::Element(element) => element,
        Node::Text(text) => Element {
            content: Some(text),
            ..Element::default()
        },
    };
    if include_root {
        element.root = Some(name);
    }
    Ok(element)
}

fn push_text(stack: &mut [Frame], after_root: bool, text: &str) -> Result<(), AnafError> {
    if text.is_empty() {
        return Ok(());
    }
    match stack.last_mut() {
        // Last non-empty text node wins, as with a DOM walk.
        Some(frame) => {
            frame.text = Some(text.to_string());
            Ok(())
        }
        None if after_root => Err(AnafError::Xml(
            "Extra content at the end of the document".into(),
        )),
        None => Err(AnafError::Xml("Start tag expected, '<' not found".into())),
    }
}

/// An element whose end tag has not been seen yet.
struct Frame {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<(String, Vec<Node>)>,
    text: Option<String>,
}

impl Frame {
    fn open(start: &BytesStart<'_>) -> Result<Self, AnafError> {
        let name = utf8(start.local_name().as_ref())?.to_string();

        let mut attributes: Vec<(String, String)> = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|e| AnafError::Xml(e.to_string()))?;
            if attr.key.as_namespace_binding().is_some() {
                continue;
            }
            let key = utf8(attr.key.local_name().as_ref())?.to_string();
            let value = attr
                .unescape_value()
                .map_err(|e| AnafError::Xml(e.to_string()))?
                .into_owned();
            // Keyed by local name: the first position is kept, the last value wins.
            match attributes.iter_mut().find(|(k, _)| *k == key) {
                Some((_, slot)) => *slot = value,
                None => attributes.push((key, value)),
            }
        }

        Ok(Self {
            name,
            attributes,
            children: Vec::new(),
            text: None,
        })
    }

    fn add_child(&mut self, name: String, node: Node) {
        match self.children.iter_mut().find(|(key, _)| *key == name) {
            Some((_, nodes)) => nodes.push(node),
            None => self.children.push((name, vec![node])),
        }
    }

    fn close(self) -> (String, Node) {
        let Frame {
            name,
            attributes,
            children,
            text,
        } = self;

        // Child elements take precedence over stray text in mixed content.
        if children.is_empty() {
            if let Some(text) = text {
                if attributes.is_empty() {
                    return (name, Node::Text(text));
                }
                let element = Element {
                    attributes,
                    content: Some(text),
                    ..Element::default()
                };
                return (name, Node::Element(element));
            }
        }

        let children = children
            .into_iter()
            .map(|(key, mut nodes)| {
                let entry = if nodes.len() == 1 {
                    Entry::Single(nodes.remove(0))
                } else {
                    Entry::Multiple(nodes)
                };
                (key, entry)
            })
            .collect();

        let element = Element {
            children,
            attributes,
            content: None,
            root: None,
        };
        (name, Node::Element(element))
    }
}

fn utf8(bytes: &[u8]) -> Result<&str, AnafError> {
    std::str::from_utf8(bytes).map_err(|e| AnafError::Xml(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_child_collapses() {
        let doc = convert("<a><b>1</b></a>", false).unwrap();
        assert!(matches!(doc.get("b"), Some(Entry::Single(Node::Text(t))) if t == "1"));
    }

    #[test]
    fn repeated_child_stays_sequence() {
        let doc = convert("<a><b>1</b><c/><b>2</b></a>", false).unwrap();
        let texts: Vec<_> = doc.children("b").iter().filter_map(Node::text).collect();
        assert_eq!(texts, ["1", "2"]);
        assert_eq!(doc.keys().collect::<Vec<_>>(), ["b", "c"]);
    }

    #[test]
    fn namespace_prefixes_are_dropped() {
        let doc = convert(
            r#"<ns:a xmlns:ns="urn:x" xmlns:xsi="urn:xsi"><ns:b xsi:type="t">v</ns:b></ns:a>"#,
            false,
        )
        .unwrap();
        let b = doc.child("b").unwrap();
        assert_eq!(b.attribute("type"), Some("t"));
        assert_eq!(b.text(), Some("v"));
        assert!(!doc.has_attributes());
    }

    #[test]
    fn clashing_attribute_local_names_keep_last_value() {
        let doc = convert(r#"<a xmlns:x="urn:x" x:id="1" type="t" id="2"/>"#, false).unwrap();
        assert_eq!(doc.attribute("id"), Some("2"));
        assert_eq!(doc.attributes().count(), 2);
    }

    #[test]
    fn empty_element_is_empty_mapping() {
        let doc = convert("<a><b/></a>", false).unwrap();
        let b = doc.child("b").unwrap().as_element().unwrap();
        assert!(b.is_empty());
    }

    #[test]
    fn zero_text_is_kept() {
        let doc = convert("<a><b>0</b></a>", false).unwrap();
        assert_eq!(doc.child("b").and_then(Node::text), Some("0"));
    }

    #[test]
    fn entities_and_cdata() {
        let doc = convert("<a><b>x &amp; y</b><c><![CDATA[ <raw> ]]></c></a>", false).unwrap();
        assert_eq!(doc.child("b").and_then(Node::text), Some("x & y"));
        assert_eq!(doc.child("c").and_then(Node::text), Some("<raw>"));
    }

    #[test]
    fn scalar_root_becomes_content() {
        let doc = convert("<a>hello</a>", true).unwrap();
        assert_eq!(doc.content(), Some("hello"));
        assert_eq!(doc.root(), Some("a"));
    }

    #[test]
    fn mismatched_end_tag_fails() {
        assert!(matches!(convert("<a><b></a>", false), Err(AnafError::Xml(_))));
    }

    #[test]
    fn unclosed_root_fails() {
        assert!(matches!(convert("<a><b>x</b>", false), Err(AnafError::Xml(_))));
    }

    #[test]
    fn second_root_fails() {
        let err = convert("<a/><b/>", false).unwrap_err();
        assert_eq!(err.to_string(), "Extra content at the end of the document");
    }

    #[test]
    fn no_root_fails_generically() {
        for input in ["", "   ", "<?xml version=\"1.0\"?>", "<!-- only a comment -->"] {
            let err = convert(input, false).unwrap_err();
            assert_eq!(err.to_string(), "Invalid XML provided", "input: {input:?}");
        }
    }

    #[test]
    fn text_outside_root_fails() {
        assert!(convert("hello", false).is_err());
        assert!(convert("<a/>trailing", false).is_err());
    }
}
