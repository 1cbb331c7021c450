//! Minimal attributed element tree over the `quick-xml` event stream.
//!
//! The structural validator wants node names, attribute pairs, child
//! elements and text content; this module reduces the event stream to
//! exactly that. Well-formedness failures surface as [`LoadError::Xml`],
//! everything downstream is grammar checking.

use crate::error::LoadError;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// One element of the document tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Element name.
    pub name: String,
    /// Attribute (name, value) pairs in document order.
    pub attrs: Vec<(String, String)>,
    /// Child elements in document order.
    pub children: Vec<Element>,
    /// Concatenated direct text content (escapes already resolved by the
    /// XML layer; the language's own `\DDD` scheme is untouched).
    pub text: String,
}

impl Element {
    fn from_start(start: &BytesStart<'_>) -> Result<Self, LoadError> {
        let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let mut attrs = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(xml_err)?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr.unescape_value().map_err(xml_err)?.into_owned();
            attrs.push((key, value));
        }
        Ok(Element {
            name,
            attrs,
            children: Vec::new(),
            text: String::new(),
        })
    }

    /// Values of every attribute with the given name.
    pub fn attr_values<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> {
        self.attrs
            .iter()
            .filter(move |(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

fn xml_err(err: impl std::fmt::Display) -> LoadError {
    LoadError::Xml {
        message: err.to_string(),
    }
}

/// Parse a document into its root element.
pub fn parse_document(source: &str) -> Result<Element, LoadError> {
    let mut reader = Reader::from_str(source);
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event().map_err(xml_err)? {
            Event::Start(start) => {
                if root.is_some() && stack.is_empty() {
                    return Err(xml_err("content after the root element"));
                }
                stack.push(Element::from_start(&start)?);
            }
            Event::Empty(start) => {
                if root.is_some() && stack.is_empty() {
                    return Err(xml_err("content after the root element"));
                }
                let element = Element::from_start(&start)?;
                attach(&mut stack, &mut root, element);
            }
            Event::End(_) => {
                // quick-xml has already checked the end tag matches.
                let element = stack
                    .pop()
                    .ok_or_else(|| xml_err("unmatched closing tag"))?;
                attach(&mut stack, &mut root, element);
            }
            Event::Text(text) => {
                let text = text.unescape().map_err(xml_err)?;
                push_text(&mut stack, root.is_some(), &text)?;
            }
            Event::CData(data) => {
                let text = String::from_utf8_lossy(&data.into_inner()).into_owned();
                push_text(&mut stack, root.is_some(), &text)?;
            }
            Event::Eof => break,
            // Declarations, comments, processing instructions and doctypes
            // carry no program content.
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(xml_err("unexpected end of document"));
    }
    root.ok_or_else(|| xml_err("no root element"))
}

fn attach(stack: &mut Vec<Element>, root: &mut Option<Element>, element: Element) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None => *root = Some(element),
    }
}

fn push_text(stack: &mut [Element], have_root: bool, text: &str) -> Result<(), LoadError> {
    match stack.last_mut() {
        Some(open) => {
            open.text.push_str(text);
            Ok(())
        }
        None if text.trim().is_empty() => Ok(()),
        None => {
            let place = if have_root { "after" } else { "before" };
            Err(xml_err(format!("text {place} the root element")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_empty_root() {
        let root = parse_document("<program/>").unwrap();
        assert_eq!(root.name, "program");
        assert!(root.attrs.is_empty());
        assert!(root.children.is_empty());
    }

    #[test]
    fn attributes_and_children() {
        let root = parse_document(
            r#"<program language="x"><instruction opcode="BREAK" order="1"/></program>"#,
        )
        .unwrap();
        assert_eq!(root.attrs, vec![("language".to_string(), "x".to_string())]);
        assert_eq!(root.children.len(), 1);
        assert_eq!(root.children[0].name, "instruction");
        assert_eq!(root.children[0].attrs.len(), 2);
    }

    #[test]
    fn text_content_collected() {
        let root = parse_document("<a><b>hi</b></a>").unwrap();
        assert_eq!(root.children[0].text, "hi");
    }

    #[test]
    fn entities_resolved() {
        let root = parse_document("<a>&lt;&amp;&gt;</a>").unwrap();
        assert_eq!(root.text, "<&>");
    }

    #[test]
    fn comments_skipped() {
        let root = parse_document("<a><!-- note --><b/></a>").unwrap();
        assert_eq!(root.children.len(), 1);
        assert_eq!(root.text.trim(), "");
    }

    #[test]
    fn xml_declaration_accepted() {
        let root = parse_document("<?xml version=\"1.0\"?>\n<a/>").unwrap();
        assert_eq!(root.name, "a");
    }

    #[test]
    fn mismatched_tags_rejected() {
        assert!(matches!(
            parse_document("<a><b></a></b>"),
            Err(LoadError::Xml { .. })
        ));
    }

    #[test]
    fn truncated_document_rejected() {
        assert!(matches!(
            parse_document("<a><b>"),
            Err(LoadError::Xml { .. })
        ));
    }

    #[test]
    fn empty_document_rejected() {
        assert!(matches!(parse_document(""), Err(LoadError::Xml { .. })));
        assert!(matches!(
            parse_document("   \n"),
            Err(LoadError::Xml { .. })
        ));
    }

    #[test]
    fn second_root_rejected() {
        assert!(matches!(
            parse_document("<a/><b/>"),
            Err(LoadError::Xml { .. })
        ));
    }
}
