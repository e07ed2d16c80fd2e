//! Minimal namespace-aware XML element tree built from `quick-xml` events.
//!
//! Comments, the prolog and processing instructions outside the document
//! element are dropped, entity and character references are
//! expanded, CDATA becomes plain text and line endings are normalized. This is
//! the input model expected by canonicalization.

use crate::{err::Error, Result};
use quick_xml::{
    escape::unescape,
    events::{BytesStart, Event},
    Reader,
};

pub const XML_NS: &str = "http://www.w3.org/XML/1998/namespace";

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
    ProcessingInstruction(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    /// Qualified name as written.
    pub name: String,
    pub namespace: Option<String>,
    pub value: String,
}

impl Attribute {
    pub fn local_name(&self) -> &str {
        local_name(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    /// Qualified name as written.
    pub name: String,
    pub namespace: Option<String>,
    /// `xmlns` declarations made on this element, `""` is the default namespace.
    pub namespaces: Vec<(String, String)>,
    pub attributes: Vec<Attribute>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn local_name(&self) -> &str {
        local_name(&self.name)
    }

    pub fn prefix(&self) -> &str {
        prefix(&self.name)
    }

    pub fn attr(&self, local: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.local_name() == local)
            .map(|a| a.value.as_str())
    }

    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(el) => Some(el),
            _ => None,
        })
    }

    /// First child element with the given local name.
    pub fn child(&self, local: &str) -> Option<&Element> {
        self.elements().find(|el| el.local_name() == local)
    }

    pub fn children_named<'a>(&'a self, local: &'a str) -> impl Iterator<Item = &'a Element> {
        self.elements().filter(move |el| el.local_name() == local)
    }

    /// Concatenated text of all descendants.
    pub fn text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for node in &self.children {
            match node {
                Node::Text(text) => out.push_str(text),
                Node::Element(el) => el.collect_text(out),
                Node::ProcessingInstruction(_) => {}
            }
        }
    }

    /// Depth-first search, including `self`.
    pub fn find<P>(&self, pred: &P) -> Option<&Element>
    where
        P: Fn(&Element) -> bool,
    {
        if pred(self) {
            return Some(self);
        }
        self.elements().find_map(|el| el.find(pred))
    }
}

pub fn local_name(qname: &str) -> &str {
    qname.rsplit_once(':').map_or(qname, |(_, local)| local)
}

pub fn prefix(qname: &str) -> &str {
    qname.split_once(':').map_or("", |(prefix, _)| prefix)
}

struct Scope {
    element: Element,
    // binding stack length before this element's declarations
    bindings_len: usize,
}

/// Parses a document and returns its root element.
pub fn parse(input: &str) -> Result<Element> {
    let input = input
        .trim_start_matches('\u{feff}')
        .replace("\r\n", "\n")
        .replace('\r', "\n");

    let mut reader = Reader::from_str(&input);
    let mut bindings: Vec<(String, String)> = vec![("xml".into(), XML_NS.into())];
    let mut stack: Vec<Scope> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| Error::ParseErr(format!("Malformed XML: {e}")))?;

        match event {
            Event::Start(start) => {
                let bindings_len = bindings.len();
                let element = open_element(&start, &mut bindings)?;
                stack.push(Scope {
                    element,
                    bindings_len,
                });
            }
            Event::Empty(start) => {
                let bindings_len = bindings.len();
                let element = open_element(&start, &mut bindings)?;
                bindings.truncate(bindings_len);
                attach(Node::Element(element), &mut stack, &mut root)?;
            }
            Event::End(_) => {
                let scope = stack
                    .pop()
                    .ok_or_else(|| Error::ParseErr("Unexpected closing tag".into()))?;
                bindings.truncate(scope.bindings_len);
                attach(Node::Element(scope.element), &mut stack, &mut root)?;
            }
            Event::Text(text) => {
                let text = text
                    .unescape()
                    .map_err(|e| Error::ParseErr(format!("Malformed XML text: {e}")))?;
                push_text(&text, &mut stack);
            }
            Event::CData(cdata) => {
                let text = String::from_utf8(cdata.into_inner().into_owned())
                    .map_err(|_| Error::ParseErr("CDATA is not valid UTF-8".into()))?;
                push_text(&text, &mut stack);
            }
            Event::PI(pi) => {
                if let Some(scope) = stack.last_mut() {
                    let content = String::from_utf8_lossy(&pi).into_owned();
                    scope
                        .element
                        .children
                        .push(Node::ProcessingInstruction(content));
                }
            }
            Event::Comment(_) | Event::Decl(_) | Event::DocType(_) => {}
            Event::Eof => break,
        }
    }

    if !stack.is_empty() {
        return Err(Error::ParseErr("Unexpected end of document".into()));
    }

    root.ok_or_else(|| Error::ParseErr("Document has no root element".into()))
}

fn open_element(start: &BytesStart, bindings: &mut Vec<(String, String)>) -> Result<Element> {
    let name = String::from_utf8(start.name().as_ref().to_vec())
        .map_err(|_| Error::ParseErr("Element name is not valid UTF-8".into()))?;

    let mut namespaces = Vec::new();
    let mut raw_attributes = Vec::new();

    for attr in start.attributes() {
        let attr = attr.map_err(|e| Error::ParseErr(format!("Malformed attribute: {e}")))?;
        let key = String::from_utf8(attr.key.as_ref().to_vec())
            .map_err(|_| Error::ParseErr("Attribute name is not valid UTF-8".into()))?;
        let raw = std::str::from_utf8(&attr.value)
            .map_err(|_| Error::ParseErr("Attribute value is not valid UTF-8".into()))?;

        // attribute-value normalization applies to literal whitespace only
        let normalized = raw.replace(['\t', '\n'], " ");
        let value = unescape(&normalized)
            .map_err(|e| Error::ParseErr(format!("Malformed attribute value: {e}")))?
            .into_owned();

        if key == "xmlns" {
            namespaces.push((String::new(), value));
        } else if let Some(prefix) = key.strip_prefix("xmlns:") {
            namespaces.push((prefix.to_string(), value));
        } else {
            raw_attributes.push((key, value));
        }
    }

    bindings.extend(namespaces.iter().cloned());

    let namespace = resolve(bindings, prefix(&name));
    let attributes = raw_attributes
        .into_iter()
        .map(|(name, value)| {
            // unprefixed attributes are in no namespace
            let namespace = match prefix(&name) {
                "" => None,
                p => resolve(bindings, p),
            };
            Attribute {
                name,
                namespace,
                value,
            }
        })
        .collect();

    Ok(Element {
        name,
        namespace,
        namespaces,
        attributes,
        children: Vec::new(),
    })
}

fn resolve(bindings: &[(String, String)], prefix: &str) -> Option<String> {
    bindings
        .iter()
        .rev()
        .find(|(p, _)| p == prefix)
        .map(|(_, uri)| uri.clone())
        .filter(|uri| !uri.is_empty())
}

fn push_text(text: &str, stack: &mut [Scope]) {
    // text outside the root element is not part of the model
    let Some(scope) = stack.last_mut() else {
        return;
    };

    if let Some(Node::Text(prev)) = scope.element.children.last_mut() {
        prev.push_str(text);
    } else {
        scope.element.children.push(Node::Text(text.to_string()));
    }
}

fn attach(node: Node, stack: &mut [Scope], root: &mut Option<Element>) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => {
            parent.element.children.push(node);
            Ok(())
        }
        None => match node {
            Node::Element(el) if root.is_none() => {
                *root = Some(el);
                Ok(())
            }
            _ => Err(Error::ParseErr("Document has more than one root".into())),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_namespaces_and_text() {
        let doc = parse(
            r#"<?xml version="1.0"?>
            <!-- leading comment -->
            <a:root xmlns:a="urn:a" xmlns="urn:default" a:x="1" y="2">
                <child>one &amp; <![CDATA[two <3>]]></child>
                <a:empty/>
            </a:root>"#,
        )
        .unwrap();

        assert_eq!(doc.local_name(), "root");
        assert_eq!(doc.namespace.as_deref(), Some("urn:a"));
        assert_eq!(doc.attributes[0].namespace.as_deref(), Some("urn:a"));
        assert_eq!(doc.attributes[1].namespace, None);

        let child = doc.child("child").unwrap();
        assert_eq!(child.namespace.as_deref(), Some("urn:default"));
        assert_eq!(child.text(), "one & two <3>");
        assert!(doc.child("empty").unwrap().children.is_empty());
    }

    #[test]
    fn rejects_unclosed_document() {
        assert!(parse("<root><open></root>").is_err());
        assert!(parse("<root>").is_err());
        assert!(parse("").is_err());
    }

    #[test]
    fn normalizes_line_endings() {
        let doc = parse("<r a=\"x\ny\">l1\r\nl2\rl3</r>").unwrap();
        assert_eq!(doc.attr("a"), Some("x y"));
        assert_eq!(doc.text(), "l1\nl2\nl3");
    }
}
