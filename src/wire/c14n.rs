//! Canonical XML 1.0 (inclusive) and Exclusive XML Canonicalization 1.0,
//! both without comments, over the element tree from [`super::xml`].
//!
//! The tree only holds the document element, so processing instructions
//! before or after it are never emitted. A whole-document digest over a
//! payload carrying such instructions will not match its signer's.

use super::xml::{Element, Node};
use std::collections::{BTreeMap, BTreeSet};
use std::ptr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    Inclusive,
    Exclusive,
}

impl Algorithm {
    pub fn from_uri(uri: &str) -> Option<Self> {
        match uri {
            "http://www.w3.org/TR/2001/REC-xml-c14n-20010315"
            | "http://www.w3.org/TR/2001/REC-xml-c14n-20010315#WithComments"
            | "http://www.w3.org/2006/12/xml-c14n11" => Some(Self::Inclusive),
            "http://www.w3.org/2001/10/xml-exc-c14n#"
            | "http://www.w3.org/2001/10/xml-exc-c14n#WithComments" => Some(Self::Exclusive),
            _ => None,
        }
    }

    pub fn uri(&self) -> &'static str {
        match self {
            Self::Inclusive => "http://www.w3.org/TR/2001/REC-xml-c14n-20010315",
            Self::Exclusive => "http://www.w3.org/2001/10/xml-exc-c14n#",
        }
    }
}

/// Canonicalizes the subtree rooted at `apex` (which must live inside `root`),
/// leaving out the `excluded` subtree. Returns `None` if `apex` is not part of
/// `root`.
pub fn canonicalize(
    root: &Element,
    apex: &Element,
    excluded: Option<&Element>,
    algorithm: Algorithm,
) -> Option<String> {
    let mut ancestors = Vec::new();
    if !locate(root, apex, &mut ancestors) {
        return None;
    }

    let inherited: BTreeMap<String, String> = ancestors.into_iter().collect();
    let mut writer = Writer {
        algorithm,
        excluded,
        out: String::new(),
    };
    writer.element(apex, &inherited, &BTreeMap::new());

    Some(writer.out)
}

/// Collects the namespace declarations of every ancestor of `apex`, outermost first.
fn locate(el: &Element, apex: &Element, scope: &mut Vec<(String, String)>) -> bool {
    if ptr::eq(el, apex) {
        return true;
    }

    let len = scope.len();
    scope.extend(el.namespaces.iter().cloned());
    if el.elements().any(|child| locate(child, apex, scope)) {
        return true;
    }
    scope.truncate(len);

    false
}

struct Writer<'a> {
    algorithm: Algorithm,
    excluded: Option<&'a Element>,
    out: String,
}

impl Writer<'_> {
    fn element(
        &mut self,
        el: &Element,
        inherited: &BTreeMap<String, String>,
        rendered: &BTreeMap<String, String>,
    ) {
        let mut in_scope = inherited.clone();
        for (prefix, uri) in &el.namespaces {
            in_scope.insert(prefix.clone(), uri.clone());
        }

        let candidates: Vec<(String, String)> = match self.algorithm {
            Algorithm::Inclusive => in_scope
                .iter()
                .filter(|(prefix, _)| prefix.as_str() != "xml")
                .map(|(p, u)| (p.clone(), u.clone()))
                .collect(),
            Algorithm::Exclusive => {
                let mut used = BTreeSet::new();
                used.insert(el.prefix().to_string());
                for attr in &el.attributes {
                    let prefix = super::xml::prefix(&attr.name);
                    if !prefix.is_empty() && prefix != "xml" {
                        used.insert(prefix.to_string());
                    }
                }
                used.into_iter()
                    .map(|p| {
                        let uri = in_scope.get(&p).cloned().unwrap_or_default();
                        (p, uri)
                    })
                    .collect()
            }
        };

        let mut now_rendered = rendered.clone();
        let mut declarations = Vec::new();
        for (prefix, uri) in candidates {
            let current = rendered.get(&prefix).map(String::as_str).unwrap_or("");

            if uri.is_empty() {
                // only an undeclared default namespace can be rendered empty
                if prefix.is_empty() && !current.is_empty() {
                    now_rendered.insert(prefix.clone(), uri.clone());
                    declarations.push((prefix, uri));
                }
                continue;
            }

            if rendered.get(&prefix) != Some(&uri) {
                now_rendered.insert(prefix.clone(), uri.clone());
                declarations.push((prefix, uri));
            }
        }

        let mut attributes: Vec<_> = el.attributes.iter().collect();
        attributes.sort_by(|a, b| {
            let a_key = (a.namespace.as_deref().unwrap_or(""), a.local_name());
            let b_key = (b.namespace.as_deref().unwrap_or(""), b.local_name());
            a_key.cmp(&b_key)
        });

        self.out.push('<');
        self.out.push_str(&el.name);
        for (prefix, uri) in &declarations {
            if prefix.is_empty() {
                self.out.push_str(" xmlns=\"");
            } else {
                self.out.push_str(" xmlns:");
                self.out.push_str(prefix);
                self.out.push_str("=\"");
            }
            escape_attr(uri, &mut self.out);
            self.out.push('"');
        }
        for attr in attributes {
            self.out.push(' ');
            self.out.push_str(&attr.name);
            self.out.push_str("=\"");
            escape_attr(&attr.value, &mut self.out);
            self.out.push('"');
        }
        self.out.push('>');

        for node in &el.children {
            match node {
                Node::Element(child) => {
                    if self.excluded.is_some_and(|ex| ptr::eq(ex, child)) {
                        continue;
                    }
                    self.element(child, &in_scope, &now_rendered);
                }
                Node::Text(text) => escape_text(text, &mut self.out),
                Node::ProcessingInstruction(pi) => {
                    self.out.push_str("<?");
                    self.out.push_str(pi);
                    self.out.push_str("?>");
                }
            }
        }

        self.out.push_str("</");
        self.out.push_str(&el.name);
        self.out.push('>');
    }
}

fn escape_text(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\r' => out.push_str("&#xD;"),
            c => out.push(c),
        }
    }
}

fn escape_attr(value: &str, out: &mut String) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '"' => out.push_str("&quot;"),
            '\t' => out.push_str("&#x9;"),
            '\n' => out.push_str("&#xA;"),
            '\r' => out.push_str("&#xD;"),
            c => out.push(c),
        }
    }
}
