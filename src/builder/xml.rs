//! Minimal XML document tree.
//!
//! Descriptors are assembled as an [`Element`] tree and rendered once by
//! [`render`]. Layout follows what Visual Studio writes itself: two-space
//! indentation, CRLF line endings, self-closing empty elements, and
//! text-only elements kept on one line.

use std::fmt::Write;

/// Line ending used for every generated file.
pub const EOL: &str = "\r\n";

/// A node in the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

/// An XML element with ordered attributes and children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    name: String,
    attrs: Vec<(String, String)>,
    children: Vec<Node>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Element {
            name: name.into(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    /// `<name>text</name>`
    pub fn with_text(name: impl Into<String>, text: impl Into<String>) -> Self {
        Element::new(name).text(text)
    }

    pub fn attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.push((key.into(), value.into()));
        self
    }

    /// Add a `Condition` attribute.
    pub fn condition(self, condition: impl Into<String>) -> Self {
        self.attr("Condition", condition)
    }

    pub fn child(mut self, child: Element) -> Self {
        self.push(child);
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = Element>) -> Self {
        self.children
            .extend(children.into_iter().map(Node::Element));
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.children.push(Node::Text(text.into()));
        self
    }

    pub fn push(&mut self, child: Element) {
        self.children.push(Node::Element(child));
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get_attr(&self, key: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Child elements, skipping text.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|n| match n {
            Node::Element(e) => Some(e),
            Node::Text(_) => None,
        })
    }

    /// Concatenated text children.
    pub fn text_content(&self) -> String {
        self.children
            .iter()
            .filter_map(|n| match n {
                Node::Text(t) => Some(t.as_str()),
                Node::Element(_) => None,
            })
            .collect()
    }

    /// Depth-first search for elements named `name`.
    pub fn find_all<'a>(&'a self, name: &str) -> Vec<&'a Element> {
        let mut found = Vec::new();
        self.collect(name, &mut found);
        found
    }

    fn collect<'a>(&'a self, name: &str, found: &mut Vec<&'a Element>) {
        for e in self.elements() {
            if e.name == name {
                found.push(e);
            }
            e.collect(name, found);
        }
    }
}

/// Render a document with its XML declaration.
pub fn render(root: &Element) -> String {
    let mut out = String::new();
    out.push_str(r#"<?xml version="1.0" encoding="utf-8"?>"#);
    out.push_str(EOL);
    write_element(&mut out, root, 0);
    out
}

fn write_element(out: &mut String, e: &Element, depth: usize) {
    let indent = "  ".repeat(depth);
    let _ = write!(out, "{}<{}", indent, e.name);
    for (k, v) in &e.attrs {
        let _ = write!(out, " {}=\"{}\"", k, escape_attr(v));
    }

    if e.children.is_empty() {
        out.push_str(" />");
        out.push_str(EOL);
        return;
    }

    let text_only = e.children.iter().all(|n| matches!(n, Node::Text(_)));
    if text_only {
        let _ = write!(out, ">{}</{}>", escape_text(&e.text_content()), e.name);
        out.push_str(EOL);
        return;
    }

    out.push('>');
    out.push_str(EOL);
    for node in &e.children {
        match node {
            Node::Element(child) => write_element(out, child, depth + 1),
            Node::Text(t) => {
                let _ = write!(out, "{}  {}", indent, escape_text(t));
                out.push_str(EOL);
            }
        }
    }
    let _ = write!(out, "{}</{}>", indent, e.name);
    out.push_str(EOL);
}

/// Escape character data.
pub fn escape_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape a double-quoted attribute value.
///
/// Apostrophes are left alone; MSBuild conditions are full of them.
pub fn escape_attr(s: &str) -> String {
    escape_text(s).replace('"', "&quot;")
}
