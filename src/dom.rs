//! Arena DOM
//!
//! A mutable HTML tree stored as a flat arena of nodes addressed by
//! [`NodeId`]. Each node keeps the index of its parent and the ordered
//! indices of its children, so in-place rewrites (rename, unwrap, replace)
//! are plain index relinks without shared pointers.
//!
//! Parsing goes through `dom_query` (html5ever underneath), which never
//! fails: malformed markup is recovered the way browsers do it.

use std::fmt::Write as _;

/// Elements serialized without a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
    "source", "track", "wbr",
];

/// Elements whose text content is emitted without escaping.
const RAW_TEXT_ELEMENTS: &[&str] = &[
    "iframe", "noembed", "noframes", "noscript", "plaintext", "script", "style", "xmp",
];

/// Elements whose first newline the parser drops.
const LEADING_NEWLINE_ELEMENTS: &[&str] = &["listing", "pre", "textarea"];

/// Nesting depth kept by [`Tree::parse`].
pub const MAX_DEPTH: usize = 256;

/// Index of a node inside a [`Tree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

impl NodeId {
    /// The document root (always slot 0).
    pub const ROOT: NodeId = NodeId(0);
}

/// A single `name="value"` pair. Source order is preserved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

/// Payload of an arena slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeData {
    /// Fragment root. Holds the top-level nodes.
    Document,
    /// Element with a lowercase tag name.
    Element { name: String, attrs: Vec<Attribute> },
    /// Character data.
    Text(String),
}

#[derive(Debug, Clone)]
struct Node {
    data: NodeData,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Mutable HTML fragment.
///
/// Detached nodes stay in the arena but are unreachable from the root;
/// they are dropped together with the tree.
#[derive(Debug, Clone)]
pub struct Tree {
    nodes: Vec<Node>,
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl Tree {
    /// Create an empty tree holding only the root.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                data: NodeData::Document,
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    /// Parse an HTML string into a tree of the `<body>` content.
    ///
    /// Elements nested deeper than [`MAX_DEPTH`] are dropped and their
    /// content is kept in the deepest allowed ancestor.
    #[must_use]
    pub fn parse(html: &str) -> Self {
        let document = dom_query::Document::from(html);
        let mut tree = Self::new();
        let body = document.select("body");
        if let Some(body_node) = body.nodes().first() {
            tree.import(body_node);
        }
        tree
    }

    fn import(&mut self, body: &dom_query::NodeRef) {
        let mut stack: Vec<_> = body
            .children()
            .into_iter()
            .rev()
            .map(|child| (NodeId::ROOT, child, 1))
            .collect();

        while let Some((parent, source, depth)) = stack.pop() {
            if source.is_element() {
                let (target, next_depth) = if depth > MAX_DEPTH {
                    log::trace!("element below depth {MAX_DEPTH} flattened");
                    (parent, depth)
                } else {
                    let name = source
                        .node_name()
                        .map(|n| n.to_ascii_lowercase())
                        .unwrap_or_default();
                    let attrs = source
                        .attrs()
                        .iter()
                        .map(|attr| Attribute {
                            name: attr.name.local.to_string(),
                            value: attr.value.to_string(),
                        })
                        .collect();
                    let id = self.alloc(NodeData::Element { name, attrs });
                    self.append(parent, id);
                    (id, depth + 1)
                };
                stack.extend(
                    source
                        .children()
                        .into_iter()
                        .rev()
                        .map(|child| (target, child, next_depth)),
                );
            } else if source.is_text() {
                let text = source.text();
                if !text.is_empty() {
                    let id = self.new_text(&text);
                    self.append(parent, id);
                }
            }
        }
    }

    fn alloc(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            data,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    // === Node Information ===

    /// Payload of a node.
    #[must_use]
    pub fn data(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.0].data
    }

    /// Tag name, `None` for text and the root.
    #[must_use]
    pub fn name(&self, id: NodeId) -> Option<&str> {
        match &self.nodes[id.0].data {
            NodeData::Element { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Check if a node is an element with the given tag name.
    #[inline]
    #[must_use]
    pub fn is_element(&self, id: NodeId, tag: &str) -> bool {
        self.name(id) == Some(tag)
    }

    /// Character data of a text node.
    #[must_use]
    pub fn text(&self, id: NodeId) -> Option<&str> {
        match &self.nodes[id.0].data {
            NodeData::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Attributes in source order; empty for non-elements.
    #[must_use]
    pub fn attrs(&self, id: NodeId) -> &[Attribute] {
        match &self.nodes[id.0].data {
            NodeData::Element { attrs, .. } => attrs,
            _ => &[],
        }
    }

    /// Get an attribute value.
    #[must_use]
    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.attrs(id)
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    /// Parent of a node, `None` for the root and detached nodes.
    #[inline]
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    /// Ordered child list.
    #[inline]
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// All nodes below `id` in document order (pre-order), `id` excluded.
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(self.children(current).iter().rev().copied());
        }
        out
    }

    /// Collect attached elements with the given tag names, in document order.
    #[must_use]
    pub fn find_all(&self, tags: &[&str]) -> Vec<NodeId> {
        self.descendants(NodeId::ROOT)
            .into_iter()
            .filter(|&id| self.name(id).is_some_and(|name| tags.contains(&name)))
            .collect()
    }

    // === Construction ===

    /// Allocate a detached element.
    pub fn new_element(&mut self, name: &str, attrs: Vec<Attribute>) -> NodeId {
        self.alloc(NodeData::Element {
            name: name.to_string(),
            attrs,
        })
    }

    /// Allocate a detached text node.
    pub fn new_text(&mut self, text: &str) -> NodeId {
        self.alloc(NodeData::Text(text.to_string()))
    }

    /// Append `child` as the last child of `parent`, detaching it first.
    pub fn append(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    // === Tree Manipulation ===

    /// Rename an element. No-op on text and the root.
    pub fn rename(&mut self, id: NodeId, new_name: &str) {
        if let NodeData::Element { name, .. } = &mut self.nodes[id.0].data {
            *name = new_name.to_string();
        }
    }

    /// Remove an attribute if present.
    pub fn remove_attr(&mut self, id: NodeId, name: &str) {
        if let NodeData::Element { attrs, .. } = &mut self.nodes[id.0].data {
            attrs.retain(|a| a.name != name);
        }
    }

    /// Unlink a node from its parent. The node keeps its own subtree.
    pub fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes[id.0].parent.take() {
            self.nodes[parent.0].children.retain(|&c| c != id);
        }
    }

    /// Put `new` into the slot `old` occupies in its parent's child list.
    ///
    /// Does nothing when `old` is detached.
    pub fn replace(&mut self, old: NodeId, new: NodeId) {
        let Some(parent) = self.nodes[old.0].parent else {
            return;
        };
        self.detach(new);
        if let Some(pos) = self.position(parent, old) {
            self.nodes[parent.0].children[pos] = new;
            self.nodes[new.0].parent = Some(parent);
            self.nodes[old.0].parent = None;
        }
    }

    /// Replace a node by its own children, spliced at the same position.
    pub fn unwrap(&mut self, id: NodeId) {
        let Some(parent) = self.nodes[id.0].parent else {
            return;
        };
        let Some(pos) = self.position(parent, id) else {
            return;
        };
        let children = std::mem::take(&mut self.nodes[id.0].children);
        for &child in &children {
            self.nodes[child.0].parent = Some(parent);
        }
        self.nodes[parent.0].children.splice(pos..=pos, children);
        self.nodes[id.0].parent = None;
    }

    /// Replace the whole child list of `id`.
    pub fn set_children(&mut self, id: NodeId, children: Vec<NodeId>) {
        for old in std::mem::take(&mut self.nodes[id.0].children) {
            self.nodes[old.0].parent = None;
        }
        for &child in &children {
            self.detach(child);
            self.nodes[child.0].parent = Some(id);
        }
        self.nodes[id.0].children = children;
    }

    fn position(&self, parent: NodeId, child: NodeId) -> Option<usize> {
        self.nodes[parent.0].children.iter().position(|&c| c == child)
    }

    // === Serialization ===

    /// Serialize the content of `id` (its children) to HTML.
    #[must_use]
    pub fn inner_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        let mut stack: Vec<Step> = self
            .children(id)
            .iter()
            .rev()
            .map(|&child| Step::Enter(child, false))
            .collect();

        while let Some(step) = stack.pop() {
            match step {
                Step::Close(name) => {
                    out.push_str("</");
                    out.push_str(name);
                    out.push('>');
                }
                Step::Enter(id, raw_text) => match &self.nodes[id.0].data {
                    NodeData::Document => {
                        stack.extend(self.children(id).iter().rev().map(|&c| Step::Enter(c, false)));
                    }
                    NodeData::Text(text) => {
                        if raw_text {
                            out.push_str(text);
                        } else {
                            out.push_str(&html_escape::encode_text(text));
                        }
                    }
                    NodeData::Element { name, attrs } => {
                        self.write_open_tag(id, name, attrs, &mut out);
                        if VOID_ELEMENTS.contains(&name.as_str()) {
                            continue;
                        }
                        let raw = RAW_TEXT_ELEMENTS.contains(&name.as_str());
                        stack.push(Step::Close(name));
                        stack.extend(self.children(id).iter().rev().map(|&c| Step::Enter(c, raw)));
                    }
                },
            }
        }
        out
    }

    /// Serialize the whole fragment to HTML.
    #[must_use]
    pub fn html(&self) -> String {
        self.inner_html(NodeId::ROOT)
    }

    fn write_open_tag(&self, id: NodeId, name: &str, attrs: &[Attribute], out: &mut String) {
        out.push('<');
        out.push_str(name);
        for attr in attrs {
            let _ = write!(
                out,
                " {}=\"{}\"",
                attr.name,
                html_escape::encode_double_quoted_attribute(&attr.value)
            );
        }
        out.push('>');

        // The parser eats one leading newline after these
        if LEADING_NEWLINE_ELEMENTS.contains(&name)
            && self
                .children(id)
                .first()
                .and_then(|&c| self.text(c))
                .is_some_and(|t| t.starts_with('\n'))
        {
            out.push('\n');
        }
    }
}

/// Pending serialization work.
enum Step<'a> {
    /// Write a node; the flag marks raw-text content.
    Enter(NodeId, bool),
    /// Write the end tag of an element.
    Close(&'a str),
}
