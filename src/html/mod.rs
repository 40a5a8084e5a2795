//! Arena-backed HTML document tree
//!
//! Nodes live in a single `Vec` owned by [`Document`]; a [`NodeId`] is an
//! index into it. Each node records its parent as a plain id, so walking up
//! the tree is a lookup and never implies ownership. Detached nodes stay in
//! the arena but are unreachable from the root.

mod serialize;

use scraper::Html;

/// Index of a node inside its [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// An element's tag name and attributes, in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attrs: Vec<(String, String)>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attrs: Vec::new(),
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn id(&self) -> Option<&str> {
        self.attr("id")
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .is_some_and(|classes| classes.split_ascii_whitespace().any(|c| c == class))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Document,
    /// Contents of a `<template>`, kept as the template's only child.
    Fragment,
    Doctype(String),
    Element(Element),
    Text(String),
    Comment(String),
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// A parsed HTML document.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// An empty document holding only the root node.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                kind: NodeKind::Document,
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    /// Parse a full HTML document with the HTML5 tree-building rules
    /// (missing `html`, `head` and `body` elements are synthesized).
    pub fn parse(html: &str) -> Self {
        let parsed = Html::parse_document(html);
        let mut doc = Document::new();

        let mut pending = vec![(parsed.tree.root(), doc.root())];
        while let Some((source, parent)) = pending.pop() {
            for child in source.children() {
                let kind = match child.value() {
                    scraper::Node::Doctype(doctype) => NodeKind::Doctype(doctype.name().to_string()),
                    scraper::Node::Element(element) => NodeKind::Element(Element {
                        name: element.name().to_string(),
                        attrs: element
                            .attrs
                            .iter()
                            // Keep namespace prefixes (`xlink:href`) as written in markup
                            .map(|(name, value)| {
                                let key = match &name.prefix {
                                    Some(prefix) => format!("{}:{}", prefix, name.local),
                                    None => name.local.to_string(),
                                };
                                (key, String::from(&**value))
                            })
                            .collect(),
                    }),
                    scraper::Node::Text(text) => NodeKind::Text(String::from(&**text)),
                    scraper::Node::Comment(comment) => NodeKind::Comment(String::from(&**comment)),
                    scraper::Node::Fragment => NodeKind::Fragment,
                    _ => continue,
                };
                let id = doc.append(parent, kind);
                pending.push((child, id));
            }
        }

        doc
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.0].kind
    }

    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match self.kind(id) {
            NodeKind::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn text(&self, id: NodeId) -> Option<&str> {
        match self.kind(id) {
            NodeKind::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.children(id).first().copied()
    }

    fn is_element_named(&self, id: NodeId, name: &str) -> bool {
        self.element(id).is_some_and(|e| e.name == name)
    }

    /// The `<html>` element.
    pub fn document_element(&self) -> Option<NodeId> {
        self.children(self.root())
            .iter()
            .copied()
            .find(|&id| self.element(id).is_some())
    }

    /// The `<body>` element.
    pub fn body(&self) -> Option<NodeId> {
        let html = self.document_element()?;
        self.children(html)
            .iter()
            .copied()
            .find(|&id| self.is_element_named(id, "body"))
    }

    /// Create a detached node.
    pub fn create(&mut self, kind: NodeKind) -> NodeId {
        self.nodes.push(Node {
            kind,
            parent: None,
            children: Vec::new(),
        });
        NodeId(self.nodes.len() - 1)
    }

    /// Create a node as the last child of `parent`.
    pub fn append(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        let id = self.create(kind);
        self.append_child(parent, id);
        id
    }

    /// Attach a detached node as the last child of `parent`.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        debug_assert!(self.nodes[child.0].parent.is_none());
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    /// Put detached `new` where `old` is and detach `old`.
    /// Does nothing if `old` has no parent.
    pub fn replace(&mut self, old: NodeId, new: NodeId) {
        let Some(parent) = self.parent(old) else {
            return;
        };
        if let Some(slot) = self.nodes[parent.0].children.iter_mut().find(|c| **c == old) {
            *slot = new;
        }
        self.nodes[old.0].parent = None;
        self.nodes[new.0].parent = Some(parent);
    }

    /// Detach every child of `id`.
    pub fn clear_children(&mut self, id: NodeId) {
        let children = std::mem::take(&mut self.nodes[id.0].children);
        for child in children {
            self.nodes[child.0].parent = None;
        }
    }

    /// Whether `ancestor` is `node` or one of its ancestors.
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        self.ancestors(node).any(|id| id == ancestor)
    }

    /// `id` followed by its parent chain up to the root.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(Some(id), move |&id| self.parent(id))
    }

    /// `id` and everything below it, in document (pre-)order.
    ///
    /// Template contents are a separate tree, as in the DOM: a fragment is
    /// yielded but not entered.
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        Descendants {
            doc: self,
            stack: vec![id],
        }
    }
}

/// Pre-order traversal produced by [`Document::descendants`].
pub struct Descendants<'a> {
    doc: &'a Document,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        if *self.doc.kind(id) != NodeKind::Fragment {
            self.stack.extend(self.doc.children(id).iter().rev().copied());
        }
        Some(id)
    }
}

/// Index of a node in the pre-order walk from the root, plus the largest
/// index inside its subtree. Ranges over the tree are expressed with these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub last: usize,
}

impl Span {
    /// Whether this node is a proper ancestor of the node at pre-order index `pos`.
    pub fn encloses(&self, pos: usize) -> bool {
        self.start < pos && pos <= self.last
    }
}

/// Pre-order spans of every node reachable from the root.
#[derive(Debug, Clone)]
pub struct Spans(Vec<Option<Span>>);

impl Spans {
    /// `None` for nodes detached from the tree or created after the spans were taken.
    pub fn get(&self, id: NodeId) -> Option<Span> {
        self.0.get(id.0).copied().flatten()
    }
}

impl Document {
    pub fn spans(&self) -> Spans {
        let mut spans: Vec<Option<Span>> = vec![None; self.nodes.len()];
        let mut next = 0;
        // (node, children already visited)
        let mut stack = vec![(self.root(), false)];
        while let Some((id, visited)) = stack.pop() {
            if visited {
                if let Some(span) = spans[id.0].as_mut() {
                    span.last = next - 1;
                }
                continue;
            }
            spans[id.0] = Some(Span {
                start: next,
                last: next,
            });
            next += 1;
            stack.push((id, true));
            stack.extend(self.children(id).iter().rev().map(|&c| (c, false)));
        }
        Spans(spans)
    }
}
