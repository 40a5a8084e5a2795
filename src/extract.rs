//! Question content extraction
//!
//! Saved question pages carry site chrome around the question and a long tail
//! (answers, comments, related questions) after the `MCQ ID:` label. This
//! module cuts a parsed page down to the question itself:
//!
//! 1. The **cut point** is the parent element of the first body text node
//!    matching `MCQ ID:`. Without one the document is left alone.
//! 2. The **start point** is the parent element of the first body text node
//!    that begins with the question number (`7`, `Q7)`, `Q. 7.` ...), when a
//!    number is known.
//! 3. The **container** is the closest ancestor of the cut point matching the
//!    first applicable selector in [`CONTAINER_SELECTORS`], or the body.
//! 4. Everything from just before the start point (or the container's first
//!    child) up to just before the cut point is copied into a fresh
//!    `<body><div>...</div></body>` that replaces the old body.
//!
//! The `<head>`, and with it every stylesheet, is never touched.

use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use crate::html::{Document, Element, NodeId, NodeKind, Span, Spans};

/// A structural selector tried when resolving the container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selector {
    Tag(&'static str),
    Class(&'static str),
    Id(&'static str),
}

impl Selector {
    pub fn matches(&self, element: &Element) -> bool {
        match *self {
            Selector::Tag(name) => element.name.eq_ignore_ascii_case(name),
            Selector::Class(class) => element.has_class(class),
            Selector::Id(id) => element.id() == Some(id),
        }
    }
}

/// Tried in order; the first selector with a matching ancestor wins,
/// even if a later selector would match a closer one.
pub const CONTAINER_SELECTORS: &[Selector] = &[
    Selector::Tag("main"),
    Selector::Tag("section"),
    Selector::Tag("article"),
    Selector::Class("content"),
    Selector::Class("container"),
    Selector::Class("question"),
    Selector::Class("page"),
    Selector::Class("wrapper"),
    Selector::Class("root"),
    Selector::Class("app"),
    Selector::Id("content"),
    Selector::Id("main"),
];

fn cut_marker() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)(?-u:\b)MCQ\s*ID\s*:\s*").ok())
        .as_ref()
}

/// Pattern for a text node that opens question `token`.
pub fn start_marker(token: &str) -> Option<Regex> {
    let pattern = format!(r"(?i)^\s*(?:Q\.?\s*)?{}(?:[).:,-])?\s*", regex::escape(token));
    Regex::new(&pattern).ok()
}

/// Parent element of the first text node under `root` (document order) matching `re`.
fn find_text_parent(doc: &Document, root: NodeId, re: &Regex) -> Option<NodeId> {
    doc.descendants(root)
        .find(|&id| doc.text(id).is_some_and(|text| re.is_match(text)))
        .and_then(|text| doc.parent(text))
        .filter(|&parent| doc.element(parent).is_some())
}

/// Locate the end-of-question element.
pub fn find_cut_point(doc: &Document) -> Option<NodeId> {
    find_text_parent(doc, doc.body()?, cut_marker()?)
}

/// Locate the element that opens question `token`.
pub fn find_start_point(doc: &Document, token: &str) -> Option<NodeId> {
    find_text_parent(doc, doc.body()?, &start_marker(token)?)
}

/// Closest structural container of `node`, searched no higher than `body`.
pub fn resolve_container(doc: &Document, node: NodeId, body: NodeId) -> NodeId {
    let chain: Vec<NodeId> = doc
        .ancestors(node)
        .take_while(|&id| id != body)
        .chain(std::iter::once(body))
        .collect();

    CONTAINER_SELECTORS
        .iter()
        .find_map(|selector| {
            chain
                .iter()
                .copied()
                .find(|&id| doc.element(id).is_some_and(|e| selector.matches(e)))
        })
        .unwrap_or(body)
}

/// Cut the document's body down to the question content.
///
/// `start_token` is the expected question number, if known. Returns `false`
/// when no `MCQ ID:` label exists, in which case the document is untouched.
pub fn extract_content(doc: &mut Document, start_token: Option<&str>) -> bool {
    let Some(body) = doc.body() else {
        return false;
    };
    let Some(cut) = find_cut_point(doc) else {
        debug!("no MCQ ID marker found");
        return false;
    };

    let mut container = resolve_container(doc, cut, body);
    let start = start_token.and_then(|token| find_start_point(doc, token));

    if let Some(start) = start {
        if !doc.contains(container, start) {
            debug!("question start lies outside the container, widening to body");
            container = body;
        }
    }

    let Some(range_start) = start.or_else(|| doc.first_child(container)) else {
        doc.clear_children(body);
        return true;
    };

    let spans = doc.spans();
    let new_body = doc.create(NodeKind::Element(Element::new("body")));
    let wrapper = doc.append(new_body, NodeKind::Element(Element::new("div")));

    if let (Some(from), Some(to)) = (spans.get(range_start), spans.get(cut)) {
        let range = Range {
            start: from.start,
            end: to.start,
        };
        if range.start < range.end {
            let root = doc.root();
            copy_range(doc, &spans, root, wrapper, range);
        } else {
            debug!("question start follows the marker, nothing to keep");
        }
    }

    doc.replace(body, new_body);
    true
}

/// Half-open interval of pre-order positions: before `start` up to before `end`.
#[derive(Debug, Clone, Copy)]
struct Range {
    start: usize,
    end: usize,
}

impl Range {
    fn intersects(&self, span: Span) -> bool {
        span.start < self.end && span.last >= self.start
    }

    /// Whether both boundary points lie strictly inside the node.
    fn enclosed_by(&self, span: Span) -> bool {
        span.encloses(self.start) && span.encloses(self.end)
    }
}

/// Copy the part of `node`'s subtree inside `range` under `target`.
///
/// Nodes holding both boundaries are not copied themselves, only searched.
/// Nodes holding one boundary are copied shallowly with their in-range
/// children. Nodes inside the range are copied whole.
fn copy_range(doc: &mut Document, spans: &Spans, node: NodeId, target: NodeId, range: Range) {
    let children = doc.children(node).to_vec();
    for child in children {
        let Some(span) = spans.get(child) else {
            continue;
        };
        if !range.intersects(span) {
            continue;
        }
        if range.enclosed_by(span) {
            copy_range(doc, spans, child, target, range);
        } else {
            let kind = doc.kind(child).clone();
            let copy = doc.append(target, kind);
            copy_range(doc, spans, child, copy, range);
        }
    }
}
