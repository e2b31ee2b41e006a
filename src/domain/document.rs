//! Arena-backed document tree.
//!
//! A [`Document`] owns every node of one parsed POM. Nodes are addressed by
//! generational indices, so a handle to a removed node never aliases a newer one.

use std::borrow::Cow;
use std::fmt;

use generational_arena::{Arena, Index};
use tracing::instrument;

use crate::domain::error::{DomainError, DomainResult};

/// Handle to a node owned by a [`Document`].
pub type NodeId = Index;

/// A single `name="value"` pair on an element, value kept escaped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

/// Element payload: tag name plus attributes in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<Attribute>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
        }
    }
}

/// Node payloads. Character data is stored in its raw (escaped) source form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Element(Element),
    Comment(String),
    Text(String),
    CData(String),
    ProcessingInstruction(String),
    Declaration(String),
    DocType(String),
}

impl NodeKind {
    /// Text node made only of whitespace (indentation between siblings).
    pub fn is_blank_text(&self) -> bool {
        matches!(self, NodeKind::Text(t) if t.trim().is_empty())
    }
}

/// Tree node in the arena.
#[derive(Debug)]
pub struct Node {
    pub kind: NodeKind,
    /// None for top-level nodes and for detached nodes
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

/// How a pass finds the element whose children it reorders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParentLocator {
    /// First element with this tag in document order.
    FirstByTag(String),
    /// Chain of direct-child tags starting at the root element.
    ChildPath(Vec<String>),
}

impl ParentLocator {
    /// `a/b/c` becomes a child path, a bare `tag` a first-occurrence lookup.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim().trim_matches('/');
        if raw.contains('/') {
            Self::ChildPath(
                raw.split('/')
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect(),
            )
        } else {
            Self::FirstByTag(raw.to_string())
        }
    }
}

impl fmt::Display for ParentLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParentLocator::FirstByTag(tag) => write!(f, "<{}>", tag),
            ParentLocator::ChildPath(path) => write!(f, "<{}>", path.join("/")),
        }
    }
}

/// Ordered, mutable node graph for one document.
#[derive(Debug, Default)]
pub struct Document {
    arena: Arena<Node>,
    /// Prolog, root element and trailing misc nodes, in order
    top_level: Vec<NodeId>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a detached node.
    pub fn create(&mut self, kind: NodeKind) -> NodeId {
        self.arena.insert(Node {
            kind,
            parent: None,
            children: Vec::new(),
        })
    }

    pub fn create_comment(&mut self, text: impl Into<String>) -> NodeId {
        self.create(NodeKind::Comment(text.into()))
    }

    /// Append a detached node under `parent`, or at top level when `parent` is None.
    #[instrument(level = "trace", skip(self))]
    pub fn append_child(&mut self, parent: Option<NodeId>, child: NodeId) -> DomainResult<()> {
        if !self.arena.contains(child) {
            return Err(DomainError::NodeNotFound);
        }
        match parent {
            Some(parent_id) => {
                let parent_node = self
                    .arena
                    .get_mut(parent_id)
                    .ok_or(DomainError::NodeNotFound)?;
                parent_node.children.push(child);
            }
            None => self.top_level.push(child),
        }
        if let Some(node) = self.arena.get_mut(child) {
            node.parent = parent;
        }
        Ok(())
    }

    /// Remove every child of `parent` from it and return them in their old order.
    ///
    /// The detached nodes stay alive in the arena until reattached or removed.
    #[instrument(level = "trace", skip(self))]
    pub fn detach_children(&mut self, parent: NodeId) -> DomainResult<Vec<NodeId>> {
        let children = {
            let node = self
                .arena
                .get_mut(parent)
                .ok_or(DomainError::NodeNotFound)?;
            std::mem::take(&mut node.children)
        };
        for &child in &children {
            if let Some(node) = self.arena.get_mut(child) {
                node.parent = None;
            }
        }
        Ok(children)
    }

    /// Free a detached node and its whole subtree.
    pub fn remove_subtree(&mut self, id: NodeId) {
        if let Some(node) = self.arena.remove(id) {
            for child in node.children {
                self.remove_subtree(child);
            }
        }
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.arena.contains(id)
    }

    pub fn kind(&self, id: NodeId) -> Option<&NodeKind> {
        self.arena.get(id).map(|n| &n.kind)
    }

    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match self.kind(id) {
            Some(NodeKind::Element(element)) => Some(element),
            _ => None,
        }
    }

    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|e| e.name.as_str())
    }

    pub fn comment_text(&self, id: NodeId) -> Option<&str> {
        match self.kind(id) {
            Some(NodeKind::Comment(text)) => Some(text.as_str()),
            _ => None,
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.arena.get(id).and_then(|n| n.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.arena
            .get(id)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn top_level(&self) -> &[NodeId] {
        &self.top_level
    }

    /// Element children only.
    pub fn child_elements(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id)
            .iter()
            .copied()
            .filter(move |&c| self.element(c).is_some())
    }

    /// Siblings before `id`, nearest first.
    pub fn preceding_siblings(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        let siblings = match self.parent(id) {
            Some(parent) => self.children(parent),
            None => self.top_level.as_slice(),
        };
        let position = siblings.iter().position(|&s| s == id).unwrap_or(0);
        siblings[..position].iter().rev().copied()
    }

    /// The single top-level element.
    pub fn root_element(&self) -> Option<NodeId> {
        self.top_level
            .iter()
            .copied()
            .find(|&id| self.element(id).is_some())
    }

    /// Pre-order walk over `id` and everything below it.
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        Descendants {
            document: self,
            stack: vec![id],
        }
    }

    /// First element with `tag` in document order, anywhere in the document.
    #[instrument(level = "trace", skip(self))]
    pub fn locate_first(&self, tag: &str) -> Option<NodeId> {
        self.top_level.iter().find_map(|&top| {
            self.descendants(top)
                .find(|&id| self.tag_name(id) == Some(tag))
        })
    }

    /// Walk direct children from the root element; the first segment names the root.
    pub fn locate_path<S: AsRef<str>>(&self, path: &[S]) -> Option<NodeId> {
        let (first, rest) = path.split_first()?;
        let root = self.root_element()?;
        if self.tag_name(root) != Some(first.as_ref()) {
            return None;
        }
        rest.iter().try_fold(root, |current, segment| {
            self.child_elements(current)
                .find(|&c| self.tag_name(c) == Some(segment.as_ref()))
        })
    }

    /// Resolve `locator`. A child path whose first segment does not name the
    /// root element falls back to the first element named like its last segment.
    pub fn locate(&self, locator: &ParentLocator) -> Option<NodeId> {
        match locator {
            ParentLocator::FirstByTag(tag) => self.locate_first(tag),
            ParentLocator::ChildPath(path) => {
                let root = self.root_element()?;
                match path.split_first() {
                    Some((first, _)) if self.tag_name(root) == Some(first.as_str()) => {
                        self.locate_path(path)
                    }
                    _ => path.last().and_then(|tag| self.locate_first(tag)),
                }
            }
        }
    }

    pub fn count_children_by_tag(&self, id: NodeId, tag: &str) -> usize {
        self.child_elements(id)
            .filter(|&c| self.tag_name(c) == Some(tag))
            .count()
    }

    /// First element strictly below `id` with the given tag, in document order.
    pub fn first_descendant_by_tag(&self, id: NodeId, tag: &str) -> Option<NodeId> {
        self.descendants(id)
            .skip(1)
            .find(|&d| self.tag_name(d) == Some(tag))
    }

    /// Direct child element with the given tag.
    pub fn child_by_tag(&self, id: NodeId, tag: &str) -> Option<NodeId> {
        self.child_elements(id)
            .find(|&c| self.tag_name(c) == Some(tag))
    }

    /// Concatenated, unescaped character data below `id`.
    ///
    /// Entities that cannot be resolved are kept verbatim.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut content = String::new();
        for node in self.descendants(id) {
            match self.kind(node) {
                Some(NodeKind::Text(raw)) => {
                    let text = quick_xml::escape::unescape(raw)
                        .unwrap_or(Cow::Borrowed(raw.as_str()));
                    content.push_str(&text);
                }
                Some(NodeKind::CData(raw)) => content.push_str(raw),
                _ => {}
            }
        }
        content
    }

    /// Number of live nodes, attached or not.
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }
}

/// Pre-order iterator returned by [`Document::descendants`].
pub struct Descendants<'a> {
    document: &'a Document,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.stack.pop()?;
        // Push children in reverse order for left-to-right traversal
        for &child in self.document.children(current).iter().rev() {
            self.stack.push(child);
        }
        Some(current)
    }
}
