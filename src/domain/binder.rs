//! Binding of explanatory comments to the element they describe.

use tracing::trace;

use crate::domain::document::{Document, NodeId, NodeKind};

/// Find the comment that documents `item`.
///
/// Walks the preceding siblings nearest first, skipping filler such as
/// whitespace text. The first comment wins; meeting another element first
/// means any earlier comment belongs to that element, so nothing is bound.
pub fn bind(document: &Document, item: NodeId) -> Option<NodeId> {
    for sibling in document.preceding_siblings(item) {
        match document.kind(sibling) {
            Some(NodeKind::Comment(_)) => {
                trace!(?item, comment = ?sibling, "bound comment");
                return Some(sibling);
            }
            Some(NodeKind::Element(_)) => return None,
            _ => continue,
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::document::Element;

    fn push(doc: &mut Document, parent: NodeId, kind: NodeKind) -> NodeId {
        let id = doc.create(kind);
        doc.append_child(Some(parent), id).unwrap();
        id
    }

    fn elem(name: &str) -> NodeKind {
        NodeKind::Element(Element::new(name))
    }

    #[test]
    fn given_comment_then_whitespace_when_binding_then_comment_is_found() {
        let mut doc = Document::new();
        let root = doc.create(elem("dependencies"));
        doc.append_child(None, root).unwrap();
        let comment = push(&mut doc, root, NodeKind::Comment(" url ".into()));
        push(&mut doc, root, NodeKind::Text("\n    ".into()));
        let item = push(&mut doc, root, elem("dependency"));

        assert_eq!(bind(&doc, item), Some(comment));
    }

    #[test]
    fn given_element_between_comment_and_item_when_binding_then_nothing_is_bound() {
        let mut doc = Document::new();
        let root = doc.create(elem("dependencies"));
        doc.append_child(None, root).unwrap();
        let comment = push(&mut doc, root, NodeKind::Comment("for a".into()));
        let a = push(&mut doc, root, elem("a"));
        push(&mut doc, root, NodeKind::Text("\n".into()));
        let b = push(&mut doc, root, elem("b"));

        assert_eq!(bind(&doc, a), Some(comment));
        assert_eq!(bind(&doc, b), None);
    }

    #[test]
    fn given_two_comments_when_binding_then_nearest_wins() {
        let mut doc = Document::new();
        let root = doc.create(elem("properties"));
        doc.append_child(None, root).unwrap();
        push(&mut doc, root, NodeKind::Comment("far".into()));
        let near = push(&mut doc, root, NodeKind::Comment("near".into()));
        let item = push(&mut doc, root, elem("x.version"));

        assert_eq!(bind(&doc, item), Some(near));
    }

    #[test]
    fn given_first_child_when_binding_then_nothing_is_bound() {
        let mut doc = Document::new();
        let root = doc.create(elem("plugins"));
        doc.append_child(None, root).unwrap();
        let item = push(&mut doc, root, elem("plugin"));

        assert_eq!(bind(&doc, item), None);
    }
}
