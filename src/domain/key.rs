//! Sort key extraction.

use crate::domain::document::{Document, NodeId};
use crate::domain::error::{DomainError, DomainResult};

/// How an item's sort key is derived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyStrategy {
    /// `first + separator + second`, each the text of the first descendant
    /// element with that tag, e.g. `groupId:artifactId`.
    Coordinate {
        first: String,
        second: String,
        separator: String,
    },
    /// The item's own tag name.
    Identity,
}

impl KeyStrategy {
    /// Maven `groupId:artifactId` coordinate.
    pub fn maven_coordinate() -> Self {
        KeyStrategy::Coordinate {
            first: "groupId".into(),
            second: "artifactId".into(),
            separator: ":".into(),
        }
    }

    pub fn key(&self, document: &Document, item: NodeId) -> DomainResult<String> {
        let tag = document.tag_name(item).ok_or(DomainError::NodeNotFound)?;
        match self {
            KeyStrategy::Identity => Ok(tag.to_string()),
            KeyStrategy::Coordinate {
                first,
                second,
                separator,
            } => {
                let first = field_text(document, item, tag, first)?;
                let second = field_text(document, item, tag, second)?;
                Ok(format!("{}{}{}", first, separator, second))
            }
        }
    }
}

fn field_text(document: &Document, item: NodeId, tag: &str, field: &str) -> DomainResult<String> {
    document
        .first_descendant_by_tag(item, field)
        .map(|node| document.text_content(node).trim().to_string())
        .ok_or_else(|| DomainError::MissingField {
            item: tag.to_string(),
            field: field.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::document::{Element, NodeKind};

    fn dependency(doc: &mut Document, fields: &[(&str, &str)]) -> NodeId {
        let dep = doc.create(NodeKind::Element(Element::new("dependency")));
        doc.append_child(None, dep).unwrap();
        for (name, value) in fields {
            let field = doc.create(NodeKind::Element(Element::new(*name)));
            doc.append_child(Some(dep), field).unwrap();
            let text = doc.create(NodeKind::Text(value.to_string()));
            doc.append_child(Some(field), text).unwrap();
        }
        dep
    }

    #[test]
    fn given_both_fields_when_extracting_coordinate_then_joins_with_separator() {
        let mut doc = Document::new();
        let dep = dependency(
            &mut doc,
            &[("groupId", " com.google.guava "), ("artifactId", "guava"), ("version", "33.0")],
        );

        let key = KeyStrategy::maven_coordinate().key(&doc, dep).unwrap();
        assert_eq!(key, "com.google.guava:guava");
    }

    #[test]
    fn given_missing_artifact_id_when_extracting_coordinate_then_fails_with_missing_field() {
        let mut doc = Document::new();
        let dep = dependency(&mut doc, &[("groupId", "org.slf4j")]);

        let err = KeyStrategy::maven_coordinate().key(&doc, dep).unwrap_err();
        assert_eq!(
            err,
            DomainError::MissingField {
                item: "dependency".into(),
                field: "artifactId".into()
            }
        );
        assert_eq!(err.to_string(), "<dependency> element has no <artifactId> field");
    }

    #[test]
    fn given_any_element_when_extracting_identity_then_returns_tag_name() {
        let mut doc = Document::new();
        let prop = doc.create(NodeKind::Element(Element::new("guava.version")));
        doc.append_child(None, prop).unwrap();

        assert_eq!(KeyStrategy::Identity.key(&doc, prop).unwrap(), "guava.version");
    }
}
