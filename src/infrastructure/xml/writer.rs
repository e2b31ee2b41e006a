//! Pretty printer for [`Document`].
//!
//! One node per line, `indent` spaces per level. Elements holding only
//! character data are written inline with that data untouched, whitespace
//! included; elsewhere whitespace-only text is dropped. Childless elements
//! self-close. Parsing the output and rendering it again yields the same
//! bytes.

use std::fmt::{self, Write};

use regex::{Captures, Regex};
use tracing::instrument;

use crate::domain::{Document, Element, NodeId, NodeKind};
use crate::infrastructure::xml::{XmlError, XmlResult};

pub const DEFAULT_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

/// Spread the attributes of one start tag over several lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeWrap {
    /// Only the first start tag with this name is touched
    pub element: String,
    /// Wrap when the tag has more attributes than this
    pub threshold: usize,
    /// Leading spaces for every attribute after the first
    pub indent: usize,
}

impl Default for AttributeWrap {
    fn default() -> Self {
        Self {
            element: "project".into(),
            threshold: 2,
            indent: 8,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriterOptions {
    pub indent: usize,
    pub wrap: Option<AttributeWrap>,
}

impl Default for WriterOptions {
    fn default() -> Self {
        Self {
            indent: 4,
            wrap: Some(AttributeWrap::default()),
        }
    }
}

/// Serialize `document`, then apply attribute wrapping if configured.
#[instrument(level = "debug", skip(document, options))]
pub fn render(document: &Document, options: &WriterOptions) -> XmlResult<String> {
    let mut out = String::new();
    write_document(document, options.indent, &mut out)
        .map_err(|e| XmlError::Serialization(e.to_string()))?;

    match &options.wrap {
        Some(wrap) => wrap_attributes(&out, wrap),
        None => Ok(out),
    }
}

fn write_document(document: &Document, indent: usize, out: &mut String) -> fmt::Result {
    let has_declaration = document
        .top_level()
        .iter()
        .any(|&id| matches!(document.kind(id), Some(NodeKind::Declaration(_))));
    if !has_declaration {
        writeln!(out, "{}", DEFAULT_DECLARATION)?;
    }
    for &id in document.top_level() {
        write_node(document, id, 0, indent, out)?;
    }
    Ok(())
}

fn write_node(
    document: &Document,
    id: NodeId,
    depth: usize,
    indent: usize,
    out: &mut String,
) -> fmt::Result {
    let Some(kind) = document.kind(id) else {
        return Ok(());
    };
    let pad = " ".repeat(depth * indent);
    match kind {
        NodeKind::Text(raw) if raw.trim().is_empty() => Ok(()),
        NodeKind::Text(raw) => writeln!(out, "{}{}", pad, raw.trim()),
        NodeKind::CData(raw) => writeln!(out, "{}<![CDATA[{}]]>", pad, raw),
        NodeKind::Comment(raw) => writeln!(out, "{}<!--{}-->", pad, raw),
        NodeKind::ProcessingInstruction(raw) | NodeKind::Declaration(raw) => {
            writeln!(out, "{}<?{}?>", pad, raw)
        }
        NodeKind::DocType(raw) => writeln!(out, "{}<!DOCTYPE {}>", pad, raw),
        NodeKind::Element(element) => write_element(document, id, element, depth, indent, out),
    }
}

fn write_element(
    document: &Document,
    id: NodeId,
    element: &Element,
    depth: usize,
    indent: usize,
    out: &mut String,
) -> fmt::Result {
    let pad = " ".repeat(depth * indent);
    let all_children = document.children(id);

    write!(out, "{}<{}", pad, element.name)?;
    for attribute in &element.attributes {
        let quote = if attribute.value.contains('"') { '\'' } else { '"' };
        write!(out, " {}={}{}{}", attribute.name, quote, attribute.value, quote)?;
    }

    if all_children.is_empty() {
        return writeln!(out, "/>");
    }

    // leaf value, whitespace included
    let character_data_only = all_children.iter().all(|&c| {
        matches!(
            document.kind(c),
            Some(NodeKind::Text(_)) | Some(NodeKind::CData(_))
        )
    });
    if character_data_only {
        out.push('>');
        for &child in all_children {
            match document.kind(child) {
                Some(NodeKind::Text(raw)) => out.push_str(raw),
                Some(NodeKind::CData(raw)) => write!(out, "<![CDATA[{}]]>", raw)?,
                _ => {}
            }
        }
        return writeln!(out, "</{}>", element.name);
    }

    let children: Vec<NodeId> = all_children
        .iter()
        .copied()
        .filter(|&c| !document.kind(c).is_some_and(NodeKind::is_blank_text))
        .collect();

    writeln!(out, ">")?;
    for &child in &children {
        write_node(document, child, depth + 1, indent, out)?;
    }
    writeln!(out, "{}</{}>", pad, element.name)
}

/// Put every attribute after the first on its own line when the first
/// `wrap.element` start tag carries more than `wrap.threshold` attributes.
pub fn wrap_attributes(xml: &str, wrap: &AttributeWrap) -> XmlResult<String> {
    let tag = Regex::new(&format!(
        r#"<{}((?:\s+[^\s=/>]+\s*=\s*(?:"[^"]*"|'[^']*'))+)\s*(/?)>"#,
        regex::escape(&wrap.element)
    ))
    .map_err(|e| XmlError::Serialization(format!("compile attribute pattern: {}", e)))?;
    let attribute = Regex::new(r#"[^\s=/>]+\s*=\s*(?:"[^"]*"|'[^']*')"#)
        .map_err(|e| XmlError::Serialization(format!("compile attribute pattern: {}", e)))?;

    let separator = format!("\n{}", " ".repeat(wrap.indent));
    let wrapped = tag.replacen(xml, 1, |caps: &Captures<'_>| {
        let attributes: Vec<&str> = attribute.find_iter(&caps[1]).map(|m| m.as_str()).collect();
        if attributes.len() <= wrap.threshold {
            return caps[0].to_string();
        }
        format!(
            "<{} {}{}>",
            wrap.element,
            attributes.join(&separator),
            &caps[2]
        )
    });
    Ok(wrapped.into_owned())
}
