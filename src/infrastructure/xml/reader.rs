//! Event-driven parser producing a [`Document`].

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::{instrument, trace};

use crate::domain::{Attribute, Document, Element, NodeId, NodeKind};
use crate::infrastructure::xml::{XmlError, XmlResult};

/// Parse raw bytes; anything that is not UTF-8 is rejected.
pub fn parse_bytes(input: &[u8]) -> XmlResult<Document> {
    let text = std::str::from_utf8(input).map_err(|e| {
        XmlError::malformed(e.valid_up_to() as u64, format!("invalid UTF-8: {}", e))
    })?;
    parse_str(text)
}

/// Parse a complete document.
///
/// Whitespace, comments, CDATA, processing instructions, the declaration and
/// the DOCTYPE all become nodes. Character data and attribute values are stored
/// escaped, exactly as they appear in the source.
#[instrument(level = "debug", skip(input), fields(len = input.len()))]
pub fn parse_str(input: &str) -> XmlResult<Document> {
    let mut reader = Reader::from_str(input);
    let config = reader.config_mut();
    config.trim_text(false);
    config.check_end_names = true;
    config.expand_empty_elements = false;

    let mut document = Document::new();
    let mut open: Vec<NodeId> = Vec::new();

    loop {
        let event = reader
            .read_event()
            .map_err(|e| XmlError::malformed(reader.error_position(), e.to_string()))?;
        let position = reader.buffer_position();

        match event {
            Event::Start(start) => {
                let element = element_from(&start, position)?;
                let id = attach_element(&mut document, &open, element, position)?;
                open.push(id);
            }
            Event::Empty(start) => {
                let element = element_from(&start, position)?;
                attach_element(&mut document, &open, element, position)?;
            }
            Event::End(_) => {
                if open.pop().is_none() {
                    return Err(XmlError::malformed(position, "unexpected closing tag"));
                }
            }
            Event::Text(text) => {
                let raw = utf8(&text, position)?;
                match open.last() {
                    Some(&parent) => attach(&mut document, Some(parent), NodeKind::Text(raw))?,
                    None if raw.trim().is_empty() => {}
                    None => {
                        return Err(XmlError::malformed(position, "text outside the root element"))
                    }
                }
            }
            Event::CData(data) => {
                let raw = utf8(&data, position)?;
                attach(&mut document, open.last().copied(), NodeKind::CData(raw))?;
            }
            Event::Comment(comment) => {
                let raw = utf8(&comment, position)?;
                attach(&mut document, open.last().copied(), NodeKind::Comment(raw))?;
            }
            Event::Decl(decl) => {
                let raw = utf8(&decl, position)?;
                attach(&mut document, None, NodeKind::Declaration(raw))?;
            }
            Event::PI(pi) => {
                let raw = utf8(&pi, position)?;
                attach(
                    &mut document,
                    open.last().copied(),
                    NodeKind::ProcessingInstruction(raw),
                )?;
            }
            Event::DocType(doctype) => {
                let raw = utf8(&doctype, position)?;
                attach(&mut document, None, NodeKind::DocType(raw.trim().to_string()))?;
            }
            Event::Eof => break,
        }
    }

    let end = reader.buffer_position();
    if let Some(&unclosed) = open.last() {
        let name = document.tag_name(unclosed).unwrap_or_default();
        return Err(XmlError::malformed(end, format!("unclosed element <{}>", name)));
    }
    if document.root_element().is_none() {
        return Err(XmlError::malformed(end, "document has no root element"));
    }
    trace!(nodes = document.len(), "parsed document");
    Ok(document)
}

fn element_from(start: &BytesStart<'_>, position: u64) -> XmlResult<Element> {
    let mut element = Element::new(utf8(start.name().as_ref(), position)?);
    for attribute in start.attributes() {
        let attribute = attribute.map_err(|e| XmlError::malformed(position, e.to_string()))?;
        element.attributes.push(Attribute {
            name: utf8(attribute.key.as_ref(), position)?,
            value: utf8(&attribute.value, position)?,
        });
    }
    Ok(element)
}

fn attach_element(
    document: &mut Document,
    open: &[NodeId],
    element: Element,
    position: u64,
) -> XmlResult<NodeId> {
    let parent = open.last().copied();
    if parent.is_none() && document.root_element().is_some() {
        return Err(XmlError::malformed(position, "more than one root element"));
    }
    let id = document.create(NodeKind::Element(element));
    document
        .append_child(parent, id)
        .map_err(|e| XmlError::malformed(position, e.to_string()))?;
    Ok(id)
}

fn attach(document: &mut Document, parent: Option<NodeId>, kind: NodeKind) -> XmlResult<()> {
    let id = document.create(kind);
    document
        .append_child(parent, id)
        .map_err(|e| XmlError::malformed(0, e.to_string()))
}

fn utf8(bytes: &[u8], position: u64) -> XmlResult<String> {
    std::str::from_utf8(bytes)
        .map(str::to_string)
        .map_err(|e| XmlError::malformed(position, format!("invalid UTF-8: {}", e)))
}
