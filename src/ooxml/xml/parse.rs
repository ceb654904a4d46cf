//! Builds a [`ParsedNode`] tree from XML bytes with quick-xml.

use super::node::ParsedNode;
use crate::ooxml::error::{OoxmlError, Result};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

/// Attribute holding an element's 1-based position among its parent's
/// element children.
pub const ORDER_ATTR: &str = "order";

struct Frame {
    tag: String,
    node: ParsedNode,
    element_count: usize,
}

/// Parse an XML part into a document root node.
///
/// The returned node is a synthetic root whose only child is the document
/// element, so a slide is reached with `["p:sld", "p:cSld", "p:spTree"]`.
/// Every element gets an `order` attribute unless it already carries one.
pub fn parse_xml(xml: &[u8]) -> Result<ParsedNode> {
    let mut reader = Reader::from_reader(xml);
    // Leading and trailing spaces in `a:t` runs are significant
    reader.config_mut().trim_text(false);

    let mut stack = vec![Frame {
        tag: String::new(),
        node: ParsedNode::new(),
        element_count: 0,
    }];

    loop {
        match reader.read_event()? {
            Event::Start(ref e) => {
                let frame = open_element(e, &mut stack)?;
                stack.push(frame);
            },
            Event::Empty(ref e) => {
                let frame = open_element(e, &mut stack)?;
                attach(&mut stack, frame);
            },
            Event::End(_) => {
                if stack.len() > 1
                    && let Some(frame) = stack.pop()
                {
                    attach(&mut stack, frame);
                }
            },
            Event::Text(ref e) => {
                let text = e.decode().map_err(|e| OoxmlError::Xml(e.to_string()))?;
                top(&mut stack).push_text(&text);
            },
            Event::CData(ref e) => {
                let text = e.decode().map_err(|e| OoxmlError::Xml(e.to_string()))?;
                top(&mut stack).push_text(&text);
            },
            Event::GeneralRef(ref e) => {
                if let Some(ch) = e
                    .resolve_char_ref()
                    .map_err(|e| OoxmlError::Xml(e.to_string()))?
                {
                    let mut buf = [0u8; 4];
                    top(&mut stack).push_text(ch.encode_utf8(&mut buf));
                } else {
                    let name = e.decode().map_err(|e| OoxmlError::Xml(e.to_string()))?;
                    match quick_xml::escape::resolve_predefined_entity(&name) {
                        Some(resolved) => top(&mut stack).push_text(resolved),
                        None => {
                            return Err(OoxmlError::Xml(format!("unknown entity &{};", name)));
                        },
                    }
                }
            },
            Event::Eof => break,
            _ => {},
        }
    }

    // Tolerate truncated parts by closing whatever is still open
    while stack.len() > 1 {
        if let Some(frame) = stack.pop() {
            attach(&mut stack, frame);
        }
    }

    Ok(stack.pop().map(|frame| frame.node).unwrap_or_default())
}

fn top(stack: &mut [Frame]) -> &mut ParsedNode {
    // The synthetic root is never popped
    &mut stack[stack.len() - 1].node
}

fn open_element(e: &BytesStart<'_>, stack: &mut [Frame]) -> Result<Frame> {
    let parent = stack.len() - 1;
    stack[parent].element_count += 1;
    let ordinal = stack[parent].element_count;

    let mut node = ParsedNode::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|e| OoxmlError::Xml(e.to_string()))?;
        let value = attr
            .unescape_value()
            .map_err(|e| OoxmlError::Xml(e.to_string()))?;
        node.set_attr(String::from_utf8_lossy(attr.key.as_ref()), value);
    }
    if node.attr(ORDER_ATTR).is_none() {
        let mut buf = itoa::Buffer::new();
        node.set_attr(ORDER_ATTR, buf.format(ordinal));
    }

    Ok(Frame {
        tag: String::from_utf8_lossy(e.name().as_ref()).into_owned(),
        node,
        element_count: 0,
    })
}

fn attach(stack: &mut [Frame], mut frame: Frame) {
    if frame.node.has_children()
        && frame
            .node
            .text()
            .is_some_and(|text| text.trim().is_empty())
    {
        frame.node.clear_text();
    }
    top(stack).push_child(frame.tag, frame.node);
}
