//! Tag-keyed, order-preserving XML node tree.
//!
//! A [`ParsedNode`] maps each qualified child tag (`p:sp`, `a:xfrm`) to a
//! [`NodeValue`]: a single child, or every same-tagged sibling in document
//! order. Attributes are kept apart from children and are addressed through
//! the reserved `attrs` path segment in [`get_text_by_path_list`].

use indexmap::IndexMap;

/// Reserved path segment that switches a lookup from children to attributes.
pub const ATTRS: &str = "attrs";

/// One XML element.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedNode {
    attrs: IndexMap<String, String>,
    children: IndexMap<String, NodeValue>,
    /// Element children in document order, as (tag slot, position within tag)
    document_order: Vec<(usize, usize)>,
    text: Option<String>,
}

/// The children stored under one tag.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeValue {
    Single(ParsedNode),
    Sequence(Vec<ParsedNode>),
}

/// Result of a path lookup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value<'a> {
    Node(&'a NodeValue),
    Attr(&'a str),
}

impl NodeValue {
    /// Every node under this tag, in document order.
    pub fn nodes(&self) -> &[ParsedNode] {
        match self {
            NodeValue::Single(node) => std::slice::from_ref(node),
            NodeValue::Sequence(nodes) => nodes,
        }
    }

    /// The node when exactly one sibling carries this tag.
    pub fn single(&self) -> Option<&ParsedNode> {
        match self {
            NodeValue::Single(node) => Some(node),
            NodeValue::Sequence(_) => None,
        }
    }

    /// Append a sibling, promoting a single node to a sequence. Returns the
    /// new node's position among its same-tagged siblings.
    fn push(&mut self, node: ParsedNode) -> usize {
        let nodes = match std::mem::replace(self, NodeValue::Sequence(Vec::new())) {
            NodeValue::Single(first) => vec![first, node],
            NodeValue::Sequence(mut nodes) => {
                nodes.push(node);
                nodes
            },
        };
        let position = nodes.len() - 1;
        *self = NodeValue::Sequence(nodes);
        position
    }
}

impl<'a> Value<'a> {
    /// Attribute text, or the text content of a single node.
    pub fn as_str(&self) -> Option<&'a str> {
        match *self {
            Value::Attr(s) => Some(s),
            Value::Node(value) => value.single().and_then(ParsedNode::text),
        }
    }

    /// The single node this value refers to.
    pub fn as_node(&self) -> Option<&'a ParsedNode> {
        match *self {
            Value::Node(value) => value.single(),
            Value::Attr(_) => None,
        }
    }

    pub fn as_node_value(&self) -> Option<&'a NodeValue> {
        match *self {
            Value::Node(value) => Some(value),
            Value::Attr(_) => None,
        }
    }
}

impl ParsedNode {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: set an attribute.
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    /// Builder: append a child element.
    pub fn with_child(mut self, tag: impl Into<String>, child: ParsedNode) -> Self {
        self.push_child(tag, child);
        self
    }

    /// Builder: set the text content.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attrs.insert(name.into(), value.into());
    }

    /// Append a child element after every existing child.
    pub fn push_child(&mut self, tag: impl Into<String>, child: ParsedNode) {
        let entry = self.children.entry(tag.into());
        let slot = entry.index();
        let position = match entry {
            indexmap::map::Entry::Occupied(mut occupied) => occupied.get_mut().push(child),
            indexmap::map::Entry::Vacant(vacant) => {
                vacant.insert(NodeValue::Single(child));
                0
            },
        };
        self.document_order.push((slot, position));
    }

    pub(crate) fn push_text(&mut self, text: &str) {
        self.text.get_or_insert_with(String::new).push_str(text);
    }

    pub(crate) fn clear_text(&mut self) {
        self.text = None;
    }

    #[inline]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    pub fn attrs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attrs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    #[inline]
    pub fn child(&self, tag: &str) -> Option<&NodeValue> {
        self.children.get(tag)
    }

    /// Tags in first-occurrence order, each with all of its siblings.
    pub fn children(&self) -> impl Iterator<Item = (&str, &NodeValue)> {
        self.children.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Every element child with its tag, in true document order, even when
    /// siblings of different tags are interleaved.
    pub fn children_in_document_order(&self) -> impl Iterator<Item = (&str, &ParsedNode)> {
        self.document_order.iter().filter_map(|&(slot, position)| {
            let (tag, value) = self.children.get_index(slot)?;
            value.nodes().get(position).map(|node| (tag.as_str(), node))
        })
    }

    #[inline]
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    #[inline]
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// The `order` attribute assigned at parse time.
    pub fn order(&self) -> Option<i64> {
        self.attr("order").and_then(|v| v.trim().parse().ok())
    }

    /// Shorthand for [`get_text_by_path_list`].
    #[inline]
    pub fn path(&self, segments: &[&str]) -> Option<Value<'_>> {
        get_text_by_path_list(self, segments)
    }

    /// Single node at the end of `segments`.
    pub fn node_at(&self, segments: &[&str]) -> Option<&ParsedNode> {
        self.path(segments)?.as_node()
    }

    /// Attribute `name` of the single node at `segments`.
    pub fn attr_at(&self, segments: &[&str], name: &str) -> Option<&str> {
        if segments.is_empty() {
            return self.attr(name);
        }
        self.node_at(segments)?.attr(name)
    }
}

/// Chained lookup through a node by tag names.
///
/// `attrs` followed by a name selects an attribute of the current node. Any
/// missing key, or a sequence met before the last segment, yields `None`.
/// An empty path has no value.
pub fn get_text_by_path_list<'a>(node: &'a ParsedNode, segments: &[&str]) -> Option<Value<'a>> {
    let (first, rest) = segments.split_first()?;
    if *first == ATTRS {
        return match rest {
            [name] => node.attr(name).map(Value::Attr),
            _ => None,
        };
    }

    let value = node.child(first)?;
    if rest.is_empty() {
        return Some(Value::Node(value));
    }
    get_text_by_path_list(value.single()?, rest)
}
