//! Shape-tree composition.
//!
//! [`SlideComposer`] walks a shape tree depth-first in document order and
//! routes every child element by its tag:
//!
//! | Tag | Route |
//! |---|---|
//! | `p:sp` | [`LeafComposer::shape`] |
//! | `p:cxnSp` | [`LeafComposer::connector`] |
//! | `p:pic` | [`LeafComposer::picture`] |
//! | `p:graphicFrame` | [`LeafComposer::graphic_frame`] |
//! | `p:grpSp` | recursive group composition |
//! | `mc:AlternateContent` | its `mc:Fallback` branch, composed as a group |
//!
//! Any other tag composes to an empty fragment. Nothing here fails: a node
//! that cannot be composed contributes nothing and its siblings are
//! unaffected.

pub mod fragment;
pub mod leaf;

pub use fragment::{Container, RenderFragment, StyleBuilder, emit_container};
pub use leaf::HtmlLeafComposer;

use crate::ooxml::pptx::placeholder::{PlaceholderIndex, PlaceholderTables, build_index};
use crate::ooxml::pptx::transform::{ContainerKind, GroupTransform, resolve_group_transform};
use crate::ooxml::xml::{NodeValue, ParsedNode};
use tracing::{debug, trace};

/// Node kinds the dispatcher knows how to route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Shape,
    Connector,
    Picture,
    GraphicFrame,
    Group,
    AlternateContent,
}

static NODE_KINDS: phf::Map<&'static str, NodeKind> = phf::phf_map! {
    "p:sp" => NodeKind::Shape,
    "p:cxnSp" => NodeKind::Connector,
    "p:pic" => NodeKind::Picture,
    "p:graphicFrame" => NodeKind::GraphicFrame,
    "p:grpSp" => NodeKind::Group,
    "mc:AlternateContent" => NodeKind::AlternateContent,
};

impl NodeKind {
    /// Route for a qualified tag, `None` for tags that are ignored.
    #[inline]
    pub fn from_tag(tag: &str) -> Option<Self> {
        NODE_KINDS.get(tag).copied()
    }
}

/// Everything a composer may read while composing one node.
#[derive(Debug, Clone, Copy)]
pub struct ComposeContext<'a> {
    /// Slide, layout and master placeholder indices
    pub tables: &'a PlaceholderTables<'a>,
    /// Shapes of the innermost enclosing tree (slide or group), by id
    pub scope: &'a PlaceholderIndex<'a>,
    /// Pixels per EMU
    pub slide_scale: f64,
    /// Kind of the innermost enclosing container
    pub ancestor: ContainerKind,
    /// Transform of the innermost enclosing group, if it has one
    pub parent: Option<GroupTransform>,
}

impl<'a> ComposeContext<'a> {
    /// Context for the top level of a slide's shape tree.
    pub fn for_slide(tables: &'a PlaceholderTables<'a>, slide_scale: f64) -> Self {
        Self {
            tables,
            scope: &tables.slide,
            slide_scale,
            ancestor: ContainerKind::Slide,
            parent: None,
        }
    }

    /// True when some ancestor group is rotated.
    #[inline]
    pub fn in_rotated_group(&self) -> bool {
        self.ancestor == ContainerKind::RotatedGroup
    }

    /// Child offset of the enclosing group when that group is rotated.
    ///
    /// A rotated container sits at its own box, so positions read in its
    /// child coordinate space are shifted by this offset. Containers deeper
    /// down are already placed relative to their own group.
    pub fn rotated_parent_offset(&self) -> Option<(f64, f64)> {
        self.parent
            .filter(|t| t.kind() == ContainerKind::RotatedGroup)
            .map(|t| (t.child_offset_x, t.child_offset_y))
    }
}

/// Per-kind renderers for leaf nodes.
///
/// Implementations receive the leaf node and the composition context and
/// return its positioned fragment. They own all geometry and styling of the
/// leaf, including fallbacks for missing transforms.
pub trait LeafComposer {
    /// A `p:sp` shape (geometry, fill and text).
    fn shape(&self, node: &ParsedNode, ctx: &ComposeContext<'_>) -> RenderFragment;

    /// A `p:cxnSp` connector.
    fn connector(&self, node: &ParsedNode, ctx: &ComposeContext<'_>) -> RenderFragment;

    /// A `p:pic` picture.
    fn picture(&self, node: &ParsedNode, ctx: &ComposeContext<'_>) -> RenderFragment;

    /// A `p:graphicFrame` holding a table, chart or diagram.
    fn graphic_frame(&self, node: &ParsedNode, ctx: &ComposeContext<'_>) -> RenderFragment;
}

/// Recursive, order-preserving shape-tree walker.
///
/// Holds no state between calls; composing the same tree twice yields the
/// same output.
#[derive(Debug, Clone, Copy)]
pub struct SlideComposer<'l, L> {
    leaf: &'l L,
}

impl<'l, L: LeafComposer> SlideComposer<'l, L> {
    pub fn new(leaf: &'l L) -> Self {
        Self { leaf }
    }

    /// Compose every child of `node` and concatenate the results in
    /// document order.
    pub fn compose_children(&self, node: &ParsedNode, ctx: &ComposeContext<'_>) -> RenderFragment {
        RenderFragment::concat(self.compose_each(node, ctx))
    }

    /// One fragment per element child of `node`, in document order. Ignored
    /// children yield empty fragments.
    pub fn compose_each(&self, node: &ParsedNode, ctx: &ComposeContext<'_>) -> Vec<RenderFragment> {
        node.children_in_document_order()
            .map(|(tag, child)| self.dispatch_node(tag, child, ctx))
            .collect()
    }

    /// Compose all siblings stored under one tag.
    pub fn dispatch(&self, tag: &str, value: &NodeValue, ctx: &ComposeContext<'_>) -> RenderFragment {
        RenderFragment::concat(
            value
                .nodes()
                .iter()
                .map(|node| self.dispatch_node(tag, node, ctx)),
        )
    }

    /// Compose a single element according to its tag.
    pub fn dispatch_node(&self, tag: &str, node: &ParsedNode, ctx: &ComposeContext<'_>) -> RenderFragment {
        match NodeKind::from_tag(tag) {
            Some(NodeKind::Shape) => self.leaf.shape(node, ctx),
            Some(NodeKind::Connector) => self.leaf.connector(node, ctx),
            Some(NodeKind::Picture) => self.leaf.picture(node, ctx),
            Some(NodeKind::GraphicFrame) => self.leaf.graphic_frame(node, ctx),
            Some(NodeKind::Group) => self.compose_group(node, ctx),
            // The wrapper stacks where the AlternateContent sits among its siblings
            Some(NodeKind::AlternateContent) => match node.node_at(&["mc:Fallback"]) {
                Some(fallback) => self.compose_container(fallback, node.order(), ctx),
                None => {
                    debug!("alternate content without a fallback branch");
                    RenderFragment::empty()
                },
            },
            None => {
                debug!(tag, "ignoring unrecognized node kind");
                RenderFragment::empty()
            },
        }
    }

    /// Compose a group: index its shapes, resolve its transform and wrap its
    /// composed children in a container carrying that placement.
    pub fn compose_group(&self, group: &ParsedNode, ctx: &ComposeContext<'_>) -> RenderFragment {
        self.compose_container(group, group.order(), ctx)
    }

    fn compose_container(
        &self,
        group: &ParsedNode,
        z_index: Option<i64>,
        ctx: &ComposeContext<'_>,
    ) -> RenderFragment {
        let scope = build_index(group);
        let transform = resolve_group_transform(group, ctx.slide_scale);
        if transform.is_none() {
            debug!(order = ?group.order(), "group without a transform, composing unpositioned");
        }

        let kind = match transform {
            Some(t) => t.kind(),
            None => ContainerKind::Group,
        };
        // A rotated ancestor stays visible to descendants of nested groups
        let ancestor = if ctx.in_rotated_group() {
            ContainerKind::RotatedGroup
        } else {
            kind
        };
        trace!(kind = kind.as_str(), "composing group");

        let inner = ComposeContext {
            tables: ctx.tables,
            scope: &scope,
            slide_scale: ctx.slide_scale,
            ancestor,
            parent: transform,
        };
        let children = self.compose_each(group, &inner);

        let container = Container {
            class: kind.as_str(),
            z_index,
            bounds: transform.map(|t| {
                let mut bounds = t.bounds();
                if let Some((dx, dy)) = ctx.rotated_parent_offset() {
                    bounds.left -= dx;
                    bounds.top -= dy;
                }
                bounds
            }),
            rotation_degrees: transform.map_or(0.0, |t| t.rotation_degrees),
        };
        emit_container(&container, children)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::xml::parse_xml;
    use std::cell::RefCell;

    /// Records every leaf it is asked to compose and emits `<tag order>`.
    #[derive(Default)]
    struct Recorder {
        seen: RefCell<Vec<(&'static str, ContainerKind)>>,
    }

    impl Recorder {
        fn emit(&self, tag: &'static str, node: &ParsedNode, ctx: &ComposeContext<'_>) -> RenderFragment {
            self.seen.borrow_mut().push((tag, ctx.ancestor));
            let order = node.order();
            RenderFragment::new(order, format!("<{} {}>", tag, order.unwrap_or(-1)))
        }
    }

    impl LeafComposer for Recorder {
        fn shape(&self, node: &ParsedNode, ctx: &ComposeContext<'_>) -> RenderFragment {
            self.emit("sp", node, ctx)
        }
        fn connector(&self, node: &ParsedNode, ctx: &ComposeContext<'_>) -> RenderFragment {
            self.emit("cxn", node, ctx)
        }
        fn picture(&self, node: &ParsedNode, ctx: &ComposeContext<'_>) -> RenderFragment {
            self.emit("pic", node, ctx)
        }
        fn graphic_frame(&self, node: &ParsedNode, ctx: &ComposeContext<'_>) -> RenderFragment {
            self.emit("frame", node, ctx)
        }
    }

    fn sp_tree(xml: &str) -> ParsedNode {
        let wrapped = format!("<p:spTree>{}</p:spTree>", xml);
        let root = parse_xml(wrapped.as_bytes()).unwrap();
        root.node_at(&["p:spTree"]).unwrap().clone()
    }

    fn compose(tree: &ParsedNode, leaf: &Recorder) -> Vec<RenderFragment> {
        let tables = PlaceholderTables {
            slide: build_index(tree),
            ..Default::default()
        };
        let ctx = ComposeContext::for_slide(&tables, 1.0);
        SlideComposer::new(leaf).compose_each(tree, &ctx)
    }

    #[test]
    fn test_routes_each_kind() {
        let tree = sp_tree(
            "<p:sp/><p:cxnSp/><p:pic/><p:graphicFrame/>\
             <p:grpSp><p:grpSpPr/><p:sp/></p:grpSp>",
        );
        let leaf = Recorder::default();
        let out = compose(&tree, &leaf);

        let markup: Vec<&str> = out.iter().map(RenderFragment::markup).collect();
        assert_eq!(
            markup,
            [
                "<sp 1>",
                "<cxn 2>",
                "<pic 3>",
                "<frame 4>",
                "<div class='block group' style='z-index: 5;'><sp 2></div>",
            ]
        );
    }

    #[test]
    fn test_order_is_document_order_across_tags() {
        let tree = sp_tree("<p:sp/><p:pic/><p:sp/><p:cxnSp/><p:pic/><p:sp/>");
        let leaf = Recorder::default();
        let z: Vec<Option<i64>> = compose(&tree, &leaf)
            .iter()
            .map(RenderFragment::z_index)
            .collect();
        assert_eq!(z, [Some(1), Some(2), Some(3), Some(4), Some(5), Some(6)]);
    }

    #[test]
    fn test_unknown_kind_contributes_nothing() {
        let plain = sp_tree("<p:sp/><p:pic/>");
        let noisy = sp_tree("<p:sp/><p14:futureThing/><p:pic/>");
        let leaf = Recorder::default();

        let plain_out = compose(&plain, &leaf);
        let noisy_out = compose(&noisy, &leaf);

        assert_eq!(noisy_out.len(), 3);
        assert!(noisy_out[1].is_empty());
        assert_eq!(noisy_out[0], plain_out[0]);
        // The picture keeps its own document order
        assert_eq!(noisy_out[2].z_index(), Some(3));
    }

    #[test]
    fn test_composition_is_idempotent() {
        let tree = sp_tree(
            r#"<p:grpSp><p:grpSpPr><a:xfrm rot="5400000"><a:off x="10" y="20"/><a:ext cx="100" cy="50"/></a:xfrm></p:grpSpPr>
               <p:sp/><p:grpSp><p:grpSpPr/><p:pic/></p:grpSp></p:grpSp><p:sp/>"#,
        );
        let leaf = Recorder::default();
        let first = RenderFragment::concat(compose(&tree, &leaf));
        let second = RenderFragment::concat(compose(&tree, &leaf));
        assert_eq!(first.markup(), second.markup());
    }

    #[test]
    fn test_rotated_group_is_visible_to_descendants() {
        let tree = sp_tree(
            r#"<p:grpSp><p:grpSpPr><a:xfrm rot="5400000"><a:off x="10" y="20"/><a:ext cx="100" cy="50"/>
                 <a:chOff x="0" y="0"/><a:chExt cx="50" cy="25"/></a:xfrm></p:grpSpPr>
                 <p:sp/>
                 <p:grpSp><p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="5" cy="5"/></a:xfrm></p:grpSpPr><p:pic/></p:grpSp>
               </p:grpSp>
               <p:cxnSp/>"#,
        );
        let leaf = Recorder::default();
        let out = compose(&tree, &leaf);

        assert!(out[0].markup().starts_with(
            "<div class='block group-rotate' style='z-index: 1; transform: rotate(90deg); top: 20px; left: 10px; width: 100px; height: 50px;'>"
        ));
        assert_eq!(
            *leaf.seen.borrow(),
            [
                ("sp", ContainerKind::RotatedGroup),
                ("pic", ContainerKind::RotatedGroup),
                ("cxn", ContainerKind::Slide),
            ]
        );
    }

    #[test]
    fn test_nested_group_is_placed_in_rotated_child_space() {
        let tree = sp_tree(
            r#"<p:grpSp><p:grpSpPr><a:xfrm rot="5400000"><a:off x="0" y="0"/><a:ext cx="100" cy="100"/>
                 <a:chOff x="4" y="6"/><a:chExt cx="100" cy="100"/></a:xfrm></p:grpSpPr>
                 <p:grpSp><p:grpSpPr><a:xfrm><a:off x="10" y="10"/><a:ext cx="20" cy="20"/>
                   <a:chOff x="10" y="10"/><a:chExt cx="20" cy="20"/></a:xfrm></p:grpSpPr><p:sp/></p:grpSp>
               </p:grpSp>"#,
        );
        let leaf = Recorder::default();
        let out = compose(&tree, &leaf);

        assert!(out[0].markup().contains(
            "<div class='block group' style='z-index: 2; top: -6px; left: -4px; width: 0px; height: 0px;'><sp 2></div>"
        ));
    }

    #[test]
    fn test_alternate_content_stacks_at_its_own_order() {
        let tree = sp_tree(
            r#"<p:sp/><mc:AlternateContent><mc:Choice Requires="a14"/><mc:Fallback><p:pic/></mc:Fallback></mc:AlternateContent><p:sp/>"#,
        );
        let leaf = Recorder::default();
        let z: Vec<Option<i64>> = compose(&tree, &leaf)
            .iter()
            .map(RenderFragment::z_index)
            .collect();
        assert_eq!(z, [Some(1), Some(2), Some(3)]);
    }

    #[test]
    fn test_alternate_content_uses_fallback() {
        let tree = sp_tree(
            r#"<mc:AlternateContent>
                 <mc:Choice Requires="a14"><p:sp/></mc:Choice>
                 <mc:Fallback><p:pic/></mc:Fallback>
               </mc:AlternateContent>
               <mc:AlternateContent><mc:Choice Requires="a14"><p:sp/></mc:Choice></mc:AlternateContent>"#,
        );
        let leaf = Recorder::default();
        let out = compose(&tree, &leaf);

        assert_eq!(out[0].markup(), "<div class='block group' style='z-index: 1;'><pic 1></div>");
        assert!(out[1].is_empty());
        assert_eq!(*leaf.seen.borrow(), [("pic", ContainerKind::Group)]);
    }

    #[test]
    fn test_dispatch_sequence_in_sibling_order() {
        let tree = sp_tree("<p:sp/><p:pic/><p:sp/>");
        let tables = PlaceholderTables::default();
        let ctx = ComposeContext::for_slide(&tables, 1.0);
        let leaf = Recorder::default();
        let composer = SlideComposer::new(&leaf);

        let out = composer.dispatch("p:sp", tree.child("p:sp").unwrap(), &ctx);
        assert_eq!(out.markup(), "<sp 1><sp 3>");
        assert!(composer.dispatch("p:unknown", tree.child("p:pic").unwrap(), &ctx).is_empty());
    }
}
