//! Default HTML composers for leaf shapes.
//!
//! Each leaf becomes an absolutely positioned `<div class='block ..'>` whose
//! stacking index is the node's document order. Geometry comes from the
//! shape's own transform or, for placeholders without one, from the matching
//! layout and master shapes.

use super::fragment::{RenderFragment, StyleBuilder, escape_html, open_div};
use super::{ComposeContext, LeafComposer};
use crate::ooxml::pptx::placeholder::PlaceholderKey;
use crate::ooxml::pptx::transform::Xfrm;
use crate::ooxml::xml::ParsedNode;
use std::collections::HashMap;
use tracing::debug;

const SHAPE_XFRM: [&str; 2] = ["p:spPr", "a:xfrm"];
const FRAME_XFRM: [&str; 1] = ["p:xfrm"];
const GRAPHIC_DATA: [&str; 2] = ["a:graphic", "a:graphicData"];

const TABLE_URI: &str = "http://schemas.openxmlformats.org/drawingml/2006/table";
const CHART_URI: &str = "http://schemas.openxmlformats.org/drawingml/2006/chart";
const DIAGRAM_URI: &str = "http://schemas.openxmlformats.org/drawingml/2006/diagram";

/// Leaf composer producing positioned HTML.
#[derive(Debug, Clone, Default)]
pub struct HtmlLeafComposer {
    /// Relationship id to an image `src` (usually a `data:` URI)
    image_sources: HashMap<String, String>,
}

impl HtmlLeafComposer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the `src` for pictures whose blip references `r_id`.
    pub fn with_image_source(mut self, r_id: impl Into<String>, src: impl Into<String>) -> Self {
        self.image_sources.insert(r_id.into(), src.into());
        self
    }

    pub fn insert_image_source(&mut self, r_id: impl Into<String>, src: impl Into<String>) {
        self.image_sources.insert(r_id.into(), src.into());
    }

    /// Open the leaf's `<div>` with its position, transform and identity.
    fn open_leaf(
        &self,
        out: &mut String,
        class: &str,
        node: &ParsedNode,
        xfrm_path: &[&str],
        ctx: &ComposeContext<'_>,
        extra: &[(&str, &str)],
    ) {
        let mut style = StyleBuilder::new();
        if let Some(z) = node.order() {
            style.z_index(z);
        }
        if let Some(xfrm) = resolve_xfrm(node, xfrm_path, ctx) {
            style.transform(xfrm.rotation_degrees, xfrm.flip_h, xfrm.flip_v);
            style.bounds(&xfrm.bounds());
        }

        let key = PlaceholderKey::of(node);
        let mut data: Vec<(&str, &str)> = Vec::with_capacity(3 + extra.len());
        if let Some(id) = key.id {
            data.push(("data-id", id));
        }
        if let Some(idx) = key.idx {
            data.push(("data-idx", idx));
        }
        if let Some(ph_type) = key.ph_type {
            data.push(("data-type", ph_type));
        }
        data.extend_from_slice(extra);

        open_div(out, class, &style.finish(), &data);
    }
}

impl LeafComposer for HtmlLeafComposer {
    fn shape(&self, node: &ParsedNode, ctx: &ComposeContext<'_>) -> RenderFragment {
        let mut out = String::new();
        self.open_leaf(&mut out, "shape", node, &SHAPE_XFRM, ctx, &[]);
        if let Some(body) = node.node_at(&["p:txBody"]) {
            write_text_body(&mut out, body);
        }
        out.push_str("</div>");
        RenderFragment::new(node.order(), out)
    }

    fn connector(&self, node: &ParsedNode, ctx: &ComposeContext<'_>) -> RenderFragment {
        let ends = ["a:stCxn", "a:endCxn"].map(|end| {
            node.attr_at(&["p:nvCxnSpPr", "p:cNvCxnSpPr", end], "id")
                .filter(|id| ctx.scope.by_id(id).is_some())
        });
        let mut extra = Vec::with_capacity(2);
        if let Some(start) = ends[0] {
            extra.push(("data-start", start));
        }
        if let Some(end) = ends[1] {
            extra.push(("data-end", end));
        }

        let mut out = String::new();
        self.open_leaf(&mut out, "connector", node, &SHAPE_XFRM, ctx, &extra);
        out.push_str("</div>");
        RenderFragment::new(node.order(), out)
    }

    fn picture(&self, node: &ParsedNode, ctx: &ComposeContext<'_>) -> RenderFragment {
        let r_id = node.attr_at(&["p:blipFill", "a:blip"], "r:embed");
        let extra: Vec<(&str, &str)> = r_id.map(|id| ("data-rel-id", id)).into_iter().collect();

        let mut out = String::new();
        self.open_leaf(&mut out, "picture", node, &SHAPE_XFRM, ctx, &extra);
        match r_id.and_then(|id| self.image_sources.get(id)) {
            Some(src) => {
                out.push_str("<img src='");
                escape_html(src, &mut out);
                out.push_str("' style='width: 100%; height: 100%;'/>");
            },
            None => debug!(r_id, "picture without an embeddable image"),
        }
        out.push_str("</div>");
        RenderFragment::new(node.order(), out)
    }

    fn graphic_frame(&self, node: &ParsedNode, ctx: &ComposeContext<'_>) -> RenderFragment {
        let data = node.node_at(&GRAPHIC_DATA);
        let uri = data.and_then(|d| d.attr("uri")).unwrap_or_default();

        let mut out = String::new();
        match uri {
            TABLE_URI => {
                self.open_leaf(&mut out, "table", node, &FRAME_XFRM, ctx, &[]);
                if let Some(table) = data.and_then(|d| d.node_at(&["a:tbl"])) {
                    write_table(&mut out, table);
                }
            },
            CHART_URI => {
                let rel = data.and_then(|d| d.attr_at(&["c:chart"], "r:id"));
                let extra: Vec<(&str, &str)> = rel.map(|id| ("data-rel-id", id)).into_iter().collect();
                self.open_leaf(&mut out, "chart", node, &FRAME_XFRM, ctx, &extra);
            },
            DIAGRAM_URI => {
                let rel = data.and_then(|d| d.attr_at(&["dgm:relIds"], "r:dm"));
                let extra: Vec<(&str, &str)> = rel.map(|id| ("data-rel-id", id)).into_iter().collect();
                self.open_leaf(&mut out, "diagram", node, &FRAME_XFRM, ctx, &extra);
            },
            _ => self.open_leaf(&mut out, "graphic-frame", node, &FRAME_XFRM, ctx, &[]),
        }
        out.push_str("</div>");
        RenderFragment::new(node.order(), out)
    }
}

/// The node's own transform, else the nearest inherited placeholder's,
/// relative to the enclosing group when that group is rotated.
fn resolve_xfrm(node: &ParsedNode, xfrm_path: &[&str], ctx: &ComposeContext<'_>) -> Option<Xfrm> {
    let own = node
        .node_at(xfrm_path)
        .and_then(|x| Xfrm::from_node(x, ctx.slide_scale));
    let mut xfrm = own.or_else(|| {
        ctx.tables
            .inherited(node)
            .into_iter()
            .find_map(|source| {
                source
                    .node_at(xfrm_path)
                    .and_then(|x| Xfrm::from_node(x, ctx.slide_scale))
            })
    })?;

    if let Some((dx, dy)) = ctx.rotated_parent_offset() {
        xfrm.x -= dx;
        xfrm.y -= dy;
    }
    Some(xfrm)
}

fn write_text_body(out: &mut String, body: &ParsedNode) {
    let Some(paragraphs) = body.child("a:p") else {
        return;
    };
    for paragraph in paragraphs.nodes() {
        out.push_str("<div class='paragraph'>");
        for (tag, child) in paragraph.children_in_document_order() {
            match tag {
                "a:r" | "a:fld" => {
                    if let Some(text) = child.node_at(&["a:t"]).and_then(ParsedNode::text) {
                        out.push_str("<span>");
                        escape_html(text, out);
                        out.push_str("</span>");
                    }
                },
                "a:br" => out.push_str("<br/>"),
                _ => {},
            }
        }
        out.push_str("</div>");
    }
}

fn write_table(out: &mut String, table: &ParsedNode) {
    out.push_str("<table>");
    if let Some(rows) = table.child("a:tr") {
        for row in rows.nodes() {
            out.push_str("<tr>");
            if let Some(cells) = row.child("a:tc") {
                for cell in cells.nodes() {
                    write_cell(out, cell);
                }
            }
            out.push_str("</tr>");
        }
    }
    out.push_str("</table>");
}

fn write_cell(out: &mut String, cell: &ParsedNode) {
    // Cells covered by a merge are drawn by the merge origin
    if is_set(cell.attr("hMerge")) || is_set(cell.attr("vMerge")) {
        return;
    }
    out.push_str("<td");
    for (attr, html) in [("gridSpan", "colspan"), ("rowSpan", "rowspan")] {
        if let Some(span) = cell.attr(attr).and_then(|v| v.parse::<u32>().ok())
            && span > 1
        {
            let mut buf = itoa::Buffer::new();
            out.push(' ');
            out.push_str(html);
            out.push_str("='");
            out.push_str(buf.format(span));
            out.push('\'');
        }
    }
    out.push('>');
    if let Some(body) = cell.node_at(&["a:txBody"]) {
        write_text_body(out, body);
    }
    out.push_str("</td>");
}

fn is_set(value: Option<&str>) -> bool {
    matches!(value, Some("1") | Some("true"))
}
