//! 2-D transforms (`a:xfrm`) of shapes and group containers.
//!
//! Coordinates are stored in English Metric Units and converted to pixels
//! with the slide scale (pixels per EMU). Angles are stored in 60,000ths of a
//! degree.

use crate::ooxml::xml::ParsedNode;

/// English Metric Units per inch.
pub const EMU_PER_INCH: f64 = 914_400.0;

/// Angle units per degree (ECMA-376 `ST_Angle`).
pub const ANGLE_UNITS_PER_DEGREE: f64 = 60_000.0;

/// Pixels per EMU for a target resolution.
#[inline]
pub fn slide_scale_for_dpi(dpi: f64) -> f64 {
    dpi / EMU_PER_INCH
}

/// What kind of container a node is composed inside.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContainerKind {
    /// Directly on the slide
    #[default]
    Slide,
    /// Inside an unrotated group, positioned with the child-offset delta
    Group,
    /// Inside a rotated group, positioned at the group's own box
    RotatedGroup,
}

impl ContainerKind {
    /// The CSS class name used for this container kind.
    pub fn as_str(self) -> &'static str {
        match self {
            ContainerKind::Slide => "slide",
            ContainerKind::Group => "group",
            ContainerKind::RotatedGroup => "group-rotate",
        }
    }

    #[inline]
    pub fn is_group(self) -> bool {
        !matches!(self, ContainerKind::Slide)
    }
}

/// A positioned box in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BoxBounds {
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
}

/// A leaf shape's `a:xfrm`, scaled to pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Xfrm {
    pub x: f64,
    pub y: f64,
    pub cx: f64,
    pub cy: f64,
    pub rotation_degrees: f64,
    pub flip_h: bool,
    pub flip_v: bool,
}

impl Xfrm {
    /// Read an `a:xfrm` (or `p:xfrm`) element.
    ///
    /// Offset and extent are required; a missing or non-numeric coordinate
    /// makes the whole transform absent.
    pub fn from_node(xfrm: &ParsedNode, slide_scale: f64) -> Option<Self> {
        let (x, y) = scaled_pair(xfrm, "a:off", "x", "y", slide_scale)?;
        let (cx, cy) = scaled_pair(xfrm, "a:ext", "cx", "cy", slide_scale)?;
        Some(Self {
            x,
            y,
            cx,
            cy,
            rotation_degrees: rotation_degrees(xfrm),
            flip_h: flag(xfrm, "flipH"),
            flip_v: flag(xfrm, "flipV"),
        })
    }

    #[inline]
    pub fn bounds(&self) -> BoxBounds {
        BoxBounds {
            top: self.y,
            left: self.x,
            width: self.cx,
            height: self.cy,
        }
    }
}

/// Resolved placement of a group container.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GroupTransform {
    pub offset_x: f64,
    pub offset_y: f64,
    pub extent_x: f64,
    pub extent_y: f64,
    pub child_offset_x: f64,
    pub child_offset_y: f64,
    pub child_extent_x: f64,
    pub child_extent_y: f64,
    pub rotation_degrees: f64,
}

impl GroupTransform {
    /// `Group` for an unrotated group, `RotatedGroup` otherwise.
    #[inline]
    pub fn kind(&self) -> ContainerKind {
        if self.rotation_degrees == 0.0 {
            ContainerKind::Group
        } else {
            ContainerKind::RotatedGroup
        }
    }

    /// The container box.
    ///
    /// Unrotated groups use the own-minus-child delta so the child coordinate
    /// space nests inside the parent's. Rotated groups keep their own box so
    /// the rotation pivots around the unshifted center.
    pub fn bounds(&self) -> BoxBounds {
        match self.kind() {
            ContainerKind::RotatedGroup => BoxBounds {
                top: self.offset_y,
                left: self.offset_x,
                width: self.extent_x,
                height: self.extent_y,
            },
            _ => BoxBounds {
                top: self.offset_y - self.child_offset_y,
                left: self.offset_x - self.child_offset_x,
                width: self.extent_x - self.child_extent_x,
                height: self.extent_y - self.child_extent_y,
            },
        }
    }
}

/// Resolve the transform of a `p:grpSp` node.
///
/// Returns `None` when the group has no usable `p:grpSpPr/a:xfrm`; such a
/// group is composed unpositioned. Missing `a:chOff`/`a:chExt` default to the
/// group's own offset/extent (ECMA-376 §20.1.7.5).
pub fn resolve_group_transform(group: &ParsedNode, slide_scale: f64) -> Option<GroupTransform> {
    let xfrm = group.node_at(&["p:grpSpPr", "a:xfrm"])?;
    let (offset_x, offset_y) = scaled_pair(xfrm, "a:off", "x", "y", slide_scale)?;
    let (extent_x, extent_y) = scaled_pair(xfrm, "a:ext", "cx", "cy", slide_scale)?;

    let (child_offset_x, child_offset_y) =
        scaled_pair(xfrm, "a:chOff", "x", "y", slide_scale).unwrap_or((offset_x, offset_y));
    let (child_extent_x, child_extent_y) =
        scaled_pair(xfrm, "a:chExt", "cx", "cy", slide_scale).unwrap_or((extent_x, extent_y));

    Some(GroupTransform {
        offset_x,
        offset_y,
        extent_x,
        extent_y,
        child_offset_x,
        child_offset_y,
        child_extent_x,
        child_extent_y,
        rotation_degrees: rotation_degrees(xfrm),
    })
}

/// Rotation of an `a:xfrm` in degrees; absent or malformed `rot` is 0.
pub fn rotation_degrees(xfrm: &ParsedNode) -> f64 {
    xfrm.attr("rot")
        .and_then(parse_emu)
        .map_or(0.0, |rot| rot as f64 / ANGLE_UNITS_PER_DEGREE)
}

fn scaled_pair(xfrm: &ParsedNode, tag: &str, a: &str, b: &str, scale: f64) -> Option<(f64, f64)> {
    let node = xfrm.node_at(&[tag])?;
    let first = parse_emu(node.attr(a)?)?;
    let second = parse_emu(node.attr(b)?)?;
    Some((first as f64 * scale, second as f64 * scale))
}

fn parse_emu(value: &str) -> Option<i64> {
    value.trim().parse().ok()
}

fn flag(node: &ParsedNode, name: &str) -> bool {
    matches!(node.attr(name), Some("1") | Some("true"))
}
