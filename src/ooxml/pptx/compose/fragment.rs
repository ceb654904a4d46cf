//! Render fragments and the container emitter.
//!
//! A [`RenderFragment`] is composed markup for one subtree plus the stacking
//! index it was painted with. Fragments are concatenated in traversal order;
//! [`emit_container`] wraps such a concatenation in a positioned `<div>` and
//! always closes what it opens.

use crate::ooxml::pptx::transform::BoxBounds;
use std::fmt::Write as _;

/// Composed markup for one subtree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderFragment {
    z_index: Option<i64>,
    markup: String,
}

impl RenderFragment {
    /// A fragment contributing nothing.
    #[inline]
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(z_index: Option<i64>, markup: impl Into<String>) -> Self {
        Self {
            z_index,
            markup: markup.into(),
        }
    }

    /// The stacking index (the node's document `order`).
    #[inline]
    pub fn z_index(&self) -> Option<i64> {
        self.z_index
    }

    #[inline]
    pub fn markup(&self) -> &str {
        &self.markup
    }

    #[inline]
    pub fn into_markup(self) -> String {
        self.markup
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.markup.is_empty()
    }

    /// Concatenate fragments in the given order. The result carries no
    /// stacking index of its own.
    pub fn concat<I>(fragments: I) -> Self
    where
        I: IntoIterator<Item = RenderFragment>,
    {
        let mut markup = String::new();
        for fragment in fragments {
            markup.push_str(&fragment.markup);
        }
        Self {
            z_index: None,
            markup,
        }
    }
}

/// The wrapper placed around a group's children.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Container<'a> {
    /// Class names after the shared `block` class
    pub class: &'a str,
    pub z_index: Option<i64>,
    /// `None` leaves the container unpositioned
    pub bounds: Option<BoxBounds>,
    pub rotation_degrees: f64,
}

/// Wrap `children` (in the given order) in a positioned container.
pub fn emit_container<I>(container: &Container<'_>, children: I) -> RenderFragment
where
    I: IntoIterator<Item = RenderFragment>,
{
    let mut style = StyleBuilder::new();
    if let Some(z) = container.z_index {
        style.z_index(z);
    }
    style.transform(container.rotation_degrees, false, false);
    if let Some(bounds) = container.bounds {
        style.bounds(&bounds);
    }

    let mut markup = String::with_capacity(128);
    open_div(&mut markup, container.class, &style.finish(), &[]);
    for child in children {
        markup.push_str(child.markup());
    }
    markup.push_str("</div>");

    RenderFragment::new(container.z_index, markup)
}

/// Write `<div class='block {class}' style='..' name='value'..>`.
pub fn open_div(out: &mut String, class: &str, style: &str, data: &[(&str, &str)]) {
    out.push_str("<div class='block ");
    escape_html(class, out);
    out.push('\'');
    if !style.is_empty() {
        out.push_str(" style='");
        out.push_str(style);
        out.push('\'');
    }
    for (name, value) in data {
        out.push(' ');
        out.push_str(name);
        out.push_str("='");
        escape_html(value, out);
        out.push('\'');
    }
    out.push('>');
}

/// Accumulates inline CSS declarations.
#[derive(Debug, Default)]
pub struct StyleBuilder {
    css: String,
}

impl StyleBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn z_index(&mut self, z: i64) -> &mut Self {
        let mut buf = itoa::Buffer::new();
        self.declare("z-index", buf.format(z));
        self
    }

    /// Rotation about the box center plus optional mirroring. Emits nothing
    /// for an unrotated, unmirrored box.
    pub fn transform(&mut self, rotation_degrees: f64, flip_h: bool, flip_v: bool) -> &mut Self {
        if rotation_degrees == 0.0 && !flip_h && !flip_v {
            return self;
        }
        let mut value = String::new();
        if rotation_degrees != 0.0 {
            value.push_str("rotate(");
            push_number(&mut value, rotation_degrees);
            value.push_str("deg)");
        }
        for (flipped, function) in [(flip_h, "scaleX(-1)"), (flip_v, "scaleY(-1)")] {
            if flipped {
                if !value.is_empty() {
                    value.push(' ');
                }
                value.push_str(function);
            }
        }
        self.declare("transform", &value);
        self
    }

    pub fn bounds(&mut self, bounds: &BoxBounds) -> &mut Self {
        self.px("top", bounds.top)
            .px("left", bounds.left)
            .px("width", bounds.width)
            .px("height", bounds.height)
    }

    pub fn px(&mut self, property: &str, value: f64) -> &mut Self {
        let mut number = String::new();
        push_number(&mut number, value);
        number.push_str("px");
        self.declare(property, &number)
    }

    pub fn declare(&mut self, property: &str, value: &str) -> &mut Self {
        if !self.css.is_empty() {
            self.css.push(' ');
        }
        // Writing to a String cannot fail
        let _ = write!(self.css, "{}: {};", property, value);
        self
    }

    pub fn finish(self) -> String {
        self.css
    }
}

/// Format a CSS number rounded to thousandths: integers without a fraction,
/// others shortest-roundtrip.
pub fn push_number(out: &mut String, value: f64) {
    let value = (value * 1000.0).round() / 1000.0;
    if !value.is_finite() {
        out.push('0');
    } else if value.fract() == 0.0 && value.abs() < 1e15 {
        let mut buf = itoa::Buffer::new();
        out.push_str(buf.format(value as i64));
    } else {
        let mut buf = ryu::Buffer::new();
        out.push_str(buf.format_finite(value));
    }
}

/// Escape text for HTML element content and single- or double-quoted attributes.
pub fn escape_html(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
}
