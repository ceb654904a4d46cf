//! Placeholder lookup tables for one shape tree.
//!
//! A slide shape that is a placeholder (`<p:ph idx=".." type=".."/>`) may omit
//! its geometry and text defaults and inherit them from the matching shape of
//! its layout, and from there of its master. [`build_index`] indexes one
//! `p:spTree` so those matches are plain map lookups.

use crate::ooxml::xml::ParsedNode;
use std::collections::HashMap;

/// Shape-tree keys that hold the tree's own bookkeeping rather than shapes.
const NON_SHAPE_KEYS: [&str; 2] = ["p:nvGrpSpPr", "p:grpSpPr"];

/// Non-visual property containers, one per shape kind.
const NON_VISUAL_KEYS: [&str; 5] = [
    "p:nvSpPr",
    "p:nvPicPr",
    "p:nvCxnSpPr",
    "p:nvGraphicFramePr",
    "p:nvGrpSpPr",
];

/// Read-only lookup tables from shape keys to the shapes of one tree.
#[derive(Debug, Default, Clone)]
pub struct PlaceholderIndex<'a> {
    by_id: HashMap<&'a str, &'a ParsedNode>,
    by_idx: HashMap<&'a str, &'a ParsedNode>,
    by_type: HashMap<&'a str, &'a ParsedNode>,
}

impl<'a> PlaceholderIndex<'a> {
    /// Shape by its `p:cNvPr/@id`.
    #[inline]
    pub fn by_id(&self, id: &str) -> Option<&'a ParsedNode> {
        self.by_id.get(id).copied()
    }

    /// Placeholder shape by `p:ph/@idx`.
    #[inline]
    pub fn by_idx(&self, idx: &str) -> Option<&'a ParsedNode> {
        self.by_idx.get(idx).copied()
    }

    /// Placeholder shape by `p:ph/@type` (`title`, `body`, ...).
    #[inline]
    pub fn by_type(&self, ph_type: &str) -> Option<&'a ParsedNode> {
        self.by_type.get(ph_type).copied()
    }

    pub fn ids(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.by_id.keys().copied()
    }

    pub fn idxs(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.by_idx.keys().copied()
    }

    pub fn types(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.by_type.keys().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty() && self.by_idx.is_empty() && self.by_type.is_empty()
    }
}

/// The placeholder identity of a single shape.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PlaceholderKey<'a> {
    pub id: Option<&'a str>,
    pub idx: Option<&'a str>,
    pub ph_type: Option<&'a str>,
}

impl<'a> PlaceholderKey<'a> {
    /// Read the id, placeholder index and placeholder type of a shape.
    /// Absent attributes stay `None`.
    pub fn of(shape: &'a ParsedNode) -> Self {
        let Some(nv) = NON_VISUAL_KEYS.iter().find_map(|key| shape.node_at(&[*key])) else {
            return Self::default();
        };
        Self {
            id: nv.attr_at(&["p:cNvPr"], "id"),
            idx: nv.attr_at(&["p:nvPr", "p:ph"], "idx"),
            ph_type: nv.attr_at(&["p:nvPr", "p:ph"], "type"),
        }
    }

    #[inline]
    pub fn is_placeholder(&self) -> bool {
        self.idx.is_some() || self.ph_type.is_some()
    }
}

/// Index every shape directly under a shape-tree container.
///
/// When two shapes share a key the later one wins, visiting tags in
/// first-occurrence order and same-tagged siblings in document order.
pub fn build_index(sp_tree: &ParsedNode) -> PlaceholderIndex<'_> {
    let mut index = PlaceholderIndex::default();

    for (tag, value) in sp_tree.children() {
        if NON_SHAPE_KEYS.iter().any(|key| *key == tag) {
            continue;
        }
        for shape in value.nodes() {
            let key = PlaceholderKey::of(shape);
            if let Some(id) = key.id {
                index.by_id.insert(id, shape);
            }
            if let Some(idx) = key.idx {
                index.by_idx.insert(idx, shape);
            }
            if let Some(ph_type) = key.ph_type {
                index.by_type.insert(ph_type, shape);
            }
        }
    }

    index
}

/// The layout and master indices a slide's placeholders inherit from.
#[derive(Debug, Default, Clone)]
pub struct PlaceholderTables<'a> {
    pub slide: PlaceholderIndex<'a>,
    pub layout: PlaceholderIndex<'a>,
    pub master: PlaceholderIndex<'a>,
}

impl<'a> PlaceholderTables<'a> {
    /// Layout then master shapes a slide shape inherits from, nearest first.
    ///
    /// The layout is matched by `idx` before `type`, the master by `type`
    /// before `idx`. Non-placeholders inherit nothing.
    pub fn inherited(&self, shape: &ParsedNode) -> Vec<&'a ParsedNode> {
        let key = PlaceholderKey::of(shape);
        if !key.is_placeholder() {
            return Vec::new();
        }

        let layout = key
            .idx
            .and_then(|idx| self.layout.by_idx(idx))
            .or_else(|| key.ph_type.and_then(|t| self.layout.by_type(t)));
        let master = key
            .ph_type
            .and_then(|t| self.master.by_type(t))
            .or_else(|| key.idx.and_then(|idx| self.master.by_idx(idx)));

        layout.into_iter().chain(master).collect()
    }
}
