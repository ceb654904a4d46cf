//! Simplified XML trees for PresentationML parts.
//!
//! Parts are parsed once into [`ParsedNode`] trees keyed by qualified tag
//! names. Everything downstream reads them through total path lookups that
//! report absence instead of failing.

pub mod node;
pub mod parse;

pub use node::{ATTRS, NodeValue, ParsedNode, Value, get_text_by_path_list};
pub use parse::{ORDER_ATTR, parse_xml};
