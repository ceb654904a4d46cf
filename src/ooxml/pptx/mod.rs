//! PowerPoint (.pptx) slide composition.
//!
//! Slides are parsed into [`ParsedNode`](crate::ooxml::xml::ParsedNode)
//! trees and walked by the [`SlideComposer`], which turns the shape tree into
//! nested, absolutely positioned HTML blocks:
//!
//! - `placeholder`: id / idx / type lookup tables for slide, layout and master
//! - `transform`: group and leaf `a:xfrm` resolution in pixels
//! - `compose`: the recursive dispatcher and the leaf composer seam
//! - `package`, `presentation`, `slide`: archive loading and deck rendering
//!
//! # Example
//!
//! ```rust,no_run
//! use pomelo::ooxml::pptx::{Package, RenderOptions};
//!
//! let pkg = Package::open("presentation.pptx")?;
//! let pres = pkg.presentation()?;
//! let first = pres.render_slide(0, &RenderOptions::new().with_dpi(72.0))?;
//! println!("{}", first.html);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod compose;
pub mod options;
pub mod package;
pub mod placeholder;
pub mod presentation;
pub mod slide;
pub mod transform;

pub use compose::{ComposeContext, HtmlLeafComposer, LeafComposer, SlideComposer};
pub use compose::fragment::RenderFragment;
pub use options::RenderOptions;
pub use package::Package;
pub use placeholder::{PlaceholderIndex, PlaceholderKey, PlaceholderTables, build_index};
pub use presentation::{PARALLEL_THRESHOLD, Presentation};
pub use slide::{RenderedSlide, Slide};
pub use transform::{ContainerKind, GroupTransform, resolve_group_transform};
