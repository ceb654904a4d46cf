//! Pomelo - composes PowerPoint slides into positioned HTML render trees
//!
//! A slide's shape tree is walked in document order. Shapes, connectors,
//! pictures and graphic frames become absolutely positioned blocks whose
//! `z-index` is their position among their siblings; groups become nested
//! containers carrying the group's transform. Placeholders without their own
//! geometry inherit it from the slide layout and master.
//!
//! # Example - Rendering a PPTX file
//!
//! ```no_run
//! use pomelo::ooxml::pptx::{Package, RenderOptions};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let pkg = Package::open("presentation.pptx")?;
//! let pres = pkg.presentation()?;
//!
//! for slide in pres.render(&RenderOptions::default())? {
//!     println!("<!-- slide {} -->\n{}", slide.number, slide.html);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Example - Composing a parsed shape tree
//!
//! ```
//! use pomelo::ooxml::pptx::{ComposeContext, HtmlLeafComposer, PlaceholderTables, SlideComposer, build_index};
//! use pomelo::ooxml::xml::parse_xml;
//!
//! let root = parse_xml(br#"<p:spTree><p:sp><p:spPr/></p:sp></p:spTree>"#).unwrap();
//! let tree = root.node_at(&["p:spTree"]).unwrap();
//! let tables = PlaceholderTables { slide: build_index(tree), ..Default::default() };
//! let ctx = ComposeContext::for_slide(&tables, 1.0);
//!
//! let leaf = HtmlLeafComposer::new();
//! let html = SlideComposer::new(&leaf).compose_children(tree, &ctx);
//! assert_eq!(html.markup(), "<div class='block shape' style='z-index: 1;'></div>");
//! ```

pub mod ooxml;

pub use ooxml::pptx::{Package, Presentation, RenderOptions, RenderedSlide};
pub use ooxml::{OoxmlError, Result};
