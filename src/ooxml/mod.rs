//! Office Open XML (OOXML) presentation support.
//!
//! The module is organized into layers:
//!
//! 1. **OPC Layer** (`opc`): package handling (ZIP, content types, relationships)
//! 2. **XML Layer** (`xml`): parts as ordered [`ParsedNode`](xml::ParsedNode) trees
//! 3. **PresentationML** (`pptx`): shape-tree composition and slide rendering
//!
//! # Example
//!
//! ```rust,no_run
//! use pomelo::ooxml::pptx::{Package, RenderOptions};
//!
//! let pkg = Package::open("presentation.pptx")?;
//! let html = pkg.presentation()?.to_html(&RenderOptions::default())?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
pub mod error;
pub mod opc;
pub mod pptx;
pub mod xml;

// Re-export commonly used types from OPC layer
pub use opc::{OpcPackage, PackURI};

pub use error::{OoxmlError, Result};
