/// Open Packaging Conventions (OPC) implementation.
///
/// This module provides the subset of the Open Packaging Conventions the renderer
/// needs to reach slide parts inside a `.pptx` archive:
///
/// - ZIP-based physical packaging
/// - Content type management
/// - Relationship parsing and target resolution
pub mod constants;
pub mod error;
pub mod package;
pub mod packuri;
pub mod rel;

// Re-export commonly used types
pub use package::OpcPackage;
pub use packuri::PackURI;
pub use rel::{Relationship, Relationships};
