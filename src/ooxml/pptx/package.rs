/// Package implementation for PowerPoint presentations.
use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::opc::constants::PRESENTATION_MAIN_TYPES;
use crate::ooxml::opc::{OpcPackage, PackURI};
use crate::ooxml::pptx::presentation::Presentation;
use std::io::{Read, Seek};
use std::path::Path;

/// A PowerPoint (.pptx) package.
///
/// This is the main entry point for rendering presentations. It wraps an OPC
/// package whose main part has been checked to be a presentation.
///
/// # Examples
///
/// ```rust,no_run
/// use pomelo::ooxml::pptx::{Package, RenderOptions};
///
/// let pkg = Package::open("presentation.pptx")?;
/// let pres = pkg.presentation()?;
/// let html = pres.to_html(&RenderOptions::default())?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct Package {
    /// The underlying OPC package
    opc: OpcPackage,
    /// Partname of `presentation.xml` (or its equivalent)
    main: PackURI,
}

impl Package {
    /// Open a .pptx package from a file path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_opc(OpcPackage::open(path)?)
    }

    /// Create a .pptx package from a reader.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use pomelo::ooxml::pptx::Package;
    /// use std::io::Cursor;
    ///
    /// let data = std::fs::read("presentation.pptx")?;
    /// let pkg = Package::from_reader(Cursor::new(data))?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        Self::from_opc(OpcPackage::from_reader(reader)?)
    }

    /// Create a .pptx package from owned bytes.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        Self::from_opc(OpcPackage::from_bytes(data)?)
    }

    fn from_opc(opc: OpcPackage) -> Result<Self> {
        let main = opc
            .main_document_uri()
            .map_err(|e| OoxmlError::PartNotFound(format!("main presentation part: {}", e)))?;

        // Plain, macro-enabled, slideshow and template decks share one schema
        let content_type = opc.content_type(&main)?;
        if !PRESENTATION_MAIN_TYPES.contains(&content_type) {
            return Err(OoxmlError::InvalidContentType {
                expected: PRESENTATION_MAIN_TYPES.join(" or "),
                got: content_type.to_string(),
            });
        }

        Ok(Self { opc, main })
    }

    /// Get the main presentation.
    pub fn presentation(&self) -> Result<Presentation<'_>> {
        Presentation::load(&self.opc, self.main.clone())
    }

    /// Get the underlying OPC package.
    #[inline]
    pub fn opc_package(&self) -> &OpcPackage {
        &self.opc
    }
}
