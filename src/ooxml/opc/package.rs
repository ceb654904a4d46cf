//! In-memory OPC package backed by a ZIP archive.
//!
//! Every member is decompressed once when the package is opened. Slides are
//! small and are revisited many times (layouts and masters are shared), so
//! holding the blobs avoids re-inflating the same parts for each slide.

use crate::ooxml::opc::constants::relationship_type as rt;
use crate::ooxml::opc::error::{OpcError, Result};
use crate::ooxml::opc::packuri::{CONTENT_TYPES_URI, PACKAGE_URI, PackURI};
use crate::ooxml::opc::rel::Relationships;
use quick_xml::Reader;
use quick_xml::events::Event;
use std::collections::HashMap;
use std::io::{Cursor, Read, Seek};
use std::path::Path;
use tracing::trace;

/// An opened OPC package.
#[derive(Debug)]
pub struct OpcPackage {
    /// Member name (no leading slash) to decompressed bytes
    members: HashMap<String, Vec<u8>>,
    content_types: ContentTypeMap,
}

impl OpcPackage {
    /// Open an OPC package from a file path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(OpcError::PackageNotFound(path.display().to_string()));
        }
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    /// Open an OPC package from owned bytes.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        Self::from_reader(Cursor::new(data))
    }

    /// Open an OPC package from any seekable reader.
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        let mut archive = zip::ZipArchive::new(reader)?;
        let mut members = HashMap::with_capacity(archive.len());

        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            if file.is_dir() {
                continue;
            }
            let mut data = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut data)?;
            members.insert(file.name().to_string(), data);
        }
        trace!(members = members.len(), "loaded package members");

        let content_types = match members.get(&CONTENT_TYPES_URI[1..]) {
            Some(xml) => ContentTypeMap::from_xml(xml)?,
            None => return Err(OpcError::PartNotFound(CONTENT_TYPES_URI.to_string())),
        };

        Ok(Self {
            members,
            content_types,
        })
    }

    /// Raw bytes of a part.
    pub fn blob(&self, uri: &PackURI) -> Result<&[u8]> {
        self.members
            .get(uri.membername())
            .map(Vec::as_slice)
            .ok_or_else(|| OpcError::PartNotFound(uri.to_string()))
    }

    /// Check if a part exists.
    #[inline]
    pub fn contains(&self, uri: &PackURI) -> bool {
        self.members.contains_key(uri.membername())
    }

    /// Content type of a part, from an override or the extension default.
    pub fn content_type(&self, uri: &PackURI) -> Result<&str> {
        self.content_types
            .get(uri)
            .ok_or_else(|| OpcError::ContentTypeNotFound(uri.to_string()))
    }

    /// Relationships whose source is `uri`. A part without a `.rels` part
    /// simply has no relationships.
    pub fn rels_for(&self, uri: &PackURI) -> Result<Relationships> {
        match self.members.get(uri.rels_uri().membername()) {
            Some(xml) => Relationships::from_xml(xml, uri.base_uri()),
            None => Ok(Relationships::default()),
        }
    }

    /// Partname of the main document part (the officeDocument target).
    pub fn main_document_uri(&self) -> Result<PackURI> {
        let root = PackURI::new(PACKAGE_URI).map_err(OpcError::InvalidPackUri)?;
        let rels = self.rels_for(&root)?;
        rels.first_of_type(rt::OFFICE_DOCUMENT)
            .ok_or_else(|| OpcError::PartNotFound("officeDocument relationship".to_string()))?
            .target_partname()
    }

    /// Get the number of members in the package.
    #[inline]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Content types declared in `[Content_Types].xml`.
#[derive(Debug, Default)]
struct ContentTypeMap {
    /// Lowercased extension to content type
    defaults: HashMap<String, String>,
    /// Partname to content type
    overrides: HashMap<String, String>,
}

impl ContentTypeMap {
    fn from_xml(xml: &[u8]) -> Result<Self> {
        let mut map = Self::default();
        let mut reader = Reader::from_reader(xml);
        reader.config_mut().trim_text(true);

        loop {
            match reader.read_event() {
                Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) => {
                    let (key_attr, is_default) = match e.local_name().as_ref() {
                        b"Default" => (&b"Extension"[..], true),
                        b"Override" => (&b"PartName"[..], false),
                        _ => continue,
                    };

                    let mut key = None;
                    let mut content_type = None;
                    for attr in e.attributes() {
                        let attr = attr?;
                        if attr.key.as_ref() == key_attr {
                            key = Some(attr.unescape_value()?.to_string());
                        } else if attr.key.as_ref() == b"ContentType" {
                            content_type = Some(attr.unescape_value()?.to_string());
                        }
                    }

                    if let (Some(key), Some(ct)) = (key, content_type) {
                        if is_default {
                            map.defaults.insert(key.to_ascii_lowercase(), ct);
                        } else {
                            map.overrides.insert(key, ct);
                        }
                    }
                },
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(OpcError::XmlError(format!("Content types parse error: {}", e)));
                },
                _ => {},
            }
        }

        Ok(map)
    }

    fn get(&self, uri: &PackURI) -> Option<&str> {
        self.overrides
            .get(uri.as_str())
            .or_else(|| self.defaults.get(&uri.ext().to_ascii_lowercase()))
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn build_zip(entries: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        for (name, body) in entries {
            writer.start_file(*name, SimpleFileOptions::default()).unwrap();
            writer.write_all(body.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    const CONTENT_TYPES: &str = r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="PNG" ContentType="image/png"/>
  <Override PartName="/ppt/presentation.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml"/>
</Types>"#;

    const ROOT_RELS: &str = r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="ppt/presentation.xml"/>
</Relationships>"#;

    #[test]
    fn test_main_document_and_content_types() {
        let data = build_zip(&[
            ("[Content_Types].xml", CONTENT_TYPES),
            ("_rels/.rels", ROOT_RELS),
            ("ppt/presentation.xml", "<p:presentation/>"),
            ("ppt/media/image1.png", "png"),
        ]);
        let pkg = OpcPackage::from_bytes(data).unwrap();

        let main = pkg.main_document_uri().unwrap();
        assert_eq!(main.as_str(), "/ppt/presentation.xml");
        assert!(pkg.content_type(&main).unwrap().contains("presentation.main"));

        let image = PackURI::new("/ppt/media/image1.png").unwrap();
        assert_eq!(pkg.content_type(&image).unwrap(), "image/png");
        assert_eq!(pkg.blob(&image).unwrap(), b"png");
    }

    #[test]
    fn test_missing_content_types() {
        let data = build_zip(&[("_rels/.rels", ROOT_RELS)]);
        assert!(matches!(
            OpcPackage::from_bytes(data),
            Err(OpcError::PartNotFound(_))
        ));
    }

    #[test]
    fn test_part_without_rels() {
        let data = build_zip(&[("[Content_Types].xml", CONTENT_TYPES)]);
        let pkg = OpcPackage::from_bytes(data).unwrap();
        let uri = PackURI::new("/ppt/slides/slide1.xml").unwrap();
        assert!(pkg.rels_for(&uri).unwrap().is_empty());
        assert!(pkg.blob(&uri).is_err());
        assert!(pkg.main_document_uri().is_err());
    }
}
