/// Main presentation object - the high-level rendering API.
use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::opc::constants::relationship_type as rt;
use crate::ooxml::opc::packuri::PackURI;
use crate::ooxml::opc::{OpcPackage, Relationships};
use crate::ooxml::pptx::options::RenderOptions;
use crate::ooxml::pptx::slide::{RenderedSlide, Slide};
use crate::ooxml::xml::{ParsedNode, parse_xml};
use rayon::prelude::*;
use tracing::warn;

/// Minimum number of slides to justify parallel processing overhead.
pub const PARALLEL_THRESHOLD: usize = 10;

/// Default slide width (10 inches) in EMU.
pub const DEFAULT_SLIDE_WIDTH: i64 = 9_144_000;

/// Default slide height (7.5 inches) in EMU.
pub const DEFAULT_SLIDE_HEIGHT: i64 = 6_858_000;

/// A PowerPoint presentation.
///
/// Not intended to be constructed directly. Use `Package::presentation()` to
/// access a presentation.
///
/// # Examples
///
/// ```rust,no_run
/// use pomelo::ooxml::pptx::{Package, RenderOptions};
///
/// let pkg = Package::open("presentation.pptx")?;
/// let pres = pkg.presentation()?;
///
/// let (cx, cy) = pres.slide_size();
/// println!("Slide size: {}x{} EMUs", cx, cy);
///
/// for slide in pres.render(&RenderOptions::default())? {
///     println!("slide {}: {} bytes", slide.number, slide.html.len());
/// }
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct Presentation<'a> {
    /// Reference to the OPC package for accessing related parts
    package: &'a OpcPackage,
    uri: PackURI,
    part: ParsedNode,
    /// Slide partnames in `p:sldIdLst` order
    slides: Vec<PackURI>,
}

impl<'a> Presentation<'a> {
    /// Parse the presentation part at `uri` and resolve its slide list.
    pub(crate) fn load(package: &'a OpcPackage, uri: PackURI) -> Result<Self> {
        let part = parse_xml(package.blob(&uri)?)?;
        let rels = package.rels_for(&uri)?;
        let slides = slide_list(&part, &rels);
        Ok(Self {
            package,
            uri,
            part,
            slides,
        })
    }

    #[inline]
    pub fn uri(&self) -> &PackURI {
        &self.uri
    }

    /// Slide size in EMU from `p:sldSz`, or the 4:3 default.
    pub fn slide_size(&self) -> (i64, i64) {
        let size = self.part.node_at(&["p:presentation", "p:sldSz"]);
        let read = |name: &str| {
            size.and_then(|s| s.attr(name))
                .and_then(|v| v.trim().parse::<i64>().ok())
        };
        (
            read("cx").unwrap_or(DEFAULT_SLIDE_WIDTH),
            read("cy").unwrap_or(DEFAULT_SLIDE_HEIGHT),
        )
    }

    #[inline]
    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    /// Slide partnames in presentation order.
    pub fn slide_uris(&self) -> &[PackURI] {
        &self.slides
    }

    /// Load the slide at 0-based `index`.
    pub fn slide(&self, index: usize) -> Result<Slide> {
        let uri = self.slides.get(index).ok_or(OoxmlError::SlideOutOfRange {
            index,
            count: self.slides.len(),
        })?;
        Slide::load(self.package, uri.clone(), index + 1)
    }

    /// Render the slide at 0-based `index`.
    pub fn render_slide(&self, index: usize, options: &RenderOptions) -> Result<RenderedSlide> {
        let slide = self.slide(index)?;
        let (cx, cy) = self.slide_size();
        let scale = options.slide_scale();
        Ok(slide.render(self.package, (cx as f64 * scale, cy as f64 * scale), options))
    }

    /// Render every slide, in slide order.
    ///
    /// Decks of at least [`PARALLEL_THRESHOLD`] slides are rendered on the
    /// rayon pool when `use_parallel` is set. Each slide owns its own
    /// placeholder tables, so slides share nothing while rendering.
    pub fn render(&self, options: &RenderOptions) -> Result<Vec<RenderedSlide>> {
        let count = self.slides.len();
        if options.use_parallel && count >= PARALLEL_THRESHOLD {
            (0..count)
                .into_par_iter()
                .map(|i| self.render_slide(i, options))
                .collect()
        } else {
            (0..count).map(|i| self.render_slide(i, options)).collect()
        }
    }

    /// Render every slide and concatenate the sections.
    pub fn to_html(&self, options: &RenderOptions) -> Result<String> {
        let slides = self.render(options)?;
        let total_size: usize = slides.iter().map(|s| s.html.len()).sum();
        let mut html = String::with_capacity(total_size);
        for slide in &slides {
            html.push_str(&slide.html);
        }
        Ok(html)
    }
}

/// Resolve `p:sldIdLst/p:sldId/@r:id` through the presentation relationships.
fn slide_list(part: &ParsedNode, rels: &Relationships) -> Vec<PackURI> {
    let Some(ids) = part
        .node_at(&["p:presentation", "p:sldIdLst"])
        .and_then(|list| list.child("p:sldId"))
    else {
        return Vec::new();
    };

    let mut slides = Vec::with_capacity(ids.nodes().len());
    for id in ids.nodes() {
        let Some(r_id) = id.attr("r:id") else {
            warn!(id = ?id.attr("id"), "slide id without a relationship id");
            continue;
        };
        let Some(rel) = rels.get(r_id) else {
            warn!(r_id, "slide relationship not found");
            continue;
        };
        if rel.reltype() != rt::SLIDE {
            warn!(r_id, reltype = rel.reltype(), "slide id points at a non-slide part");
            continue;
        }
        match rel.target_partname() {
            Ok(uri) => slides.push(uri),
            Err(e) => warn!(r_id, error = %e, "unresolvable slide relationship"),
        }
    }
    slides
}

#[cfg(test)]
mod tests {
    use super::*;

    const RELS: &str = r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide" Target="slides/slide1.xml"/>
  <Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster" Target="slideMasters/slideMaster1.xml"/>
  <Relationship Id="rId4" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide" Target="slides/slide2.xml"/>
</Relationships>"#;

    #[test]
    fn test_slide_list_keeps_only_slide_targets() {
        let part = parse_xml(
            br#"<p:presentation><p:sldIdLst>
              <p:sldId id="256" r:id="rId4"/>
              <p:sldId id="257" r:id="rId3"/>
              <p:sldId id="258" r:id="rId9"/>
              <p:sldId id="259"/>
              <p:sldId id="260" r:id="rId2"/>
            </p:sldIdLst></p:presentation>"#,
        )
        .unwrap();
        let rels = Relationships::from_xml(RELS.as_bytes(), "/ppt").unwrap();

        let slides = slide_list(&part, &rels);
        let uris: Vec<&str> = slides.iter().map(PackURI::as_str).collect();
        assert_eq!(uris, ["/ppt/slides/slide2.xml", "/ppt/slides/slide1.xml"]);
    }

    #[test]
    fn test_slide_list_without_ids() {
        let part = parse_xml(b"<p:presentation/>").unwrap();
        assert!(slide_list(&part, &Relationships::default()).is_empty());
    }
}
