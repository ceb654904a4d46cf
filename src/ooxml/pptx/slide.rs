//! A loaded slide together with its layout and master.

use crate::ooxml::error::Result;
use crate::ooxml::opc::constants::relationship_type as rt;
use crate::ooxml::opc::{OpcPackage, PackURI, Relationship, Relationships};
use crate::ooxml::pptx::compose::fragment::StyleBuilder;
use crate::ooxml::pptx::compose::{ComposeContext, HtmlLeafComposer, SlideComposer};
use crate::ooxml::pptx::options::RenderOptions;
use crate::ooxml::pptx::placeholder::{PlaceholderTables, build_index};
use crate::ooxml::xml::{ParsedNode, parse_xml};
use tracing::{debug, trace, warn};

/// The HTML of one rendered slide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedSlide {
    /// 1-based slide number
    pub number: usize,
    pub html: String,
}

/// A slide part with the layout and master it inherits placeholders from.
#[derive(Debug)]
pub struct Slide {
    number: usize,
    uri: PackURI,
    part: ParsedNode,
    rels: Relationships,
    layout: Option<ParsedNode>,
    master: Option<ParsedNode>,
}

impl Slide {
    /// Parse the slide at `uri`, then its layout and that layout's master.
    ///
    /// A missing or unreadable layout or master is logged and treated as
    /// empty; only the slide part itself must load.
    pub fn load(package: &OpcPackage, uri: PackURI, number: usize) -> Result<Self> {
        let part = parse_xml(package.blob(&uri)?)?;
        let rels = package.rels_for(&uri)?;

        let layout = load_related(package, &uri, &rels, rt::SLIDE_LAYOUT);
        let master = match &layout {
            Some((layout_uri, _)) => match package.rels_for(layout_uri) {
                Ok(layout_rels) => load_related(package, layout_uri, &layout_rels, rt::SLIDE_MASTER),
                Err(e) => {
                    warn!(source = %layout_uri, error = %e, "unreadable layout relationships, no master");
                    None
                },
            },
            None => None,
        };

        Ok(Self {
            number,
            uri,
            part,
            rels,
            layout: layout.map(|(_, node)| node),
            master: master.map(|(_, node)| node),
        })
    }

    /// 1-based position in the presentation.
    #[inline]
    pub fn number(&self) -> usize {
        self.number
    }

    #[inline]
    pub fn uri(&self) -> &PackURI {
        &self.uri
    }

    /// The slide's `p:cSld/p:spTree`.
    pub fn shape_tree(&self) -> Option<&ParsedNode> {
        shape_tree(&self.part)
    }

    pub fn layout_shape_tree(&self) -> Option<&ParsedNode> {
        self.layout.as_ref().and_then(shape_tree)
    }

    pub fn master_shape_tree(&self) -> Option<&ParsedNode> {
        self.master.as_ref().and_then(shape_tree)
    }

    /// Placeholder indices of the slide, layout and master shape trees.
    pub fn placeholder_tables(&self) -> PlaceholderTables<'_> {
        PlaceholderTables {
            slide: self.shape_tree().map(build_index).unwrap_or_default(),
            layout: self.layout_shape_tree().map(build_index).unwrap_or_default(),
            master: self.master_shape_tree().map(build_index).unwrap_or_default(),
        }
    }

    /// Compose the slide into a `<section>` of the given pixel size.
    pub fn render(
        &self,
        package: &OpcPackage,
        size_px: (f64, f64),
        options: &RenderOptions,
    ) -> RenderedSlide {
        trace!(number = self.number, uri = %self.uri, "rendering slide");

        let tables = self.placeholder_tables();
        let leaf = self.leaf_composer(package, options);
        let ctx = ComposeContext::for_slide(&tables, options.slide_scale());
        let body = match self.shape_tree() {
            Some(tree) => SlideComposer::new(&leaf).compose_children(tree, &ctx),
            None => {
                debug!(number = self.number, "slide without a shape tree");
                Default::default()
            },
        };

        let mut style = StyleBuilder::new();
        style.px("width", size_px.0).px("height", size_px.1);
        let mut html = String::with_capacity(body.markup().len() + 64);
        html.push_str("<section class='slide' style='");
        html.push_str(&style.finish());
        html.push_str("'>");
        html.push_str(body.markup());
        html.push_str("</section>");

        RenderedSlide {
            number: self.number,
            html,
        }
    }

    fn leaf_composer(&self, package: &OpcPackage, options: &RenderOptions) -> HtmlLeafComposer {
        let mut leaf = HtmlLeafComposer::new();
        if !options.embed_images {
            return leaf;
        }
        for rel in self.rels.iter().filter(|rel| rel.reltype() == rt::IMAGE) {
            match image_data_uri(package, rel) {
                Some(src) => leaf.insert_image_source(rel.r_id(), src),
                None => debug!(r_id = rel.r_id(), "image relationship cannot be embedded"),
            }
        }
        leaf
    }
}

/// The document element's `p:cSld/p:spTree`.
fn shape_tree(part: &ParsedNode) -> Option<&ParsedNode> {
    part.children_in_document_order()
        .next()
        .and_then(|(_, root)| root.node_at(&["p:cSld", "p:spTree"]))
}

/// Load and parse the first relationship target of `reltype`.
fn load_related(
    package: &OpcPackage,
    source: &PackURI,
    rels: &Relationships,
    reltype: &str,
) -> Option<(PackURI, ParsedNode)> {
    let Some(rel) = rels.first_of_type(reltype) else {
        warn!(source = %source, reltype, "no related part, placeholders will not inherit from it");
        return None;
    };
    match load_part(package, rel) {
        Ok(loaded) => Some(loaded),
        Err(e) => {
            warn!(source = %source, target = rel.target_ref(), error = %e, "failed to load related part");
            None
        },
    }
}

fn load_part(package: &OpcPackage, rel: &Relationship) -> Result<(PackURI, ParsedNode)> {
    let uri = rel.target_partname()?;
    let node = parse_xml(package.blob(&uri)?)?;
    Ok((uri, node))
}

#[cfg(feature = "images")]
fn image_data_uri(package: &OpcPackage, rel: &Relationship) -> Option<String> {
    use base64::Engine;

    let uri = rel.target_partname().ok()?;
    let data = package.blob(&uri).ok()?;
    let content_type = package.content_type(&uri).ok()?;
    let encoded = base64::engine::general_purpose::STANDARD.encode(data);
    Some(format!("data:{};base64,{}", content_type, encoded))
}

#[cfg(not(feature = "images"))]
fn image_data_uri(_package: &OpcPackage, _rel: &Relationship) -> Option<String> {
    None
}
