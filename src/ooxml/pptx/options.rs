//! Configuration for rendering presentations to HTML.

use crate::ooxml::pptx::transform::slide_scale_for_dpi;

/// Options controlling how slides are rendered.
///
/// # Examples
///
/// ```rust
/// use pomelo::ooxml::pptx::RenderOptions;
///
/// let options = RenderOptions::new().with_dpi(144.0).with_images(false);
/// assert_eq!(options.dpi, 144.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderOptions {
    /// Target resolution; EMU coordinates are scaled by `dpi / 914400`
    pub dpi: f64,
    /// Whether pictures are inlined as `data:` URIs
    pub embed_images: bool,
    /// Whether large decks are rendered on the rayon thread pool
    pub use_parallel: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            dpi: 96.0,
            embed_images: true,
            use_parallel: true,
        }
    }
}

impl RenderOptions {
    /// Create a new `RenderOptions` with default values.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the target resolution in dots per inch.
    ///
    /// Non-positive or non-finite values are ignored.
    #[inline]
    pub fn with_dpi(mut self, dpi: f64) -> Self {
        if dpi.is_finite() && dpi > 0.0 {
            self.dpi = dpi;
        }
        self
    }

    /// Set whether picture blips are embedded as base64 `data:` URIs.
    ///
    /// Embedding needs the `images` feature; without it pictures are always
    /// emitted as empty boxes carrying their relationship id.
    #[inline]
    pub fn with_images(mut self, embed: bool) -> Self {
        self.embed_images = embed;
        self
    }

    /// Set whether slides may be rendered in parallel.
    #[inline]
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.use_parallel = parallel;
        self
    }

    /// Pixels per EMU.
    #[inline]
    pub fn slide_scale(&self) -> f64 {
        slide_scale_for_dpi(self.dpi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = RenderOptions::default();
        assert_eq!(options.dpi, 96.0);
        assert!(options.embed_images);
        assert!(options.use_parallel);
        assert!((options.slide_scale() * 914_400.0 - 96.0).abs() < 1e-9);
    }

    #[test]
    fn test_builder() {
        let options = RenderOptions::new()
            .with_dpi(72.0)
            .with_images(false)
            .with_parallel(false);
        assert_eq!(options.dpi, 72.0);
        assert!(!options.embed_images);
        assert!(!options.use_parallel);
    }

    #[test]
    fn test_invalid_dpi_is_ignored() {
        assert_eq!(RenderOptions::new().with_dpi(0.0).dpi, 96.0);
        assert_eq!(RenderOptions::new().with_dpi(f64::NAN).dpi, 96.0);
    }
}
