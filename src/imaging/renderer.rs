//! Text rendering trait.
//!
//! The [`TextRenderer`] trait defines the two operations the batch processor
//! needs from a font: measure a string at a pixel size, and draw it onto an
//! RGBA canvas. The production implementation is
//! [`GlyphRenderer`](super::glyph_renderer::GlyphRenderer).

use crate::placement::{Extent, Origin};
use crate::types::Rgb;
use image::RgbaImage;

/// Trait for text rendering backends.
///
/// Implementations must be `Sync`: the batch processor shares one renderer
/// across rayon workers.
pub trait TextRenderer: Sync {
    /// Ink bounding box of `text` rendered at `font_size`: the union of the
    /// outlines of this exact string, so ascenders and descenders count.
    fn measure(&self, text: &str, font_size: u32) -> Extent;

    /// Draw `text` so the top-left corner of the box [`measure`](Self::measure)
    /// returns lands on `origin`. No ink goes above or left of `origin`.
    ///
    /// The canvas is a transparent overlay the size of the image: coverage
    /// is blended in, so a pixel's alpha is how much text covers it.
    /// Pixels that fall outside the canvas are clipped.
    fn draw(&self, canvas: &mut RgbaImage, text: &str, font_size: u32, origin: Origin, color: Rgb);
}
