//! Image I/O and text rendering.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode** | `image::ImageReader` with content sniffing |
//! | **Encode** | `DynamicImage::write_to` in the source format, temp file + rename |
//! | **Measure text** | union of `ab_glyph` outline bounds for the exact string |
//! | **Draw text** | `ab_glyph` outlines blended with `imageproc::pixelops::weighted_sum` |
//!
//! The module is split into:
//! - **Codec**: open, overlay compositing at source depth, atomic save
//! - **Renderer**: [`TextRenderer`] trait, the seam tests swap out
//! - **Glyph renderer**: [`GlyphRenderer`], the font-backed implementation

pub mod codec;
pub mod glyph_renderer;
pub mod renderer;

pub use codec::{ImageError, SourceImage, apply_overlay, open_image, restore_color_type, save_image};
pub use glyph_renderer::{FontError, GlyphRenderer, resolve_font_path};
pub use renderer::TextRenderer;
