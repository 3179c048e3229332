//! Font-backed text renderer.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Parse TTF/OTF | `ab_glyph::FontVec::try_from_vec` |
//! | Layout | `ab_glyph::ScaleFont` advances plus kerning on one baseline |
//! | Measure | union of every outlined glyph's `px_bounds` (ink box) |
//! | Draw | `OutlinedGlyph::draw` coverage, blended with `imageproc::pixelops::weighted_sum` |
//!
//! Measuring and drawing share one layout, so the box returned by
//! [`TextRenderer::measure`] is exactly where [`TextRenderer::draw`] puts
//! ink: ascenders, descenders and all. The font is read once before a run
//! starts. A missing or unparseable font file is a [`FontError`], which the
//! batch processor treats as fatal.

use super::renderer::TextRenderer;
use crate::placement::{Extent, Origin};
use crate::types::Rgb;
use ab_glyph::{Font, FontVec, OutlinedGlyph, PxScale, Rect, ScaleFont, point};
use image::{Rgba, RgbaImage};
use imageproc::pixelops::weighted_sum;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FontError {
    #[error("font file not found: {0}")]
    Missing(PathBuf),
    #[error("cannot read font {path}: {source}")]
    Unreadable {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("not a usable TrueType/OpenType font: {0}")]
    Invalid(PathBuf),
}

/// [`TextRenderer`] backed by a single loaded typeface.
pub struct GlyphRenderer {
    font: FontVec,
    path: PathBuf,
}

/// Outlined glyphs of one string and the union of their pixel bounds.
struct Layout {
    glyphs: Vec<OutlinedGlyph>,
    ink: Option<Rect>,
}

impl GlyphRenderer {
    /// Read and parse a font file.
    pub fn load(path: &Path) -> Result<Self, FontError> {
        if !path.is_file() {
            return Err(FontError::Missing(path.to_path_buf()));
        }
        let data = std::fs::read(path).map_err(|source| FontError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;
        let font = FontVec::try_from_vec(data).map_err(|_| FontError::Invalid(path.to_path_buf()))?;
        Ok(Self {
            font,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Lay `text` out on a baseline at the ascent line, pen starting at x = 0.
    fn layout(&self, text: &str, font_size: u32) -> Layout {
        let scale = PxScale::from(font_size as f32);
        let scaled = self.font.as_scaled(scale);
        let baseline = scaled.ascent();

        let mut glyphs = Vec::new();
        let mut ink: Option<Rect> = None;
        let mut cursor_x = 0.0f32;
        let mut prev = None;

        for c in text.chars() {
            let id = scaled.glyph_id(c);
            if let Some(prev) = prev {
                cursor_x += scaled.kern(prev, id);
            }
            let glyph = id.with_scale_and_position(scale, point(cursor_x, baseline));
            if let Some(outlined) = self.font.outline_glyph(glyph) {
                let b = outlined.px_bounds();
                ink = Some(match ink {
                    Some(r) => Rect {
                        min: point(r.min.x.min(b.min.x), r.min.y.min(b.min.y)),
                        max: point(r.max.x.max(b.max.x), r.max.y.max(b.max.y)),
                    },
                    None => b,
                });
                glyphs.push(outlined);
            }
            cursor_x += scaled.h_advance(id);
            prev = Some(id);
        }

        Layout { glyphs, ink }
    }
}

impl TextRenderer for GlyphRenderer {
    fn measure(&self, text: &str, font_size: u32) -> Extent {
        match self.layout(text, font_size).ink {
            Some(ink) => Extent::new(ink.width().ceil() as u32, ink.height().ceil() as u32),
            None => Extent::new(0, 0),
        }
    }

    fn draw(&self, canvas: &mut RgbaImage, text: &str, font_size: u32, origin: Origin, color: Rgb) {
        let layout = self.layout(text, font_size);
        let Some(ink) = layout.ink else {
            return;
        };
        // Shift so the ink box's top-left lands on `origin`.
        let dx = origin.x - ink.min.x as i32;
        let dy = origin.y - ink.min.y as i32;
        let (width, height) = (canvas.width() as i32, canvas.height() as i32);
        let paint = Rgba([color.r, color.g, color.b, 255]);

        for glyph in &layout.glyphs {
            let bounds = glyph.px_bounds();
            glyph.draw(|gx, gy, coverage| {
                let x = bounds.min.x as i32 + gx as i32 + dx;
                let y = bounds.min.y as i32 + gy as i32 + dy;
                if x < 0 || y < 0 || x >= width || y >= height {
                    return;
                }
                let coverage = coverage.clamp(0.0, 1.0);
                let pixel = canvas.get_pixel_mut(x as u32, y as u32);
                *pixel = weighted_sum(*pixel, paint, 1.0 - coverage, coverage);
            });
        }
    }
}

/// Locate a configured font file.
///
/// Absolute paths are used as-is. Relative paths are tried against the
/// working directory, then next to the running executable. When neither
/// exists the configured path is returned unchanged so the load error names
/// what the user asked for.
pub fn resolve_font_path(configured: &Path) -> PathBuf {
    if configured.is_absolute() || configured.exists() {
        return configured.to_path_buf();
    }
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(configured)))
        .filter(|candidate| candidate.exists())
        .unwrap_or_else(|| configured.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_font_is_reported() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("absent.otf");
        assert!(matches!(GlyphRenderer::load(&path), Err(FontError::Missing(p)) if p == path));
    }

    #[test]
    fn garbage_font_is_invalid() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("broken.ttf");
        std::fs::write(&path, b"definitely not a font").unwrap();
        assert!(matches!(GlyphRenderer::load(&path), Err(FontError::Invalid(_))));
    }

    #[test]
    fn directory_is_not_a_font() {
        let tmp = TempDir::new().unwrap();
        assert!(matches!(
            GlyphRenderer::load(tmp.path()),
            Err(FontError::Missing(_))
        ));
    }

    #[test]
    fn resolve_keeps_absolute_paths() {
        let path = Path::new("/nowhere/font.ttf");
        assert_eq!(resolve_font_path(path), PathBuf::from("/nowhere/font.ttf"));
    }

    #[test]
    fn resolve_returns_configured_path_when_nothing_matches() {
        let path = Path::new("no-such-dir/no-such-font.otf");
        assert_eq!(resolve_font_path(path), path.to_path_buf());
    }
}
