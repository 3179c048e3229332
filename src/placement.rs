//! Watermark placement: font size, anchor position, and color resolution.
//!
//! All functions here are pure apart from the caller-supplied random source,
//! so they are testable without any I/O or images.
//!
//! ## Randomization policy
//!
//! | Setting | Drawn |
//! |---|---|
//! | Random position | independently for every image, never cached |
//! | Random color, same-folder on | once per folder (see [`crate::folder_colors`]) |
//! | Random color, same-folder off | independently for every image |

use crate::config::PlacementConfig;
use crate::types::{ColorMode, PaletteColor, Position, PositionMode, Rgb};
use rand::Rng;

/// Width and height of something placed on the image, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Extent {
    pub width: u32,
    pub height: u32,
}

impl Extent {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Top-left corner of the text box. Negative when the text is larger than
/// the image; the renderer clips whatever falls off the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Origin {
    pub x: i32,
    pub y: i32,
}

impl Origin {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Font size in pixels for an image, scaled to its diagonal.
///
/// `round(diagonal × font_scale)` clamped to `[min_font_size, max_font_size]`,
/// so portrait and landscape shots of the same resolution get the same size.
///
/// ```
/// # use folder_watermark::config::PlacementConfig;
/// # use folder_watermark::placement::compute_font_size;
/// let cfg = PlacementConfig::default();
/// assert_eq!(compute_font_size(3000, 4000, &cfg), 150);
/// assert_eq!(compute_font_size(100, 100, &cfg), 40);
/// ```
pub fn compute_font_size(width: u32, height: u32, config: &PlacementConfig) -> u32 {
    let w = width as f64;
    let h = height as f64;
    let diagonal = (w * w + h * h).sqrt();
    let size = (diagonal * config.font_scale).round();
    // Float-to-int casts saturate, so huge images still land on max_font_size.
    (size as u32).clamp(config.min_font_size, config.max_font_size)
}

/// Top-left corner for text of size `text` anchored at `position`.
///
/// Edge anchors keep the text `padding` pixels from the edge(s). Center uses
/// floor division. Results are not clamped to the canvas.
pub fn compute_position(position: Position, image: Extent, text: Extent, padding: u32) -> Origin {
    let img_w = image.width as i64;
    let img_h = image.height as i64;
    let txt_w = text.width as i64;
    let txt_h = text.height as i64;
    let pad = padding as i64;

    let (x, y) = match position {
        Position::TopLeft => (pad, pad),
        Position::TopRight => (img_w - txt_w - pad, pad),
        Position::BottomLeft => (pad, img_h - txt_h - pad),
        Position::BottomRight => (img_w - txt_w - pad, img_h - txt_h - pad),
        Position::Center => ((img_w - txt_w).div_euclid(2), (img_h - txt_h).div_euclid(2)),
    };
    Origin::new(saturate(x), saturate(y))
}

fn saturate(v: i64) -> i32 {
    v.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

/// Uniform draw from the fixed palette.
pub fn random_palette_color<R: Rng + ?Sized>(rng: &mut R) -> PaletteColor {
    PaletteColor::ALL[rng.random_range(0..PaletteColor::ALL.len())]
}

/// Uniform draw from the five anchor positions.
pub fn random_position<R: Rng + ?Sized>(rng: &mut R) -> Position {
    Position::ALL[rng.random_range(0..Position::ALL.len())]
}

/// Pick the anchor for one image. Random mode draws anew every call.
pub fn resolve_position<R: Rng + ?Sized>(mode: PositionMode, rng: &mut R) -> Position {
    match mode {
        PositionMode::Fixed(p) => p,
        PositionMode::Random => random_position(rng),
    }
}

/// Pick the text color for one image.
///
/// A folder color only applies in random mode with same-folder consistency
/// on; otherwise random mode draws per image and fixed mode returns the
/// requested color.
pub fn resolve_color<R: Rng + ?Sized>(
    mode: ColorMode,
    folder_color: Option<Rgb>,
    same_folder_same_color: bool,
    rng: &mut R,
) -> Rgb {
    match (mode, folder_color) {
        (ColorMode::Random, Some(color)) if same_folder_same_color => color,
        (ColorMode::Random, _) => random_palette_color(rng).rgb(),
        (ColorMode::Fixed(color), _) => color,
    }
}
