//! Real font rendering. Uses a system TrueType font when one is installed
//! and skips otherwise.

use folder_watermark::config::WatermarkConfig;
use folder_watermark::imaging::{GlyphRenderer, TextRenderer};
use folder_watermark::placement::{Extent, Origin};
use folder_watermark::process::process;
use folder_watermark::types::{ColorMode, PaletteColor, Position, PositionMode, WatermarkRequest};
use image::{Rgba, RgbaImage};
use std::path::PathBuf;
use tempfile::TempDir;

const CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

fn system_font() -> Option<PathBuf> {
    let found = CANDIDATES.iter().map(PathBuf::from).find(|p| p.is_file());
    if found.is_none() {
        eprintln!("no system font found, skipping");
    }
    found
}

#[test]
fn measured_extent_grows_with_text_and_size() {
    let Some(font) = system_font() else { return };
    let renderer = GlyphRenderer::load(&font).unwrap();

    let short = renderer.measure("DRAFT", 40);
    let long = renderer.measure("DRAFT COPY", 40);
    let big = renderer.measure("DRAFT", 80);

    assert!(short.width > 0 && short.height > 0);
    assert!(long.width > short.width);
    assert!(big.width > short.width);
    assert!(big.height > short.height);
}

/// Bounding box of every pixel with any coverage: (min_x, min_y, width, height).
fn ink_box(canvas: &RgbaImage) -> Option<(u32, u32, u32, u32)> {
    let inked: Vec<(u32, u32)> = canvas
        .enumerate_pixels()
        .filter(|(_, _, p)| p.0[3] > 0)
        .map(|(x, y, _)| (x, y))
        .collect();
    let min_x = inked.iter().map(|p| p.0).min()?;
    let min_y = inked.iter().map(|p| p.1).min()?;
    let max_x = inked.iter().map(|p| p.0).max()?;
    let max_y = inked.iter().map(|p| p.1).max()?;
    Some((min_x, min_y, max_x - min_x + 1, max_y - min_y + 1))
}

#[test]
fn measured_box_matches_drawn_ink_for_mixed_heights() {
    let Some(font) = system_font() else { return };
    let renderer = GlyphRenderer::load(&font).unwrap();

    for text in ["Ag", "Typography", "jpg", "DRAFT", "(Qly)"] {
        let extent = renderer.measure(text, 100);
        let mut canvas = RgbaImage::new(1000, 300);
        renderer.draw(&mut canvas, text, 100, Origin::new(100, 100), PaletteColor::Red.rgb());

        let (x, y, w, h) = ink_box(&canvas).unwrap();
        // Edge pixels of the outline box may end up with zero coverage.
        assert!((100..=101).contains(&x), "{text}: ink starts at x={x}");
        assert!((100..=101).contains(&y), "{text}: ink starts at y={y}");
        assert!(w <= extent.width && w + 2 >= extent.width, "{text}: ink {w} vs measured {}", extent.width);
        assert!(h <= extent.height && h + 2 >= extent.height, "{text}: ink {h} vs measured {}", extent.height);
    }
}

#[test]
fn descenders_make_the_box_taller() {
    let Some(font) = system_font() else { return };
    let renderer = GlyphRenderer::load(&font).unwrap();

    let caps = renderer.measure("A", 100);
    let mixed = renderer.measure("Ag", 100);
    assert!(mixed.height > caps.height, "Ag {mixed:?} vs A {caps:?}");
}

#[test]
fn whitespace_only_text_has_no_extent() {
    let Some(font) = system_font() else { return };
    let renderer = GlyphRenderer::load(&font).unwrap();
    assert_eq!(renderer.measure("   ", 50), Extent::new(0, 0));
}

#[test]
fn negative_origin_clips_but_still_inks_the_visible_part() {
    let Some(font) = system_font() else { return };
    let renderer = GlyphRenderer::load(&font).unwrap();
    let text = "OVERSIZED";
    let extent = renderer.measure(text, 40);
    assert!(extent.width > 30 && extent.height > 20);

    // Bottom-right anchoring on a 30x20 image: the box hangs off the top-left.
    let origin = Origin::new(30 - extent.width as i32 - 10, 20 - extent.height as i32 - 10);
    let mut canvas = RgbaImage::new(30, 20);
    renderer.draw(&mut canvas, text, 40, origin, PaletteColor::Red.rgb());

    let inked = canvas.pixels().filter(|p| p.0[3] > 0).count();
    assert!(inked > 0, "no visible ink at origin {origin:?}");
    assert_eq!((canvas.width(), canvas.height()), (30, 20));
}

#[test]
fn full_run_with_real_font() {
    let Some(font) = system_font() else { return };
    let tmp = TempDir::new().unwrap();
    let input = tmp.path().join("photos");
    std::fs::create_dir_all(&input).unwrap();
    RgbaImage::from_pixel(800, 600, Rgba([0, 0, 0, 255]))
        .save(input.join("dark.png"))
        .unwrap();

    let mut config = WatermarkConfig::default();
    config.font.path = font;
    let request = WatermarkRequest {
        text: "SAMPLE".into(),
        position: PositionMode::Fixed(Position::Center),
        color: ColorMode::Fixed(PaletteColor::Yellow.rgb()),
        same_folder_same_color: false,
    };
    let output = tmp.path().join("photos_SAMPLE");

    let result = process(&request, &input, &output, &config, None).unwrap();

    assert_eq!(result.processed, 1);
    let stamped = image::open(output.join("dark.png")).unwrap().to_rgba8();
    let yellowish = stamped
        .pixels()
        .filter(|p| p.0[0] > 128 && p.0[1] > 128 && p.0[2] < 64)
        .count();
    assert!(yellowish > 0, "no yellow text pixels found");
}
