//! Shared test utilities for the folder-watermark test suite.
//!
//! Provides fixture writers that build small input trees on disk, readers for
//! inspecting stamped output, and lookups over a [`RunResult`].
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = TempDir::new().unwrap();
//! write_png(&tmp.path().join("in/trip/b.png"), 1000, 2000);
//! write_corrupt(&tmp.path().join("in/broken.jpg"));
//!
//! let result = process_with_renderer(&MockRenderer::new(), ...).unwrap();
//! let stamp = find_stamp(&result, "trip/b.png");
//! assert_eq!(stamp.font_size, 67);
//! ```

use image::{ImageFormat, ImageReader, Rgb, RgbImage, RgbaImage};
use std::path::Path;

use crate::process::{RunResult, StampRecord};

/// Fill color of every fixture image, as RGBA.
pub const FILL_RGBA: [u8; 4] = [40, 80, 120, 255];

// =========================================================================
// Fixture writers (parent directories are created as needed)
// =========================================================================

fn solid(width: u32, height: u32) -> RgbImage {
    RgbImage::from_pixel(width, height, Rgb([FILL_RGBA[0], FILL_RGBA[1], FILL_RGBA[2]]))
}

fn write_as(path: &Path, width: u32, height: u32, format: ImageFormat) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    solid(width, height)
        .save_with_format(path, format)
        .unwrap_or_else(|e| panic!("writing fixture {}: {e}", path.display()));
}

pub fn write_png(path: &Path, width: u32, height: u32) {
    write_as(path, width, height, ImageFormat::Png);
}

pub fn write_jpeg(path: &Path, width: u32, height: u32) {
    write_as(path, width, height, ImageFormat::Jpeg);
}

pub fn write_webp(path: &Path, width: u32, height: u32) {
    write_as(path, width, height, ImageFormat::WebP);
}

pub fn write_tiff(path: &Path, width: u32, height: u32) {
    write_as(path, width, height, ImageFormat::Tiff);
}

/// A file with an image extension whose bytes do not decode.
pub fn write_corrupt(path: &Path) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, b"\x89PNG\r\n\x1a\n this stopped being a png").unwrap();
}

// =========================================================================
// Output inspection
// =========================================================================

/// Decode a stamped file to RGBA. Panics if it does not decode.
pub fn open_rgba(path: &Path) -> RgbaImage {
    image::open(path)
        .unwrap_or_else(|e| panic!("decoding {}: {e}", path.display()))
        .to_rgba8()
}

/// Format detected from the file's bytes, not its name.
pub fn format_of(path: &Path) -> ImageFormat {
    ImageReader::open(path)
        .unwrap()
        .with_guessed_format()
        .unwrap()
        .format()
        .unwrap_or_else(|| panic!("unrecognized format: {}", path.display()))
}

// =========================================================================
// RunResult lookups (panic with a clear message on miss)
// =========================================================================

/// Find the stamp record for a relative path. Panics if not found.
pub fn find_stamp<'a>(result: &'a RunResult, relative_path: &str) -> &'a StampRecord {
    result
        .stamped
        .iter()
        .find(|s| s.relative_path == relative_path)
        .unwrap_or_else(|| {
            let paths: Vec<&str> = result.stamped.iter().map(|s| s.relative_path.as_str()).collect();
            panic!("stamp '{relative_path}' not found. Available: {paths:?}")
        })
}
