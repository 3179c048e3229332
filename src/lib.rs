//! # Folder Watermark
//!
//! Stamps a text watermark on every image in a directory tree and writes the
//! results to a sibling folder that mirrors the input layout. Sources are
//! never modified.
//!
//! # Architecture: Two Passes Over One Walk
//!
//! ```text
//! 1. Scan        photos/         →  ScanResult        (folders → images, walk order)
//! 2. Colors      ScanResult      →  FolderColorTable  (one color per folder, frozen)
//! 3. Stamp       ScanResult      →  photos_TEXT/      (decode, draw, encode in parallel)
//! ```
//!
//! The walk happens once and its result feeds both the color pre-pass and the
//! stamping pass. Placement math (font size and anchor position) is a set of
//! pure functions with no I/O, so it is unit tested without images or fonts.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`scan`] | Walks the input tree and plans the destination of every supported image |
//! | [`folder_colors`] | Pre-pass assigning one random palette color per image folder |
//! | [`process`] | Batch processor: per-image pipeline, failure accounting, progress events |
//! | [`placement`] | Font size from the image diagonal, anchor coordinates, random choices |
//! | [`imaging`] | Decode/encode in the source format, text rendering behind [`imaging::TextRenderer`] |
//! | [`config`] | `watermark.toml` loading, merging over stock defaults, validation |
//! | [`types`] | Palette, positions, selector parsing, the [`types::WatermarkRequest`] |
//! | [`output`] | CLI output formatting for progress and the final summary |
//!
//! # Design Decisions
//!
//! ## Failures Stay Local
//!
//! A file that cannot be decoded, drawn or written is recorded against its
//! relative path and the run moves on. Only conditions that make every image
//! fail (missing input, missing font, unwritable output root, bad config) stop
//! a run, and those are checked before the first file is written.
//!
//! ## Same Format Out As In
//!
//! Each output is encoded in the format detected from the source's content, so
//! a JPEG stays a JPEG and a PNG keeps its alpha channel. Text is drawn on an
//! RGBA copy which is converted back to the source pixel layout before saving.
//!
//! ## Unclamped Placement
//!
//! Text larger than the image is still drawn at its computed origin, which may
//! be negative. The renderer clips what falls outside the canvas.

pub mod config;
pub mod folder_colors;
pub mod imaging;
pub mod output;
pub mod placement;
pub mod process;
pub mod scan;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
