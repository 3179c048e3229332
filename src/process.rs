//! Batch watermarking.
//!
//! Takes the input tree, stamps every supported image and writes the result
//! to a mirrored output tree.
//!
//! ## Pipeline
//!
//! ```text
//! 1. Preconditions   input is a directory, font loads        (fatal)
//! 2. Scan            one walk, images grouped by folder
//! 3. Color pre-pass  FolderColorTable, frozen from here on
//! 4. Main pass       per image: open → measure → place → draw overlay → composite → save
//! ```
//!
//! ## Output Structure
//!
//! ```text
//! photos/                 photos_DRAFT/
//! ├── a.jpg          →    ├── a.jpg
//! ├── notes.txt           └── trip/
//! └── trip/                   └── b.png
//!     └── b.png
//! ```
//!
//! ## Failure Handling
//!
//! A failure in step 4 is recorded against the image's relative path and
//! the run moves on. Only the preconditions stop a run, and they are all
//! checked before the first output file is written.
//!
//! ## Parallel Processing
//!
//! Folders are handled in walk order; the images inside a folder are stamped
//! in parallel using [rayon](https://docs.rs/rayon). Each worker holds one
//! decoded image at a time and drops it before taking the next.

use crate::config::{PlacementConfig, WatermarkConfig};
use crate::folder_colors::FolderColorTable;
use crate::imaging::{
    FontError, GlyphRenderer, ImageError, TextRenderer, apply_overlay, open_image,
    resolve_font_path, save_image,
};
use crate::placement::{
    Extent, compute_font_size, compute_position, resolve_color, resolve_position,
};
use crate::scan::{self, ImageTask, ScanError, absolute_path, folder_label};
use crate::types::{PaletteColor, Position, Rgb, WatermarkRequest};
use image::RgbaImage;
use rand::Rng;
use rayon::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;

/// Fatal errors: the run stops before any image is written.
#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("input directory does not exist: {0}")]
    InvalidInput(PathBuf),
    #[error("font unavailable: {0}")]
    FontUnavailable(#[from] FontError),
    #[error("cannot create output directory {path}: {source}")]
    OutputDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("scan failed: {0}")]
    Scan(#[from] ScanError),
}

/// A successfully stamped image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StampRecord {
    pub relative_path: String,
    pub position: Position,
    pub color: Rgb,
    pub font_size: u32,
}

/// An image that could not be stamped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileFailure {
    pub relative_path: String,
    pub reason: String,
}

/// Progress events emitted during processing.
#[derive(Debug, Clone)]
pub enum ProcessEvent {
    /// A folder's images are about to be stamped.
    FolderStarted {
        folder: String,
        image_count: usize,
        /// Set when the folder has a stable random color.
        color: Option<PaletteColor>,
    },
    ImageStamped(StampRecord),
    ImageFailed(FileFailure),
}

/// Counts and per-file records for a whole run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunResult {
    pub processed: usize,
    pub errors: usize,
    pub stamped: Vec<StampRecord>,
    pub failures: Vec<FileFailure>,
}

impl RunResult {
    fn record(&mut self, outcome: Result<StampRecord, FileFailure>) {
        match outcome {
            Ok(stamp) => {
                self.processed += 1;
                self.stamped.push(stamp);
            }
            Err(failure) => {
                self.errors += 1;
                self.failures.push(failure);
            }
        }
    }
}

/// `{parent}/{basename}_{text}` next to the input directory.
///
/// The input is resolved to an absolute path first, so `.` and `..` name
/// the directory they stand for. The filesystem root has no basename and
/// yields `/_{text}`.
pub fn output_dir_for(input: &Path, text: &str) -> PathBuf {
    let resolved = absolute_path(input);
    let name = resolved
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let parent = resolved.parent().unwrap_or(&resolved);
    parent.join(format!("{name}_{text}"))
}

/// Stamp every image under `input` into `output` using the configured font.
///
/// The font is loaded before anything is written; a missing or broken font
/// fails the whole run with [`ProcessError::FontUnavailable`].
pub fn process(
    request: &WatermarkRequest,
    input: &Path,
    output: &Path,
    config: &WatermarkConfig,
    events: Option<Sender<ProcessEvent>>,
) -> Result<RunResult, ProcessError> {
    if !input.is_dir() {
        return Err(ProcessError::InvalidInput(input.to_path_buf()));
    }
    let renderer = GlyphRenderer::load(&resolve_font_path(&config.font.path))?;
    tracing::debug!(font = %renderer.path().display(), "loaded watermark font");
    process_with_renderer(&renderer, request, input, output, &config.placement, events)
}

/// Stamp images using a specific renderer (allows testing with a mock).
pub fn process_with_renderer(
    renderer: &impl TextRenderer,
    request: &WatermarkRequest,
    input: &Path,
    output: &Path,
    placement: &PlacementConfig,
    events: Option<Sender<ProcessEvent>>,
) -> Result<RunResult, ProcessError> {
    if !input.is_dir() {
        return Err(ProcessError::InvalidInput(input.to_path_buf()));
    }

    let listing = scan::scan(input, output)?;
    let folder_colors = FolderColorTable::build(&listing, request, &mut rand::rng());
    if !folder_colors.is_empty() {
        tracing::debug!(folders = folder_colors.len(), "assigned folder colors");
    }

    std::fs::create_dir_all(output).map_err(|source| ProcessError::OutputDir {
        path: output.to_path_buf(),
        source,
    })?;

    let emit = |event: ProcessEvent| {
        if let Some(tx) = &events {
            // The receiver going away only silences progress output.
            let _ = tx.send(event);
        }
    };

    let mut result = RunResult::default();

    for folder in &listing.folders {
        let folder_color = folder_colors.get(&folder.relative_dir);
        emit(ProcessEvent::FolderStarted {
            folder: folder_label(&folder.relative_dir),
            image_count: folder.images.len(),
            color: folder_color,
        });

        let outcomes: Vec<Result<StampRecord, FileFailure>> = folder
            .images
            .par_iter()
            .map(|task| {
                let outcome = stamp_image(
                    renderer,
                    request,
                    placement,
                    folder_color.map(PaletteColor::rgb),
                    task,
                    &mut rand::rng(),
                )
                .map_err(|err| {
                    // The ImageFailed event is the user-facing record.
                    tracing::debug!(file = %task.relative_path.display(), error = %err, "watermark failed");
                    FileFailure {
                        relative_path: task.relative_path.display().to_string(),
                        reason: err.to_string(),
                    }
                });
                match &outcome {
                    Ok(stamp) => emit(ProcessEvent::ImageStamped(stamp.clone())),
                    Err(failure) => emit(ProcessEvent::ImageFailed(failure.clone())),
                }
                outcome
            })
            .collect();

        for outcome in outcomes {
            result.record(outcome);
        }
    }

    Ok(result)
}

/// Stamp one image and write it to its destination.
///
/// Text is drawn on a transparent overlay and composited into the decoded
/// image at its native depth. The destination is written atomically, so a failure at any step leaves
/// neither the source nor a half-written output behind.
pub fn stamp_image<R: Rng + ?Sized>(
    renderer: &impl TextRenderer,
    request: &WatermarkRequest,
    placement: &PlacementConfig,
    folder_color: Option<Rgb>,
    task: &ImageTask,
    rng: &mut R,
) -> Result<StampRecord, ImageError> {
    if let Some(dir) = task.destination_path.parent() {
        std::fs::create_dir_all(dir).map_err(|source| ImageError::CreateDir {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let source = open_image(&task.source_path)?;
    let image_extent = Extent::new(source.image.width(), source.image.height());

    let font_size = compute_font_size(image_extent.width, image_extent.height, placement);
    let text_extent = renderer.measure(&request.text, font_size);

    let position = resolve_position(request.position, rng);
    let color = resolve_color(request.color, folder_color, request.same_folder_same_color, rng);
    let origin = compute_position(position, image_extent, text_extent, placement.padding);

    let mut overlay = RgbaImage::new(image_extent.width, image_extent.height);
    renderer.draw(&mut overlay, &request.text, font_size, origin, color);

    let format = source.format;
    let stamped = apply_overlay(source.image, &overlay);
    drop(overlay);
    save_image(&stamped, format, &task.destination_path)?;

    tracing::debug!(
        file = %task.relative_path.display(),
        %position,
        %color,
        font_size,
        x = origin.x,
        y = origin.y,
        "stamped"
    );

    Ok(StampRecord {
        relative_path: task.relative_path.display().to_string(),
        position,
        color,
        font_size,
    })
}
