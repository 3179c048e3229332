//! CLI output formatting for a watermark run.
//!
//! # Output Format
//!
//! ```text
//! Watermarking photos → photos_DRAFT
//!     Text: DRAFT
//!     Position: random
//!     Color: random (same color per folder)
//!
//! . (1 image)
//!     done a.jpg  center, red, 40px
//! trip (2 images, color: orange)
//!     done trip/b.png  top-left, orange, 67px
//!     failed trip/broken.jpg
//!         decode failed: ...
//!
//! Processed 2 images, 1 error
//! ```
//!
//! # Architecture
//!
//! Each section has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure: no I/O, no side effects.

use crate::process::{ProcessEvent, RunResult};
use crate::types::{ColorMode, WatermarkRequest, color_label};
use std::path::Path;

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// `1 image`, `3 images`.
fn plural(n: usize, noun: &str) -> String {
    if n == 1 {
        format!("{n} {noun}")
    } else {
        format!("{n} {noun}s")
    }
}

// ============================================================================
// Run header
// ============================================================================

/// Format the settings a run was started with.
pub fn format_run_header(input: &Path, output: &Path, request: &WatermarkRequest) -> Vec<String> {
    let color = match request.color {
        ColorMode::Random if request.same_folder_same_color => {
            "random (same color per folder)".to_string()
        }
        ColorMode::Random => "random (per image)".to_string(),
        fixed => fixed.to_string(),
    };
    vec![
        format!("Watermarking {} \u{2192} {}", input.display(), output.display()),
        format!("{}Text: {}", indent(1), request.text),
        format!("{}Position: {}", indent(1), request.position),
        format!("{}Color: {}", indent(1), color),
        String::new(),
    ]
}

pub fn print_run_header(input: &Path, output: &Path, request: &WatermarkRequest) {
    for line in format_run_header(input, output, request) {
        println!("{}", line);
    }
}

// ============================================================================
// Progress events
// ============================================================================

/// Format a single progress event as display lines.
pub fn format_process_event(event: &ProcessEvent) -> Vec<String> {
    match event {
        ProcessEvent::FolderStarted {
            folder,
            image_count,
            color,
        } => {
            let count = plural(*image_count, "image");
            match color {
                Some(c) => vec![format!("{} ({}, color: {})", folder, count, c.name())],
                None => vec![format!("{} ({})", folder, count)],
            }
        }
        ProcessEvent::ImageStamped(stamp) => vec![format!(
            "{}done {}  {}, {}, {}px",
            indent(1),
            stamp.relative_path,
            stamp.position,
            color_label(stamp.color),
            stamp.font_size
        )],
        ProcessEvent::ImageFailed(failure) => vec![
            format!("{}failed {}", indent(1), failure.relative_path),
            format!("{}{}", indent(2), failure.reason),
        ],
    }
}

// ============================================================================
// Summary
// ============================================================================

/// Format the closing counts of a run.
///
/// Failed paths are not repeated here: each one was already printed once by
/// its `failed` progress line.
pub fn format_summary(result: &RunResult) -> Vec<String> {
    vec![
        String::new(),
        format!(
            "Processed {}, {}",
            plural(result.processed, "image"),
            plural(result.errors, "error")
        ),
    ]
}

pub fn print_summary(result: &RunResult) {
    for line in format_summary(result) {
        println!("{}", line);
    }
}
