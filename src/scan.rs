//! Input tree discovery.
//!
//! Walks the input directory once and groups supported images by the folder
//! that directly contains them. The same listing feeds both the folder color
//! pre-pass and the main stamping pass.
//!
//! ## Ordering
//!
//! Entries are visited depth-first with names sorted, so a folder's own
//! images come before its subfolders and the order is stable across runs:
//!
//! ```text
//! photos/                  folder ""      → a.jpg, z.png
//! ├── a.jpg
//! ├── notes.txt            (ignored)
//! ├── trip/                folder "trip"  → b.png
//! │   └── b.png
//! └── z.png
//! ```
//!
//! Folders without a supported image are left out of the listing entirely,
//! so nothing is ever created for them in the output tree.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

/// Lower-case extensions accepted as input (and preserved on output).
pub const SUPPORTED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp", "tiff"];

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("input directory does not exist: {0}")]
    InvalidInput(PathBuf),
    #[error("cannot read input directory: {0}")]
    Walk(#[from] walkdir::Error),
}

/// One image to stamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageTask {
    pub source_path: PathBuf,
    /// Path relative to the input root; also the path under the output root.
    pub relative_path: PathBuf,
    pub destination_path: PathBuf,
}

/// Images sitting directly inside one folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderListing {
    /// Folder path relative to the input root; empty for the root itself.
    pub relative_dir: PathBuf,
    pub images: Vec<ImageTask>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanResult {
    /// Folders in walk order. Every entry has at least one image.
    pub folders: Vec<FolderListing>,
}

impl ScanResult {
    pub fn image_count(&self) -> usize {
        self.folders.iter().map(|f| f.images.len()).sum()
    }
}

/// Whether a path has one of the [`SUPPORTED_EXTENSIONS`], ignoring case.
pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| SUPPORTED_EXTENSIONS.iter().any(|s| e.eq_ignore_ascii_case(s)))
}

/// Display form of a relative folder path: `.` for the root.
pub fn folder_label(relative_dir: &Path) -> String {
    if relative_dir.as_os_str().is_empty() {
        ".".to_string()
    } else {
        relative_dir.display().to_string()
    }
}

/// Absolute form of `path` with symlinks, `.` and `..` resolved as far as
/// the path exists. A missing tail is appended to its resolved parent.
pub fn absolute_path(path: &Path) -> PathBuf {
    if let Ok(resolved) = std::fs::canonicalize(path) {
        return resolved;
    }
    match (path.parent(), path.file_name()) {
        (Some(parent), Some(name)) => {
            let parent = if parent.as_os_str().is_empty() {
                Path::new(".")
            } else {
                parent
            };
            absolute_path(parent).join(name)
        }
        _ => std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf()),
    }
}

/// Walk `input` and plan where every supported image lands under `output`.
///
/// If `output` lies inside `input` it is skipped, so a rerun never stamps
/// its own results. Both are compared as absolute paths, so `.` as input
/// and a relative output still match up. Unreadable subdirectories are logged and skipped; an
/// unreadable root is an error.
pub fn scan(input: &Path, output: &Path) -> Result<ScanResult, ScanError> {
    if !input.is_dir() {
        return Err(ScanError::InvalidInput(input.to_path_buf()));
    }

    let mut folders: Vec<FolderListing> = Vec::new();
    let mut index: HashMap<PathBuf, usize> = HashMap::new();

    let root = absolute_path(input);
    let skip = absolute_path(output);
    let walker = WalkDir::new(&root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.path() != skip);

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) if err.depth() == 0 => return Err(ScanError::Walk(err)),
            Err(err) => {
                tracing::warn!(error = %err, "skipping unreadable entry");
                continue;
            }
        };

        let path = entry.path();
        let Ok(relative) = path.strip_prefix(&root) else {
            continue;
        };

        if entry.file_type().is_dir() {
            index.entry(relative.to_path_buf()).or_insert_with(|| {
                folders.push(FolderListing {
                    relative_dir: relative.to_path_buf(),
                    images: Vec::new(),
                });
                folders.len() - 1
            });
            continue;
        }

        // Follows file symlinks, like opening the path would.
        if !path.is_file() || !is_supported_image(path) {
            continue;
        }

        let relative_dir = relative.parent().unwrap_or(Path::new("")).to_path_buf();
        let Some(&slot) = index.get(&relative_dir) else {
            continue;
        };
        folders[slot].images.push(ImageTask {
            source_path: input.join(relative),
            relative_path: relative.to_path_buf(),
            destination_path: output.join(relative),
        });
    }

    folders.retain(|f| !f.images.is_empty());
    let result = ScanResult { folders };
    tracing::debug!(
        folders = result.folders.len(),
        images = result.image_count(),
        "scan complete"
    );
    Ok(result)
}
