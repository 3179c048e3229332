//! Per-folder stable colors.
//!
//! When the color mode is random and same-folder consistency is on, every
//! folder that holds images gets one palette color, drawn once before any
//! image is processed. The table is read-only afterwards: workers only ever
//! look colors up, so results do not depend on processing order.

use crate::placement::random_palette_color;
use crate::scan::ScanResult;
use crate::types::{PaletteColor, WatermarkRequest};
use rand::Rng;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Folder (relative to the input root) → its color for this run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FolderColorTable {
    colors: BTreeMap<PathBuf, PaletteColor>,
}

impl FolderColorTable {
    /// Draw one color per image folder, or build an empty table when the
    /// request does not ask for folder-stable colors.
    pub fn build<R: Rng + ?Sized>(scan: &ScanResult, request: &WatermarkRequest, rng: &mut R) -> Self {
        if !request.uses_folder_colors() {
            return Self::default();
        }
        let colors = scan
            .folders
            .iter()
            .filter(|f| !f.images.is_empty())
            .map(|f| (f.relative_dir.clone(), random_palette_color(rng)))
            .collect();
        Self { colors }
    }

    /// Color assigned to a folder. Subfolders do not inherit it.
    pub fn get(&self, relative_dir: &Path) -> Option<PaletteColor> {
        self.colors.get(relative_dir).copied()
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::{FolderListing, ImageTask};
    use crate::types::{ColorMode, PositionMode};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn listing(dirs: &[&str]) -> ScanResult {
        ScanResult {
            folders: dirs
                .iter()
                .map(|d| FolderListing {
                    relative_dir: PathBuf::from(d),
                    images: vec![ImageTask {
                        source_path: PathBuf::from("in").join(d).join("x.png"),
                        relative_path: PathBuf::from(d).join("x.png"),
                        destination_path: PathBuf::from("out").join(d).join("x.png"),
                    }],
                })
                .collect(),
        }
    }

    fn request(color: ColorMode, same_folder: bool) -> WatermarkRequest {
        WatermarkRequest {
            text: "MARK".into(),
            position: PositionMode::Random,
            color,
            same_folder_same_color: same_folder,
        }
    }

    #[test]
    fn one_entry_per_image_folder() {
        let scan = listing(&["", "trip", "trip/day1"]);
        let mut rng = StdRng::seed_from_u64(5);
        let table = FolderColorTable::build(&scan, &request(ColorMode::Random, true), &mut rng);

        assert_eq!(table.len(), 3);
        assert!(table.get(Path::new("")).is_some());
        assert!(table.get(Path::new("trip/day1")).is_some());
        assert!(table.get(Path::new("elsewhere")).is_none());
    }

    #[test]
    fn empty_when_consistency_disabled() {
        let scan = listing(&["", "trip"]);
        let mut rng = StdRng::seed_from_u64(5);
        let table = FolderColorTable::build(&scan, &request(ColorMode::Random, false), &mut rng);
        assert!(table.is_empty());
    }

    #[test]
    fn empty_for_fixed_color() {
        let scan = listing(&["", "trip"]);
        let mut rng = StdRng::seed_from_u64(5);
        let fixed = ColorMode::Fixed(PaletteColor::Red.rgb());
        let table = FolderColorTable::build(&scan, &request(fixed, true), &mut rng);
        assert!(table.is_empty());
    }

    #[test]
    fn folders_without_images_get_no_color() {
        let mut scan = listing(&["", "docs"]);
        scan.folders[1].images.clear();
        let mut rng = StdRng::seed_from_u64(5);
        let table = FolderColorTable::build(&scan, &request(ColorMode::Random, true), &mut rng);
        assert_eq!(table.len(), 1);
        assert!(table.get(Path::new("docs")).is_none());
    }

    #[test]
    fn lookups_are_stable() {
        let scan = listing(&["a", "b", "c", "d", "e", "f"]);
        let mut rng = StdRng::seed_from_u64(11);
        let table = FolderColorTable::build(&scan, &request(ColorMode::Random, true), &mut rng);
        let first: Vec<_> = scan.folders.iter().map(|f| table.get(&f.relative_dir)).collect();
        assert!(first.iter().all(Option::is_some));
        for _ in 0..10 {
            for (folder, color) in scan.folders.iter().zip(&first) {
                assert_eq!(table.get(&folder.relative_dir), *color);
            }
        }
    }

    #[test]
    fn many_folders_use_more_than_one_color() {
        let dirs: Vec<String> = (0..64).map(|i| format!("f{i:02}")).collect();
        let refs: Vec<&str> = dirs.iter().map(String::as_str).collect();
        let scan = listing(&refs);
        let mut rng = StdRng::seed_from_u64(2);
        let table = FolderColorTable::build(&scan, &request(ColorMode::Random, true), &mut rng);
        let distinct: std::collections::HashSet<_> =
            scan.folders.iter().filter_map(|f| table.get(&f.relative_dir)).collect();
        assert!(distinct.len() > 1);
    }
}
