//! Tool configuration.
//!
//! Handles loading, validating, and merging `watermark.toml`. Stock defaults
//! are overridden by a user file, either passed with `--config` or found as
//! `watermark.toml` in the input directory.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [font]
//! path = "fonts/ChillDuanHeiSongPro_Regular.otf"
//!
//! [placement]
//! padding = 10          # Distance from the image edge, in pixels
//! font_scale = 0.03     # Font size as a fraction of the image diagonal
//! min_font_size = 40
//! max_font_size = 300
//!
//! [processing]
//! max_processes = 4     # Max parallel workers (omit for auto = CPU cores)
//! ```
//!
//! Config files are sparse: override just the values you want. Unknown keys
//! are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name looked up in the input directory when `--config` is not given.
pub const CONFIG_FILE_NAME: &str = "watermark.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Tool configuration loaded from `watermark.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WatermarkConfig {
    /// Typeface used for the watermark text.
    pub font: FontConfig,
    /// Font sizing and edge padding.
    pub placement: PlacementConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl WatermarkConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let p = &self.placement;
        if !(p.font_scale.is_finite() && p.font_scale > 0.0) {
            return Err(ConfigError::Validation(
                "placement.font_scale must be a positive number".into(),
            ));
        }
        if p.min_font_size == 0 {
            return Err(ConfigError::Validation(
                "placement.min_font_size must be at least 1".into(),
            ));
        }
        if p.min_font_size > p.max_font_size {
            return Err(ConfigError::Validation(format!(
                "placement.min_font_size ({}) exceeds max_font_size ({})",
                p.min_font_size, p.max_font_size
            )));
        }
        if self.processing.max_processes == Some(0) {
            return Err(ConfigError::Validation(
                "processing.max_processes must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FontConfig {
    /// Path to a TrueType/OpenType file. Relative paths are tried against the
    /// working directory first, then the directory of the executable.
    pub path: PathBuf,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("fonts/ChillDuanHeiSongPro_Regular.otf"),
        }
    }
}

/// Geometry settings consumed by [`crate::placement`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlacementConfig {
    /// Gap between the text box and the image edge, in pixels.
    pub padding: u32,
    /// Font size as a fraction of the image diagonal.
    pub font_scale: f64,
    pub min_font_size: u32,
    pub max_font_size: u32,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            padding: 10,
            font_scale: 0.03,
            min_font_size: 40,
            max_font_size: 300,
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel image workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config.max_processes.map(|n| n.min(cores)).unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(WatermarkConfig::default())
        .map_err(|e| ConfigError::Validation(format!("default config does not serialize: {e}")))
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Read a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<WatermarkConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: WatermarkConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load the effective configuration.
///
/// An explicit path must exist. Without one, `watermark.toml` in
/// `input_dir` is used when present, and stock defaults otherwise.
pub fn load_config(
    explicit: Option<&Path>,
    input_dir: &Path,
) -> Result<WatermarkConfig, ConfigError> {
    let overlay = match explicit {
        Some(path) => Some(load_raw_config(path)?.ok_or_else(|| {
            ConfigError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("config file not found: {}", path.display()),
            ))
        })?),
        None => load_raw_config(&input_dir.join(CONFIG_FILE_NAME))?,
    };
    resolve_config(stock_defaults_value()?, overlay)
}

/// Returns a fully-commented stock `watermark.toml` with all keys and explanations.
///
/// Printed by `--gen-config`.
pub fn stock_config_toml() -> &'static str {
    r##"# Watermark configuration
# =======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Place this file as watermark.toml in the input directory, or pass it
# explicitly with --config. Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Font
# ---------------------------------------------------------------------------
[font]
# TrueType/OpenType file used to render the watermark text.
# Relative paths are resolved against the working directory first,
# then against the directory containing the executable.
path = "fonts/ChillDuanHeiSongPro_Regular.otf"

# ---------------------------------------------------------------------------
# Placement
# ---------------------------------------------------------------------------
[placement]
# Distance in pixels between the text and the image edge.
padding = 10

# Font size = image diagonal * font_scale, clamped to [min, max].
font_scale = 0.03
min_font_size = 40
max_font_size = 300

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel image workers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}
