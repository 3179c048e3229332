//! Watermark request types shared by placement, scanning, and processing.
//!
//! A [`WatermarkRequest`] is built once from the command line and stays
//! immutable for the whole run. Palette and position tables are plain enums
//! with mapping functions rather than lookup maps.

use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SelectorError {
    #[error("unknown position '{0}' (expected 1-5 or random)")]
    UnknownPosition(String),
    #[error("unknown color '{0}' (expected red, yellow, green, orange, #RRGGBB or random)")]
    UnknownColor(String),
}

/// An opaque 8-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#RGB` or `#RRGGBB`. Returns `None` for anything else.
    pub fn parse_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#')?;
        if !digits.is_ascii() {
            return None;
        }
        let channel = |s: &str| u8::from_str_radix(s, 16).ok();
        match digits.len() {
            // Each digit is doubled: #F80 -> #FF8800
            3 => Some(Self::new(
                channel(&digits[0..1])? * 17,
                channel(&digits[1..2])? * 17,
                channel(&digits[2..3])? * 17,
            )),
            6 => Some(Self::new(
                channel(&digits[0..2])?,
                channel(&digits[2..4])?,
                channel(&digits[4..6])?,
            )),
            _ => None,
        }
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// The fixed palette random colors are drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaletteColor {
    Red,
    Yellow,
    Green,
    Orange,
}

impl PaletteColor {
    pub const ALL: [PaletteColor; 4] = [
        PaletteColor::Red,
        PaletteColor::Yellow,
        PaletteColor::Green,
        PaletteColor::Orange,
    ];

    pub fn rgb(self) -> Rgb {
        match self {
            PaletteColor::Red => Rgb::new(0xFF, 0x00, 0x00),
            PaletteColor::Yellow => Rgb::new(0xFF, 0xFF, 0x00),
            PaletteColor::Green => Rgb::new(0x00, 0xFF, 0x00),
            PaletteColor::Orange => Rgb::new(0xFF, 0xA5, 0x00),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            PaletteColor::Red => "red",
            PaletteColor::Yellow => "yellow",
            PaletteColor::Green => "green",
            PaletteColor::Orange => "orange",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(name))
    }

    /// Reverse lookup, used to show palette names instead of hex codes.
    pub fn from_rgb(rgb: Rgb) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.rgb() == rgb)
    }
}

/// Human-readable label for a color: palette name when it has one, hex otherwise.
pub fn color_label(rgb: Rgb) -> String {
    match PaletteColor::from_rgb(rgb) {
        Some(c) => c.name().to_string(),
        None => rgb.to_string(),
    }
}

/// One of the five fixed anchor points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Position {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
    Center,
}

impl Position {
    /// Ordered by CLI selector: `1` is top-left, `5` is center.
    pub const ALL: [Position; 5] = [
        Position::TopLeft,
        Position::TopRight,
        Position::BottomLeft,
        Position::BottomRight,
        Position::Center,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Position::TopLeft => "top-left",
            Position::TopRight => "top-right",
            Position::BottomLeft => "bottom-left",
            Position::BottomRight => "bottom-right",
            Position::Center => "center",
        }
    }

    /// Accepts exactly `1`..`5` or the kebab-case label.
    pub fn from_selector(selector: &str) -> Option<Self> {
        let numeric = match selector {
            "1" => Some(Position::TopLeft),
            "2" => Some(Position::TopRight),
            "3" => Some(Position::BottomLeft),
            "4" => Some(Position::BottomRight),
            "5" => Some(Position::Center),
            _ => None,
        };
        if numeric.is_some() {
            return numeric;
        }
        Self::ALL
            .into_iter()
            .find(|p| p.label().eq_ignore_ascii_case(selector))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionMode {
    Fixed(Position),
    /// A fresh draw for every image.
    Random,
}

impl PositionMode {
    /// Where text goes when the selector is not recognized.
    pub const FALLBACK: PositionMode = PositionMode::Fixed(Position::BottomLeft);
}

impl FromStr for PositionMode {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("random") {
            return Ok(PositionMode::Random);
        }
        Position::from_selector(s)
            .map(PositionMode::Fixed)
            .ok_or_else(|| SelectorError::UnknownPosition(s.to_string()))
    }
}

impl fmt::Display for PositionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PositionMode::Fixed(p) => p.fmt(f),
            PositionMode::Random => f.write_str("random"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorMode {
    Fixed(Rgb),
    Random,
}

impl ColorMode {
    /// Unrecognized color selectors mean random.
    pub const FALLBACK: ColorMode = ColorMode::Random;
}

impl FromStr for ColorMode {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("random") {
            return Ok(ColorMode::Random);
        }
        if let Some(c) = PaletteColor::from_name(s) {
            return Ok(ColorMode::Fixed(c.rgb()));
        }
        Rgb::parse_hex(s)
            .map(ColorMode::Fixed)
            .ok_or_else(|| SelectorError::UnknownColor(s.to_string()))
    }
}

impl fmt::Display for ColorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColorMode::Fixed(rgb) => f.write_str(&color_label(*rgb)),
            ColorMode::Random => f.write_str("random"),
        }
    }
}

/// Interpret the same-folder-same-color argument.
///
/// Only an explicit negative (`no`, `false`, `0`, `n`, any case) disables it.
pub fn parse_same_folder_flag(value: Option<&str>) -> bool {
    match value {
        Some(v) => !matches!(
            v.trim().to_ascii_lowercase().as_str(),
            "no" | "false" | "0" | "n"
        ),
        None => true,
    }
}

/// Everything the user asked for, fixed for the duration of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatermarkRequest {
    pub text: String,
    pub position: PositionMode,
    pub color: ColorMode,
    pub same_folder_same_color: bool,
}

impl WatermarkRequest {
    /// True when each folder gets one stable random color.
    pub fn uses_folder_colors(&self) -> bool {
        self.color == ColorMode::Random && self.same_folder_same_color
    }
}
