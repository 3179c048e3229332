//! Decoding and encoding of source images.
//!
//! Output keeps the source's container format and pixel layout. The
//! watermark is drawn on a transparent 8-bit overlay, then composited into
//! the source at the source's own depth: 16-bit and float images are blended
//! in 16-bit and float, and pixels the text does not touch keep their exact
//! values. Files are written to a temporary
//! sibling and renamed over the destination, so a failed encode never leaves
//! a truncated image behind.

use image::{ColorType, DynamicImage, ImageBuffer, ImageFormat, ImageReader, Pixel, Primitive, Rgba, RgbaImage};
use std::io::{BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use thiserror::Error;

/// Per-file failure. Never aborts a run.
#[derive(Error, Debug)]
pub enum ImageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("cannot create output folder {path}: {source}")]
    CreateDir {
        path: std::path::PathBuf,
        source: std::io::Error,
    },
    #[error("unrecognized image format")]
    UnknownFormat,
    #[error("decode failed: {0}")]
    Decode(image::ImageError),
    #[error("encode failed: {0}")]
    Encode(image::ImageError),
}

/// A decoded image together with the format it was stored in.
pub struct SourceImage {
    pub image: DynamicImage,
    pub format: ImageFormat,
}

/// Open and decode an image, detecting the format from its content and
/// falling back to the file extension.
pub fn open_image(path: &Path) -> Result<SourceImage, ImageError> {
    let reader = ImageReader::open(path)?.with_guessed_format()?;
    let format = match reader.format() {
        Some(format) => format,
        None => ImageFormat::from_path(path).map_err(|_| ImageError::UnknownFormat)?,
    };
    let image = reader.decode().map_err(ImageError::Decode)?;
    Ok(SourceImage { image, format })
}

/// Composite a text overlay onto `source` and return it in the source's
/// color type.
///
/// `overlay` must have the source's dimensions and hold coverage-blended
/// text on transparent black (premultiplied color, alpha = coverage).
pub fn apply_overlay(source: DynamicImage, overlay: &RgbaImage) -> DynamicImage {
    let color = source.color();
    let stamped = match color {
        ColorType::L16 | ColorType::La16 | ColorType::Rgb16 | ColorType::Rgba16 => {
            let mut base = source.into_rgba16();
            composite(&mut base, overlay, |s, o, a| {
                (s as f32 * (1.0 - a) + o as f32 * 257.0).round().clamp(0.0, 65535.0) as u16
            });
            DynamicImage::ImageRgba16(base)
        }
        ColorType::Rgb32F | ColorType::Rgba32F => {
            let mut base = source.into_rgba32f();
            composite(&mut base, overlay, |s, o, a| s * (1.0 - a) + o as f32 / 255.0);
            DynamicImage::ImageRgba32F(base)
        }
        _ => {
            let mut base = source.into_rgba8();
            composite(&mut base, overlay, |s, o, a| {
                (s as f32 * (1.0 - a) + o as f32).round().clamp(0.0, 255.0) as u8
            });
            DynamicImage::ImageRgba8(base)
        }
    };
    restore_color_type(stamped, color)
}

/// "Over" blend of each covered overlay pixel; `mix(base, overlay, alpha)`
/// works in the base's channel range.
fn composite<P: Primitive>(
    base: &mut ImageBuffer<Rgba<P>, Vec<P>>,
    overlay: &RgbaImage,
    mix: impl Fn(P, u8, f32) -> P,
) where
    Rgba<P>: Pixel<Subpixel = P>,
{
    for (dst, src) in base.pixels_mut().zip(overlay.pixels()) {
        let alpha = src.0[3] as f32 / 255.0;
        if alpha == 0.0 {
            continue;
        }
        for c in 0..4 {
            dst.0[c] = mix(dst.0[c], src.0[c], alpha);
        }
    }
}

/// Convert an image to the given pixel layout.
///
/// Layouts the `image` crate has no buffer type for become RGBA8.
pub fn restore_color_type(image: DynamicImage, color: ColorType) -> DynamicImage {
    if image.color() == color {
        return image;
    }
    match color {
        ColorType::L8 => DynamicImage::ImageLuma8(image.into_luma8()),
        ColorType::La8 => DynamicImage::ImageLumaA8(image.into_luma_alpha8()),
        ColorType::Rgb8 => DynamicImage::ImageRgb8(image.into_rgb8()),
        ColorType::Rgba8 => DynamicImage::ImageRgba8(image.into_rgba8()),
        ColorType::L16 => DynamicImage::ImageLuma16(image.into_luma16()),
        ColorType::La16 => DynamicImage::ImageLumaA16(image.into_luma_alpha16()),
        ColorType::Rgb16 => DynamicImage::ImageRgb16(image.into_rgb16()),
        ColorType::Rgba16 => DynamicImage::ImageRgba16(image.into_rgba16()),
        ColorType::Rgb32F => DynamicImage::ImageRgb32F(image.into_rgb32f()),
        ColorType::Rgba32F => DynamicImage::ImageRgba32F(image.into_rgba32f()),
        _ => DynamicImage::ImageRgba8(image.into_rgba8()),
    }
}

/// Encode `image` as `format` and atomically replace `destination`.
pub fn save_image(image: &DynamicImage, format: ImageFormat, destination: &Path) -> Result<(), ImageError> {
    let dir = match destination.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    {
        let mut writer = BufWriter::new(tmp.as_file_mut());
        image.write_to(&mut writer, format).map_err(ImageError::Encode)?;
        writer.flush()?;
    }
    tmp.persist(destination).map_err(|e| ImageError::Io(e.error))?;
    Ok(())
}
