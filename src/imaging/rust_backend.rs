//! Pure Rust image processing backend.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, GIF, BMP, WebP) | `image` crate, format sniffed from content |
//! | Identify | `ImageReader::into_dimensions` (header only) |
//! | Resize | `image::imageops::resize` with `Lanczos3` filter |
//! | Canvas | [`compose::fit_and_center`](super::compose::fit_and_center) |
//! | Encode → JPEG | `JpegEncoder::new_with_quality` |
//! | Encode → PNG | `PngEncoder` with best compression + adaptive filtering |
//!
//! Formats are sniffed from file content rather than trusted from the
//! extension, so a PNG-encoded rendition stored under a `.gif` name still
//! reads back.

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::compose;
use super::params::{CanvasParams, FitParams, OutputFormat, Quality};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType as PngFilter, PngEncoder};
use image::{DynamicImage, ExtendedColorType, ImageEncoder, ImageFormat, ImageReader, RgbImage};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::LazyLock;

/// Extensions whose decoders are compiled in.
const IMAGE_CANDIDATES: &[(&str, ImageFormat)] = &[
    ("jpg", ImageFormat::Jpeg),
    ("jpeg", ImageFormat::Jpeg),
    ("jpe", ImageFormat::Jpeg),
    ("jfif", ImageFormat::Jpeg),
    ("png", ImageFormat::Png),
    ("gif", ImageFormat::Gif),
    ("bmp", ImageFormat::Bmp),
    ("webp", ImageFormat::WebP),
];

static SUPPORTED_EXTENSIONS: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    IMAGE_CANDIDATES
        .iter()
        .filter(|(_, fmt)| fmt.reading_enabled())
        .map(|(ext, _)| *ext)
        .collect()
});

/// Image extensions with a decoder compiled in. `images.extensions` must stay within this set.
pub fn supported_input_extensions() -> &'static [&'static str] {
    &SUPPORTED_EXTENSIONS
}

/// Pure Rust backend using the `image` crate.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn open_sniffed(path: &Path) -> Result<ImageReader<std::io::BufReader<std::fs::File>>, BackendError> {
    Ok(ImageReader::open(path)?.with_guessed_format()?)
}

/// Encode and write an opaque RGB image.
fn save_image(
    img: &RgbImage,
    path: &Path,
    format: OutputFormat,
    quality: Quality,
) -> Result<(), BackendError> {
    let file = std::fs::File::create(path)?;
    let mut writer = BufWriter::new(file);
    let encoded = match format {
        OutputFormat::Jpeg => {
            JpegEncoder::new_with_quality(&mut writer, quality.value() as u8).write_image(
                img.as_raw(),
                img.width(),
                img.height(),
                ExtendedColorType::Rgb8,
            )
        }
        OutputFormat::Png => {
            PngEncoder::new_with_quality(&mut writer, CompressionType::Best, PngFilter::Adaptive)
                .write_image(
                    img.as_raw(),
                    img.width(),
                    img.height(),
                    ExtendedColorType::Rgb8,
                )
        }
    };
    encoded.map_err(|e| BackendError::Encode {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    writer.flush()?;
    Ok(())
}

impl ImageBackend for RustBackend {
    fn decode(&self, path: &Path) -> Result<DynamicImage, BackendError> {
        open_sniffed(path)?
            .decode()
            .map_err(|e| BackendError::Decode {
                path: path.display().to_string(),
                reason: e.to_string(),
            })
    }

    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError> {
        let (width, height) = open_sniffed(path)?
            .into_dimensions()
            .map_err(|e| BackendError::Decode {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
        Ok(Dimensions { width, height })
    }

    fn render_canvas(&self, source: &RgbImage, params: &CanvasParams) -> Result<(), BackendError> {
        let canvas = compose::fit_and_center(source, params.width, params.height, params.background);
        save_image(&canvas, &params.output, params.format, params.quality)
    }

    fn render_fit(&self, source: &RgbImage, params: &FitParams) -> Result<(), BackendError> {
        let scaled = compose::scale_to_fit(source, params.max_width, params.max_height);
        save_image(&scaled, &params.output, params.format, params.quality)
    }
}
