//! Parameter types for image operations.
//!
//! These structs describe *what* to produce, not *how*. They are the interface
//! between [`operations`](super::operations) (which decides which files to
//! create and where) and the [`backend`](super::backend) (which does the pixel
//! work and encoding), so a mock backend can stand in during tests.
//!
//! ## Types
//!
//! - [`Quality`] — Lossy encoding quality (1–100, default 85). Clamped on construction.
//! - [`OutputFormat`] — JPEG or PNG, chosen from the original file's extension.
//! - [`CanvasParams`] — A fixed-size rendition: fit, then center on a background canvas.
//! - [`FitParams`] — A scaled-only rendition that keeps the source aspect ratio.

use crate::naming;
use std::path::PathBuf;

/// Quality setting for lossy image encoding (1-100).
///
/// Only constructed through [`Quality::new`], so the value always fits a `u8`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(85)
    }
}

/// Encoded output format.
///
/// Chosen by the original upload's extension: JPEG variants stay JPEG,
/// everything else is written as PNG. Renditions are always opaque, so PNG
/// never loses anything JPEG would have kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Jpeg,
    Png,
}

impl OutputFormat {
    pub fn for_extension(extension: &str) -> Self {
        if naming::is_jpeg_extension(extension) {
            OutputFormat::Jpeg
        } else {
            OutputFormat::Png
        }
    }
}

/// Background color for letterboxing and alpha flattening.
pub const WHITE: [u8; 3] = [255, 255, 255];

/// A fixed-canvas rendition.
#[derive(Debug, Clone, PartialEq)]
pub struct CanvasParams {
    pub output: PathBuf,
    /// Exact output dimensions.
    pub width: u32,
    pub height: u32,
    pub format: OutputFormat,
    pub quality: Quality,
    pub background: [u8; 3],
}

/// A scaled-to-fit rendition without canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct FitParams {
    pub output: PathBuf,
    /// Bounding box; the output is at most this large.
    pub max_width: u32,
    pub max_height: u32,
    pub format: OutputFormat,
    pub quality: Quality,
}
