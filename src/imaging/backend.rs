//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait covers the four operations the store needs:
//! decode (which doubles as content validation), identify, and the two
//! rendition writers. Renditions receive an already-decoded, flattened source
//! so one decode fans out into every configured size.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend).

use super::params::{CanvasParams, FitParams};
use image::{DynamicImage, RgbImage};
use std::path::Path;
use thiserror::Error;

pub use crate::types::Dimensions;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to decode {path}: {reason}")]
    Decode { path: String, reason: String },
    #[error("Failed to encode {path}: {reason}")]
    Encode { path: String, reason: String },
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Trait for image processing backends.
pub trait ImageBackend: Sync {
    /// Fully decode an image. Fails for unreadable content whatever the extension.
    fn decode(&self, path: &Path) -> Result<DynamicImage, BackendError>;

    /// Get image dimensions from the header.
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError>;

    /// Fit `source` into the canvas, center it, encode to `params.output`.
    fn render_canvas(&self, source: &RgbImage, params: &CanvasParams) -> Result<(), BackendError>;

    /// Scale `source` to fit the bounding box, encode to `params.output`.
    fn render_fit(&self, source: &RgbImage, params: &FitParams) -> Result<(), BackendError>;
}
