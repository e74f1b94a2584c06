//! Shared test utilities for the media-catalog test suite.
//!
//! Synthetic fixtures are built with the `image` encoders at test time, so no
//! binary files live in the repository.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = TempDir::new().unwrap();
//! let src = tmp.path().join("photo.jpg");
//! create_test_jpeg(&src, 1600, 900);
//!
//! let mut catalog = mock_catalog(tmp.path(), MockBackend::with_dimensions(1600, 900));
//! let id = catalog.add_image(&src, None).unwrap();
//! ```

use std::path::{Path, PathBuf};

use chrono::Utc;
use image::{ExtendedColorType, ImageEncoder, RgbImage, RgbaImage};

use crate::catalog::MediaCatalog;
use crate::config::StoreConfig;
use crate::imaging::backend::tests::MockBackend;
use crate::layout::StorageLayout;
use crate::types::{Dimensions, MediaPayload, MediaRecord};

// =========================================================================
// Image fixtures
// =========================================================================

/// Write a small valid JPEG with a gradient so it isn't trivially uniform.
pub fn create_test_jpeg(path: &Path, width: u32, height: u32) {
    let img = RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    let file = std::fs::File::create(path).unwrap();
    let writer = std::io::BufWriter::new(file);
    image::codecs::jpeg::JpegEncoder::new(writer)
        .write_image(img.as_raw(), width, height, ExtendedColorType::Rgb8)
        .unwrap();
}

/// Write an RGBA PNG filled with a single color, alpha included.
pub fn create_test_png_rgba(path: &Path, width: u32, height: u32, color: [u8; 4]) {
    let img = RgbaImage::from_pixel(width, height, image::Rgba(color));
    let file = std::fs::File::create(path).unwrap();
    let writer = std::io::BufWriter::new(file);
    image::codecs::png::PngEncoder::new(writer)
        .write_image(img.as_raw(), width, height, ExtendedColorType::Rgba8)
        .unwrap();
}

/// Write `len` bytes of filler. Content is irrelevant to the mock backend.
pub fn create_sized_file(path: &Path, len: usize) -> PathBuf {
    std::fs::write(path, vec![0x5a; len]).unwrap();
    path.to_path_buf()
}

// =========================================================================
// Records
// =========================================================================

/// A `.jpg` image record naming its original and a `tile` rendition.
///
/// No files are written.
pub fn sample_image_record(id: &str) -> MediaRecord {
    MediaRecord {
        id: id.to_string(),
        original_filename: "a.jpg".into(),
        sanitized_filename: "a.jpg".into(),
        description: None,
        uploaded_at: Utc::now(),
        file_size_bytes: 1,
        extension: ".jpg".into(),
        original_path: StorageLayout::original_rel(id, ".jpg"),
        payload: MediaPayload::Image {
            rendition_paths: [(
                "tile".to_string(),
                StorageLayout::rendition_rel(id, "tile", ".jpg"),
            )]
            .into(),
            dimensions: Dimensions::new(10, 10),
        },
    }
}

// =========================================================================
// Catalog setup
// =========================================================================

/// Open a catalog under `base` with stock config and a mock backend.
pub fn mock_catalog(base: &Path, backend: MockBackend) -> MediaCatalog<MockBackend> {
    MediaCatalog::with_backend(base, StoreConfig::default(), backend).unwrap()
}

/// All regular files under `dir`, relative to it, sorted.
pub fn files_under(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| e.path().strip_prefix(dir).unwrap().to_path_buf())
        .collect();
    files.sort();
    files
}
