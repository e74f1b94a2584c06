//! Catalog data model.
//!
//! A [`MediaRecord`] is the single source of truth for one stored asset. The
//! type-specific half of a record lives in [`MediaPayload`], so "an image has
//! renditions and dimensions, audio has an audio path" is enforced by the type
//! system rather than by convention. On disk the payload is flattened into the
//! record with a `"type"` tag:
//!
//! ```json
//! {
//!   "id": "5d0c…",
//!   "type": "image",
//!   "original_filename": "Team Photo.JPG",
//!   "sanitized_filename": "Team_Photo.JPG",
//!   "uploaded_at": "2026-10-19T09:12:44Z",
//!   "file_size_bytes": 48213,
//!   "extension": ".jpg",
//!   "original_path": "images/5d0c…_original.jpg",
//!   "rendition_paths": { "tile": "images/tile/5d0c…_tile.jpg", "thumb": "thumbnails/5d0c…_thumb.jpg" },
//!   "dimensions": { "width": 1600, "height": 900 }
//! }
//! ```
//!
//! Stored paths are relative to the uploads root; [`crate::layout::StorageLayout`]
//! resolves them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Pixel dimensions of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn as_tuple(self) -> (u32, u32) {
        (self.width, self.height)
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Image,
    Audio,
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaType::Image => f.write_str("image"),
            MediaType::Audio => f.write_str("audio"),
        }
    }
}

/// Type-specific part of a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MediaPayload {
    Image {
        /// Rendition name → stored file (relative to the uploads root).
        rendition_paths: BTreeMap<String, PathBuf>,
        /// Dimensions of the original upload.
        dimensions: Dimensions,
    },
    Audio {
        audio_path: PathBuf,
    },
}

/// One stored asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaRecord {
    pub id: String,
    /// Name as supplied by the user, for display.
    pub original_filename: String,
    /// Filesystem-safe display name. Never used to build storage paths.
    pub sanitized_filename: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub uploaded_at: DateTime<Utc>,
    pub file_size_bytes: u64,
    /// Lower-cased, with leading dot (`".jpg"`).
    pub extension: String,
    pub original_path: PathBuf,
    #[serde(flatten)]
    pub payload: MediaPayload,
}

impl MediaRecord {
    pub fn media_type(&self) -> MediaType {
        match self.payload {
            MediaPayload::Image { .. } => MediaType::Image,
            MediaPayload::Audio { .. } => MediaType::Audio,
        }
    }

    pub fn dimensions(&self) -> Option<Dimensions> {
        match &self.payload {
            MediaPayload::Image { dimensions, .. } => Some(*dimensions),
            MediaPayload::Audio { .. } => None,
        }
    }

    /// Every file this record names, labelled for diagnostics.
    ///
    /// The original comes first, then renditions in name order. Audio records
    /// name their file once even though `original_path` aliases `audio_path`.
    pub fn named_paths(&self) -> Vec<(&str, &Path)> {
        let mut paths: Vec<(&str, &Path)> = Vec::new();
        match &self.payload {
            MediaPayload::Image {
                rendition_paths, ..
            } => {
                paths.push(("original", self.original_path.as_path()));
                paths.extend(
                    rendition_paths
                        .iter()
                        .map(|(name, path)| (name.as_str(), path.as_path())),
                );
            }
            MediaPayload::Audio { audio_path } => {
                if self.original_path != *audio_path {
                    paths.push(("original", self.original_path.as_path()));
                }
                paths.push(("audio", audio_path.as_path()));
            }
        }
        paths.retain(|(_, p)| !p.as_os_str().is_empty());
        paths
    }
}

/// A weak, by-id pointer held by consumers (e.g. a quiz question).
///
/// The catalog keeps no back-index of these; deleting a record leaves them
/// dangling and consumers must treat a failed lookup as a normal outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaReference {
    pub media_id: String,
    pub media_type: MediaType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
}

impl MediaReference {
    pub fn from_record(record: &MediaRecord) -> Self {
        Self {
            media_id: record.id.clone(),
            media_type: record.media_type(),
            filename: Some(record.original_filename.clone()),
        }
    }
}

/// Aggregate counts over the catalog. Derived on demand, never cached.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StorageStats {
    pub total_items: usize,
    pub images: usize,
    pub audio: usize,
    pub total_bytes: u64,
}

impl StorageStats {
    pub fn record(&mut self, record: &MediaRecord) {
        self.total_items += 1;
        match record.media_type() {
            MediaType::Image => self.images += 1,
            MediaType::Audio => self.audio += 1,
        }
        self.total_bytes += record.file_size_bytes;
    }
}

impl fmt::Display for StorageStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} items ({} images, {} audio), {} bytes",
            self.total_items, self.images, self.audio, self.total_bytes
        )
    }
}
