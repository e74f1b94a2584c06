//! On-disk layout of the media store.
//!
//! ```text
//! <base>/
//! ├── media.toml                         # optional config (outside the store)
//! └── uploads/                           # storage root
//!     ├── media_database.json            # the catalog
//!     ├── images/
//!     │   ├── <id>_original<ext>
//!     │   ├── tile/<id>_tile<ext>        # one folder per configured rendition
//!     │   └── thumbnail/<id>_thumbnail<ext>
//!     ├── thumbnails/<id>_thumb<ext>     # scaled-only management thumbnail
//!     └── audio/<id><ext>
//! ```
//!
//! The layout is fixed; only the set of rendition folders depends on config.
//! Records store paths relative to the storage root so a store can be moved
//! as a whole.

use crate::naming;
use std::io;
use std::path::{Path, PathBuf};

pub const UPLOADS_DIR: &str = "uploads";
pub const CATALOG_FILENAME: &str = "media_database.json";
pub const IMAGES_DIR: &str = "images";
pub const THUMBNAILS_DIR: &str = "thumbnails";
pub const AUDIO_DIR: &str = "audio";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageLayout {
    root: PathBuf,
}

impl StorageLayout {
    /// Layout rooted at `<base>/uploads`.
    pub fn under(base: &Path) -> Self {
        Self::at(base.join(UPLOADS_DIR))
    }

    /// Layout rooted directly at `root`, made absolute against the current
    /// directory so stored and walked paths share one form.
    pub fn at(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let root = std::path::absolute(&root).unwrap_or(root);
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn catalog_path(&self) -> PathBuf {
        self.root.join(CATALOG_FILENAME)
    }

    pub fn images_dir(&self) -> PathBuf {
        self.root.join(IMAGES_DIR)
    }

    pub fn rendition_dir(&self, rendition: &str) -> PathBuf {
        self.images_dir().join(rendition)
    }

    pub fn thumbnails_dir(&self) -> PathBuf {
        self.root.join(THUMBNAILS_DIR)
    }

    pub fn audio_dir(&self) -> PathBuf {
        self.root.join(AUDIO_DIR)
    }

    /// Create the directory skeleton. Idempotent; safe on every startup.
    pub fn ensure<'a>(&self, renditions: impl IntoIterator<Item = &'a str>) -> io::Result<()> {
        std::fs::create_dir_all(&self.root)?;
        std::fs::create_dir_all(self.images_dir())?;
        std::fs::create_dir_all(self.thumbnails_dir())?;
        std::fs::create_dir_all(self.audio_dir())?;
        for name in renditions {
            std::fs::create_dir_all(self.rendition_dir(name))?;
        }
        Ok(())
    }

    // Relative storage paths, as recorded in the catalog.

    pub fn original_rel(id: &str, extension: &str) -> PathBuf {
        Path::new(IMAGES_DIR).join(naming::original_file_name(id, extension))
    }

    pub fn rendition_rel(id: &str, rendition: &str, extension: &str) -> PathBuf {
        Path::new(IMAGES_DIR)
            .join(rendition)
            .join(naming::rendition_file_name(id, rendition, extension))
    }

    pub fn thumbnail_rel(id: &str, extension: &str) -> PathBuf {
        Path::new(THUMBNAILS_DIR).join(naming::thumbnail_file_name(id, extension))
    }

    pub fn audio_rel(id: &str, extension: &str) -> PathBuf {
        Path::new(AUDIO_DIR).join(naming::audio_file_name(id, extension))
    }

    /// Resolve a recorded path against the storage root.
    ///
    /// Absolute paths are returned unchanged.
    pub fn resolve(&self, stored: &Path) -> PathBuf {
        if stored.is_absolute() {
            stored.to_path_buf()
        } else {
            self.root.join(stored)
        }
    }
}

/// Remove a file, treating "already gone" as success.
///
/// Returns whether a file was actually removed.
pub fn remove_if_exists(path: &Path) -> io::Result<bool> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}
