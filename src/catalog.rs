//! The catalog service.
//!
//! [`MediaCatalog`] owns the in-memory record map and is the only thing that
//! writes the catalog file. Every mutation rewrites the file before it
//! returns; reads never touch it.
//!
//! Read operations treat "not there" as a value: [`MediaCatalog::get_record`],
//! [`MediaCatalog::rendition_path`] and [`MediaCatalog::audio_path`] return
//! `Option`. Path lookups also check the file still exists, so a consumer is
//! never handed a path to a file that has gone missing since ingestion.
//!
//! ```no_run
//! use media_catalog::catalog::MediaCatalog;
//! use std::path::Path;
//!
//! let mut catalog = MediaCatalog::open(Path::new("."))?;
//! let id = catalog.add_image(Path::new("board.png"), None)?;
//! if let Some(tile) = catalog.rendition_path(&id, "tile") {
//!     println!("{}", tile.display());
//! }
//! # Ok::<(), media_catalog::catalog::MediaError>(())
//! ```

use crate::config::{self, ConfigError, ORIGINAL_RENDITION, StoreConfig};
use crate::gc::{self, GcReport, IntegrityIssue, RemovalFailure};
use crate::imaging::{BackendError, ImageBackend, RustBackend};
use crate::ingest::{self, Ingestor};
use crate::layout::{self, StorageLayout};
use crate::store::{self, Records, StoreError};
use crate::types::{MediaPayload, MediaRecord, MediaType, StorageStats};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum MediaError {
    #[error("{0}")]
    Validation(String),
    #[error("media not found: {0}")]
    NotFound(String),
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("catalog {path} is corrupt: {source}")]
    CatalogCorrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to serialize catalog: {0}")]
    Serialize(serde_json::Error),
    #[error("rendition failed: {0}")]
    Rendition(#[from] BackendError),
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("could not start rendition workers: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl From<StoreError> for MediaError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Io { path, source } => MediaError::Io { path, source },
            StoreError::Corrupt { path, source } => MediaError::CatalogCorrupt { path, source },
            StoreError::Serialize(e) => MediaError::Serialize(e),
        }
    }
}

/// Result of [`MediaCatalog::delete`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The record is gone. `failures` lists files that could not be removed.
    Deleted { failures: Vec<RemovalFailure> },
    /// No record with that id; nothing was touched.
    NotFound,
}

impl DeleteOutcome {
    pub fn was_deleted(&self) -> bool {
        matches!(self, DeleteOutcome::Deleted { .. })
    }
}

pub struct MediaCatalog<B: ImageBackend = RustBackend> {
    layout: StorageLayout,
    config: StoreConfig,
    backend: B,
    pool: rayon::ThreadPool,
    records: Records,
}

impl MediaCatalog<RustBackend> {
    /// Open the store under `base` (`base/uploads`), configured by `base/media.toml`.
    pub fn open(base: &Path) -> Result<Self, MediaError> {
        let config = config::load_config(base)?;
        Self::with_backend(base, config, RustBackend::new())
    }
}

impl<B: ImageBackend> MediaCatalog<B> {
    pub fn with_backend(base: &Path, config: StoreConfig, backend: B) -> Result<Self, MediaError> {
        Self::with_layout(StorageLayout::under(base), config, backend)
    }

    /// Open a store rooted directly at `layout`. Creates the directory
    /// skeleton and loads the catalog.
    pub fn with_layout(
        layout: StorageLayout,
        config: StoreConfig,
        backend: B,
    ) -> Result<Self, MediaError> {
        config.validate()?;
        layout
            .ensure(config.rendition_names())
            .map_err(|source| MediaError::Io {
                path: layout.root().to_path_buf(),
                source,
            })?;
        let records = store::load(&layout.catalog_path())?;
        let threads = config::effective_threads(&config.processing);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()?;

        debug!(
            root = %layout.root().display(),
            records = records.len(),
            threads,
            "catalog opened"
        );
        Ok(Self {
            layout,
            config,
            backend,
            pool,
            records,
        })
    }

    pub fn layout(&self) -> &StorageLayout {
        &self.layout
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn ingestor(&self) -> Ingestor<'_, B> {
        Ingestor {
            backend: &self.backend,
            pool: &self.pool,
            layout: &self.layout,
            config: &self.config,
        }
    }

    fn persist(&self) -> Result<(), MediaError> {
        store::save(&self.layout.catalog_path(), &self.records)?;
        Ok(())
    }

    /// Insert and persist. If the catalog can't be written the record is
    /// dropped again and its files removed.
    fn commit(&mut self, record: MediaRecord) -> Result<String, MediaError> {
        let id = record.id.clone();
        self.records.insert(id.clone(), record);
        if let Err(e) = self.persist() {
            if let Some(record) = self.records.remove(&id) {
                ingest::discard_record_files(&self.layout, &record);
            }
            return Err(e);
        }
        Ok(id)
    }

    /// Ingest an image and all of its renditions. Returns the new id.
    pub fn add_image(
        &mut self,
        source: &Path,
        description: Option<String>,
    ) -> Result<String, MediaError> {
        let record = self.ingestor().image(&self.records, source, description)?;
        self.commit(record)
    }

    /// Ingest an audio file as-is. Returns the new id.
    pub fn add_audio(
        &mut self,
        source: &Path,
        description: Option<String>,
    ) -> Result<String, MediaError> {
        let record = self.ingestor().audio(&self.records, source, description)?;
        self.commit(record)
    }

    pub fn get_record(&self, id: &str) -> Option<&MediaRecord> {
        self.records.get(id)
    }

    /// Absolute path of a rendition, if the record and the file both exist.
    ///
    /// Besides configured sizes, `"original"` names the stored upload and
    /// `"thumb"` the scaled management thumbnail.
    pub fn rendition_path(&self, id: &str, rendition: &str) -> Option<PathBuf> {
        let record = self.records.get(id)?;
        let stored = if rendition == ORIGINAL_RENDITION {
            &record.original_path
        } else {
            match &record.payload {
                MediaPayload::Image {
                    rendition_paths, ..
                } => rendition_paths.get(rendition)?,
                MediaPayload::Audio { .. } => return None,
            }
        };
        self.existing(stored)
    }

    /// Absolute path of a stored audio file, if the record is audio and the file exists.
    pub fn audio_path(&self, id: &str) -> Option<PathBuf> {
        match &self.records.get(id)?.payload {
            MediaPayload::Audio { audio_path } => self.existing(audio_path),
            MediaPayload::Image { .. } => None,
        }
    }

    fn existing(&self, stored: &Path) -> Option<PathBuf> {
        if stored.as_os_str().is_empty() {
            return None;
        }
        let path = self.layout.resolve(stored);
        path.is_file().then_some(path)
    }

    /// Replace the description of a record and persist.
    pub fn update_description(
        &mut self,
        id: &str,
        description: Option<String>,
    ) -> Result<(), MediaError> {
        let record = self
            .records
            .get_mut(id)
            .ok_or_else(|| MediaError::NotFound(id.to_string()))?;
        let previous = std::mem::replace(&mut record.description, description);
        if let Err(e) = self.persist() {
            if let Some(record) = self.records.get_mut(id) {
                record.description = previous;
            }
            return Err(e);
        }
        Ok(())
    }

    /// Remove a record and every file it names.
    ///
    /// The catalog is persisted without the record first; if that fails the
    /// record stays and no file is touched. File removal is then best-effort:
    /// a missing file is fine, any other error is logged and reported in the
    /// outcome while the rest carries on. An unknown id leaves both disk and
    /// catalog file untouched.
    pub fn delete(&mut self, id: &str) -> Result<DeleteOutcome, MediaError> {
        let Some(record) = self.records.remove(id) else {
            return Ok(DeleteOutcome::NotFound);
        };
        if let Err(e) = self.persist() {
            self.records.insert(id.to_string(), record);
            return Err(e);
        }

        let mut failures = Vec::new();
        for (label, stored) in record.named_paths() {
            let path = self.layout.resolve(stored);
            if let Err(e) = layout::remove_if_exists(&path) {
                warn!(id, file = label, path = %path.display(), error = %e, "could not remove file");
                failures.push(RemovalFailure {
                    path,
                    reason: e.to_string(),
                });
            }
        }

        info!(id, failures = failures.len(), "media deleted");
        Ok(DeleteOutcome::Deleted { failures })
    }

    /// All records, optionally of one type, oldest first.
    pub fn list_all(&self, media_type: Option<MediaType>) -> Vec<&MediaRecord> {
        let mut records: Vec<&MediaRecord> = self
            .records
            .values()
            .filter(|r| media_type.is_none_or(|t| r.media_type() == t))
            .collect();
        records.sort_by(|a, b| {
            a.uploaded_at
                .cmp(&b.uploaded_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        records
    }

    pub fn storage_stats(&self) -> StorageStats {
        let mut stats = StorageStats::default();
        for record in self.records.values() {
            stats.record(record);
        }
        stats
    }

    /// Remove files under the storage root that no record names.
    pub fn collect_orphans(&self) -> GcReport {
        gc::collect_orphans(&self.layout, &self.records)
    }

    /// List record paths whose files are missing. Read-only.
    pub fn validate_integrity(&self) -> Vec<IntegrityIssue> {
        gc::validate_integrity(&self.layout, &self.records)
    }
}
