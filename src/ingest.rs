//! Ingestion pipeline.
//!
//! Turns a file on disk into a [`MediaRecord`] whose files all exist. The
//! caller decides whether to commit the record; nothing here touches the
//! catalog.
//!
//! ## Image steps
//!
//! 1. Check the file exists and its extension is configured.
//! 2. Decode it fully. Unreadable content is a validation error, raised
//!    before anything is written.
//! 3. Pick an unused id, copy the upload to `images/<id>_original<ext>`.
//! 4. Render every rendition from the decoded image.
//! 5. Read the stored original's dimensions and size.
//!
//! Any failure from step 3 on removes every file the attempt wrote.
//!
//! Audio is checked by extension only and copied to `audio/<id><ext>`.

use crate::catalog::MediaError;
use crate::config::StoreConfig;
use crate::imaging::operations::{self, RenditionConfig};
use crate::imaging::{Dimensions, ImageBackend};
use crate::layout::{self, StorageLayout};
use crate::naming;
use crate::store::Records;
use crate::types::{MediaPayload, MediaRecord, MediaType};
use chrono::Utc;
use image::DynamicImage;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Everything ingestion needs, borrowed from the catalog.
pub struct Ingestor<'a, B: ImageBackend> {
    pub backend: &'a B,
    pub pool: &'a rayon::ThreadPool,
    pub layout: &'a StorageLayout,
    pub config: &'a StoreConfig,
}

impl<B: ImageBackend> Ingestor<'_, B> {
    /// Ingest an image. `taken` holds the ids already in use.
    pub fn image(
        &self,
        taken: &Records,
        source: &Path,
        description: Option<String>,
    ) -> Result<MediaRecord, MediaError> {
        let extension = check_source(source, &self.config.images.extensions, MediaType::Image)?;
        let decoded = self.backend.decode(source).map_err(|e| {
            MediaError::Validation(format!("{} is not a readable image: {e}", source.display()))
        })?;

        let id = fresh_id(taken);
        let original_path = StorageLayout::original_rel(&id, &extension);
        let original = self.layout.resolve(&original_path);
        copy_into_store(source, &original)?;

        let (rendition_paths, dimensions, file_size_bytes) =
            match self.derive(&id, &extension, &decoded, &original) {
                Ok(derived) => derived,
                Err(e) => {
                    discard(&original);
                    return Err(e);
                }
            };

        info!(
            id = %id,
            source = %source.display(),
            renditions = rendition_paths.len(),
            "image ingested"
        );
        Ok(MediaRecord {
            id,
            original_filename: display_name(source),
            sanitized_filename: naming::sanitize_filename(&display_name(source)),
            description,
            uploaded_at: Utc::now(),
            file_size_bytes,
            extension,
            original_path,
            payload: MediaPayload::Image {
                rendition_paths,
                dimensions,
            },
        })
    }

    /// Renditions, then dimensions and size of the stored original.
    ///
    /// Renditions are removed again if the measuring step fails.
    fn derive(
        &self,
        id: &str,
        extension: &str,
        decoded: &DynamicImage,
        original: &Path,
    ) -> Result<(BTreeMap<String, PathBuf>, Dimensions, u64), MediaError> {
        let renditions = operations::create_renditions(
            self.backend,
            self.pool,
            self.layout,
            id,
            extension,
            decoded,
            &RenditionConfig::from(self.config),
        )?;

        let measured = operations::get_dimensions(self.backend, original)
            .map_err(MediaError::from)
            .and_then(|dims| Ok((dims, file_size(original)?)));

        match measured {
            Ok((dims, size)) => Ok((renditions, dims, size)),
            Err(e) => {
                for stored in renditions.values() {
                    discard(&self.layout.resolve(stored));
                }
                Err(e)
            }
        }
    }

    /// Ingest an audio file. No decoding, no renditions.
    pub fn audio(
        &self,
        taken: &Records,
        source: &Path,
        description: Option<String>,
    ) -> Result<MediaRecord, MediaError> {
        let extension = check_source(source, &self.config.audio.extensions, MediaType::Audio)?;

        let id = fresh_id(taken);
        let audio_path = StorageLayout::audio_rel(&id, &extension);
        let stored = self.layout.resolve(&audio_path);
        copy_into_store(source, &stored)?;

        let file_size_bytes = file_size(&stored).inspect_err(|_| discard(&stored))?;

        info!(id = %id, source = %source.display(), "audio ingested");
        Ok(MediaRecord {
            id,
            original_filename: display_name(source),
            sanitized_filename: naming::sanitize_filename(&display_name(source)),
            description,
            uploaded_at: Utc::now(),
            file_size_bytes,
            extension,
            original_path: audio_path.clone(),
            payload: MediaPayload::Audio { audio_path },
        })
    }
}

/// Validate presence and extension; returns the normalized extension.
fn check_source(source: &Path, allowed: &[String], kind: MediaType) -> Result<String, MediaError> {
    if !source.is_file() {
        return Err(MediaError::Validation(format!(
            "{} does not exist or is not a file",
            source.display()
        )));
    }
    naming::normalized_extension(source)
        .filter(|ext| naming::extension_allowed(ext, allowed))
        .ok_or_else(|| {
            MediaError::Validation(format!(
                "unsupported {kind} format: {} (allowed: {})",
                source.display(),
                allowed.join(", ")
            ))
        })
}

/// A random v4 UUID not already present in `taken`.
pub fn fresh_id(taken: &Records) -> String {
    loop {
        let id = uuid::Uuid::new_v4().to_string();
        if !taken.contains_key(&id) {
            return id;
        }
    }
}

fn display_name(source: &Path) -> String {
    source
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn copy_into_store(source: &Path, dest: &Path) -> Result<(), MediaError> {
    std::fs::copy(source, dest).map(|_| ()).map_err(|e| {
        discard(dest);
        MediaError::Io {
            path: dest.to_path_buf(),
            source: e,
        }
    })
}

fn file_size(path: &Path) -> Result<u64, MediaError> {
    std::fs::metadata(path)
        .map(|m| m.len())
        .map_err(|e| MediaError::Io {
            path: path.to_path_buf(),
            source: e,
        })
}

/// Best-effort removal used on rollback paths.
fn discard(path: &Path) {
    if let Err(e) = layout::remove_if_exists(path) {
        warn!(path = %path.display(), error = %e, "rollback could not remove file");
    }
}

/// Remove every file a record names. Used when a finished record cannot be committed.
pub fn discard_record_files(layout: &StorageLayout, record: &MediaRecord) {
    for (_, stored) in record.named_paths() {
        discard(&layout.resolve(stored));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::backend::tests::{MockBackend, RecordedOp};
    use crate::test_helpers::{create_sized_file, files_under, sample_image_record};
    use tempfile::TempDir;

    struct Fixture {
        tmp: TempDir,
        layout: StorageLayout,
        config: StoreConfig,
        pool: rayon::ThreadPool,
    }

    impl Fixture {
        fn new() -> Self {
            let tmp = TempDir::new().unwrap();
            let layout = StorageLayout::under(tmp.path());
            let config = StoreConfig::default();
            layout.ensure(config.rendition_names()).unwrap();
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(2)
                .build()
                .unwrap();
            Self {
                tmp,
                layout,
                config,
                pool,
            }
        }

        fn ingestor<'a>(&'a self, backend: &'a MockBackend) -> Ingestor<'a, MockBackend> {
            Ingestor {
                backend,
                pool: &self.pool,
                layout: &self.layout,
                config: &self.config,
            }
        }

        fn source(&self, name: &str, len: usize) -> PathBuf {
            create_sized_file(&self.tmp.path().join(name), len)
        }

        fn stored_files(&self) -> Vec<PathBuf> {
            files_under(self.layout.root())
        }
    }

    #[test]
    fn image_record_is_complete() {
        let fx = Fixture::new();
        let backend = MockBackend::with_dimensions(1600, 900);
        let src = fx.source("Team Photo.JPG", 1234);

        let record = fx
            .ingestor(&backend)
            .image(&Records::new(), &src, Some("kickoff".into()))
            .unwrap();

        assert_eq!(record.media_type(), MediaType::Image);
        assert_eq!(record.original_filename, "Team Photo.JPG");
        assert_eq!(record.sanitized_filename, "Team_Photo.JPG");
        assert_eq!(record.extension, ".jpg");
        assert_eq!(record.file_size_bytes, 1234);
        assert_eq!(record.dimensions(), Some(Dimensions::new(1600, 900)));
        assert_eq!(record.description.as_deref(), Some("kickoff"));
        assert_eq!(
            record.original_path,
            PathBuf::from(format!("images/{}_original.jpg", record.id))
        );
        // Every named file exists: original + 5 sizes + thumb.
        let named = record.named_paths();
        assert_eq!(named.len(), 7);
        for (label, stored) in named {
            assert!(fx.layout.resolve(stored).is_file(), "{label}");
        }
    }

    #[test]
    fn image_decodes_once_and_identifies_stored_original() {
        let fx = Fixture::new();
        let backend = MockBackend::with_dimensions(10, 10);
        let src = fx.source("a.png", 10);

        let record = fx.ingestor(&backend).image(&Records::new(), &src, None).unwrap();

        let ops = backend.get_operations();
        let decodes: Vec<_> = ops
            .iter()
            .filter(|op| matches!(op, RecordedOp::Decode(_)))
            .collect();
        assert_eq!(decodes, [&RecordedOp::Decode(src.to_string_lossy().to_string())]);
        let original = fx.layout.resolve(&record.original_path);
        assert!(ops.contains(&RecordedOp::Identify(
            original.to_string_lossy().to_string()
        )));
    }

    #[test]
    fn missing_source_is_validation_error() {
        let fx = Fixture::new();
        let backend = MockBackend::with_dimensions(10, 10);
        let result = fx.ingestor(&backend).image(
            &Records::new(),
            &fx.tmp.path().join("nope.jpg"),
            None,
        );
        assert!(matches!(result, Err(MediaError::Validation(_))));
    }

    #[test]
    fn unsupported_extension_is_rejected_before_decode() {
        let fx = Fixture::new();
        let backend = MockBackend::with_dimensions(10, 10);
        let src = fx.source("vector.svg", 10);

        let result = fx.ingestor(&backend).image(&Records::new(), &src, None);
        assert!(matches!(result, Err(MediaError::Validation(msg)) if msg.contains("unsupported image")));
        assert!(backend.get_operations().is_empty());
    }

    #[test]
    fn undecodable_image_leaves_store_untouched() {
        let fx = Fixture::new();
        let backend = MockBackend::with_dimensions(10, 10).rejecting_decode();
        let src = fx.source("broken.jpg", 10);

        let result = fx.ingestor(&backend).image(&Records::new(), &src, None);
        assert!(matches!(result, Err(MediaError::Validation(_))));
        assert!(fx.stored_files().is_empty());
    }

    #[test]
    fn rendition_failure_rolls_back_everything() {
        let fx = Fixture::new();
        let backend = MockBackend::with_dimensions(10, 10).failing_on("_question_large");
        let src = fx.source("a.jpg", 10);

        let result = fx.ingestor(&backend).image(&Records::new(), &src, None);
        assert!(matches!(result, Err(MediaError::Rendition(_))));
        assert!(fx.stored_files().is_empty(), "{:?}", fx.stored_files());
    }

    #[test]
    fn identify_failure_rolls_back_renditions() {
        let fx = Fixture::new();
        // No dimensions configured: decode succeeds, identify fails.
        let backend = MockBackend::new();
        let src = fx.source("a.jpg", 10);

        let result = fx.ingestor(&backend).image(&Records::new(), &src, None);
        assert!(matches!(result, Err(MediaError::Rendition(_))));
        assert!(fx.stored_files().is_empty(), "{:?}", fx.stored_files());
    }

    #[test]
    fn audio_is_copied_without_decoding() {
        let fx = Fixture::new();
        let backend = MockBackend::new();
        let src = fx.source("Buzzer Sound.MP3", 500);

        let record = fx.ingestor(&backend).audio(&Records::new(), &src, None).unwrap();

        assert_eq!(record.media_type(), MediaType::Audio);
        assert_eq!(record.extension, ".mp3");
        assert_eq!(record.file_size_bytes, 500);
        assert_eq!(record.dimensions(), None);
        let expected = PathBuf::from(format!("audio/{}.mp3", record.id));
        assert_eq!(record.original_path, expected);
        assert_eq!(
            record.payload,
            MediaPayload::Audio {
                audio_path: expected.clone()
            }
        );
        assert!(fx.layout.resolve(&expected).is_file());
        assert!(backend.get_operations().is_empty());
    }

    #[test]
    fn audio_rejects_image_extension() {
        let fx = Fixture::new();
        let backend = MockBackend::new();
        let src = fx.source("cover.png", 10);
        assert!(matches!(
            fx.ingestor(&backend).audio(&Records::new(), &src, None),
            Err(MediaError::Validation(_))
        ));
    }

    #[test]
    fn fresh_id_is_uuid_and_unused() {
        let mut taken = Records::new();
        for _ in 0..50 {
            let id = fresh_id(&taken);
            assert!(uuid::Uuid::parse_str(&id).is_ok());
            assert!(!taken.contains_key(&id));
            taken.insert(id.clone(), sample_image_record(&id));
        }
    }
}
