//! Catalog persistence.
//!
//! The whole catalog lives in one pretty-printed JSON object keyed by media
//! id. Loading is permissive about absence (no file = empty catalog) and
//! strict about content: a file that does not parse is reported as
//! [`StoreError::Corrupt`] and never silently replaced, so the caller can
//! decide whether to back it up and start over.
//!
//! Saving rewrites the file wholesale, last writer wins. The JSON is written
//! to a sibling temp file first and renamed over the catalog, so a crash
//! mid-write leaves the previous catalog intact. There is no locking; a
//! single writer per store is assumed.

use crate::types::MediaRecord;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("catalog {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to serialize catalog: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// In-memory catalog: media id → record.
pub type Records = HashMap<String, MediaRecord>;

/// Load the catalog at `path`. A missing file yields an empty catalog.
pub fn load(path: &Path) -> Result<Records, StoreError> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Records::new()),
        Err(source) => {
            return Err(StoreError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    if content.trim().is_empty() {
        return Ok(Records::new());
    }
    serde_json::from_str(&content).map_err(|source| StoreError::Corrupt {
        path: path.to_path_buf(),
        source,
    })
}

/// Serialize all records and replace the catalog file.
pub fn save(path: &Path, records: &Records) -> Result<(), StoreError> {
    // Sorted keys keep the file diff-friendly.
    let ordered: std::collections::BTreeMap<&String, &MediaRecord> = records.iter().collect();
    let json = serde_json::to_string_pretty(&ordered)?;

    let tmp = temp_path(path);
    let io_err = |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    };
    std::fs::write(&tmp, json).map_err(|source| {
        let _ = std::fs::remove_file(&tmp);
        io_err(source)
    })?;
    std::fs::rename(&tmp, path).map_err(|source| {
        let _ = std::fs::remove_file(&tmp);
        io_err(source)
    })
}

/// Sibling path the catalog is staged at before the rename.
pub(crate) fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
