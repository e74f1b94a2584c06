//! Reconciling the catalog against the file tree.
//!
//! [`collect_orphans`] is a mark-and-sweep: the mark set is every file named
//! by any record, the sweep walks the storage root and removes everything
//! else. The catalog file (and its staging temp file) is never swept.
//!
//! [`validate_integrity`] goes the other direction, reporting record paths
//! that have no file behind them. Neither function touches the catalog.

use crate::layout::StorageLayout;
use crate::store::{self, Records};
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use walkdir::WalkDir;

/// A file that could not be removed during delete or orphan collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovalFailure {
    pub path: PathBuf,
    pub reason: String,
}

impl fmt::Display for RemovalFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.reason)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GcReport {
    /// Orphans removed, in walk order.
    pub removed: Vec<PathBuf>,
    pub failures: Vec<RemovalFailure>,
}

impl GcReport {
    pub fn removed_count(&self) -> usize {
        self.removed.len()
    }
}

impl fmt::Display for GcReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Removed {} orphan file(s)", self.removed.len())?;
        if !self.failures.is_empty() {
            write!(f, ", {} could not be removed", self.failures.len())?;
        }
        Ok(())
    }
}

/// A record path with no file behind it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntegrityIssue {
    pub id: String,
    /// `"original"`, `"audio"`, or a rendition name.
    pub label: String,
    pub path: PathBuf,
}

impl fmt::Display for IntegrityIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Missing {} file for {}: {}",
            self.label,
            self.id,
            self.path.display()
        )
    }
}

/// Comparable form of a file path: canonical parent directory plus file name.
///
/// The file itself is not resolved, so a symlink is compared as the link and
/// not its target. Paths whose parent does not exist are returned as given.
fn file_key(path: &Path) -> PathBuf {
    match (path.parent(), path.file_name()) {
        (Some(parent), Some(name)) => match std::fs::canonicalize(parent) {
            Ok(dir) => dir.join(name),
            Err(_) => path.to_path_buf(),
        },
        _ => path.to_path_buf(),
    }
}

/// The mark set: every path named by any record, in [`file_key`] form.
pub fn referenced_paths(layout: &StorageLayout, records: &Records) -> HashSet<PathBuf> {
    records
        .values()
        .flat_map(|record| record.named_paths())
        .map(|(_, stored)| file_key(&layout.resolve(stored)))
        .collect()
}

/// Remove every file under the storage root that no record names.
pub fn collect_orphans(layout: &StorageLayout, records: &Records) -> GcReport {
    let mut report = GcReport::default();
    // Walk from the canonical root so walked paths compare equal to marks.
    let root = match std::fs::canonicalize(layout.root()) {
        Ok(root) => root,
        Err(e) => {
            warn!(
                root = %layout.root().display(),
                error = %e,
                "storage root unreadable, nothing swept"
            );
            return report;
        }
    };
    let marked = referenced_paths(layout, records);
    let catalog = file_key(&layout.catalog_path());
    let staging = file_key(&store::temp_path(&layout.catalog_path()));
    let keep = |path: &Path| path == catalog || path == staging || marked.contains(path);

    let entries = WalkDir::new(&root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(e) => Some(e),
            Err(e) => {
                warn!(error = %e, "skipping unreadable entry during orphan sweep");
                None
            }
        });

    for entry in entries {
        if !entry.file_type().is_file() || keep(entry.path()) {
            continue;
        }
        // Report in the layout's own form rather than the canonical one.
        let path = match entry.path().strip_prefix(&root) {
            Ok(rel) => layout.root().join(rel),
            Err(_) => entry.path().to_path_buf(),
        };
        match std::fs::remove_file(entry.path()) {
            Ok(()) => report.removed.push(path),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "could not remove orphan");
                report.failures.push(RemovalFailure {
                    path,
                    reason: e.to_string(),
                });
            }
        }
    }

    info!(
        removed = report.removed.len(),
        failures = report.failures.len(),
        "orphan collection finished"
    );
    report
}

/// Report every record path whose file is missing. Sorted by id.
pub fn validate_integrity(layout: &StorageLayout, records: &Records) -> Vec<IntegrityIssue> {
    let mut ids: Vec<&String> = records.keys().collect();
    ids.sort();

    let mut issues = Vec::new();
    for id in ids {
        let record = &records[id];
        for (label, stored) in record.named_paths() {
            let path = layout.resolve(stored);
            if !path.is_file() {
                issues.push(IntegrityIssue {
                    id: id.clone(),
                    label: label.to_string(),
                    path,
                });
            }
        }
    }
    issues
}
