//! High-level image operations.
//!
//! These functions combine calculations with backend execution. They take
//! configuration, compute parameters, and call the backend.
//!
//! One ingested image fans out into every configured rendition plus the
//! management thumbnail. The source is decoded once by the caller and
//! flattened onto white once here; each output is then an independent job on
//! the rayon pool. Either every planned file exists when
//! [`create_renditions`] returns `Ok`, or none of them do.

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::compose;
use super::params::{CanvasParams, FitParams, OutputFormat, Quality, WHITE};
use crate::config::{StoreConfig, THUMB_RENDITION};
use crate::layout::{self, StorageLayout};
use image::{DynamicImage, RgbImage};
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// Get image dimensions using the backend.
pub fn get_dimensions(backend: &impl ImageBackend, path: &Path) -> Result<Dimensions> {
    backend.identify(path)
}

/// Sizes and encoder settings for one ingestion.
#[derive(Debug, Clone, PartialEq)]
pub struct RenditionConfig {
    /// Fixed-canvas renditions: name → (width, height).
    pub sizes: BTreeMap<String, (u32, u32)>,
    pub quality: Quality,
    pub thumbnail_size: (u32, u32),
    pub thumbnail_quality: Quality,
}

impl From<&StoreConfig> for RenditionConfig {
    fn from(config: &StoreConfig) -> Self {
        Self {
            sizes: config
                .renditions
                .iter()
                .map(|(name, [w, h])| (name.clone(), (*w, *h)))
                .collect(),
            quality: Quality::new(config.images.quality),
            thumbnail_size: (
                config.images.thumbnail_size[0],
                config.images.thumbnail_size[1],
            ),
            thumbnail_quality: Quality::new(config.images.thumbnail_quality),
        }
    }
}

impl Default for RenditionConfig {
    fn default() -> Self {
        Self::from(&StoreConfig::default())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RenditionKind {
    Canvas(CanvasParams),
    Fit(FitParams),
}

/// One output file to produce, with its catalog path.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedRendition {
    pub name: String,
    /// Path relative to the storage root, as recorded in the catalog.
    pub relative: PathBuf,
    pub kind: RenditionKind,
}

impl PlannedRendition {
    /// Absolute output path.
    pub fn output(&self) -> &Path {
        match &self.kind {
            RenditionKind::Canvas(p) => &p.output,
            RenditionKind::Fit(p) => &p.output,
        }
    }
}

/// Plan every output for one image without executing anything.
///
/// Configured sizes come first in name order, the thumbnail last.
pub fn plan_renditions(
    layout: &StorageLayout,
    id: &str,
    extension: &str,
    config: &RenditionConfig,
) -> Vec<PlannedRendition> {
    let format = OutputFormat::for_extension(extension);

    let mut plans: Vec<PlannedRendition> = config
        .sizes
        .iter()
        .map(|(name, &(width, height))| {
            let relative = StorageLayout::rendition_rel(id, name, extension);
            PlannedRendition {
                name: name.clone(),
                kind: RenditionKind::Canvas(CanvasParams {
                    output: layout.resolve(&relative),
                    width,
                    height,
                    format,
                    quality: config.quality,
                    background: WHITE,
                }),
                relative,
            }
        })
        .collect();

    let relative = StorageLayout::thumbnail_rel(id, extension);
    plans.push(PlannedRendition {
        name: THUMB_RENDITION.to_string(),
        kind: RenditionKind::Fit(FitParams {
            output: layout.resolve(&relative),
            max_width: config.thumbnail_size.0,
            max_height: config.thumbnail_size.1,
            format,
            quality: config.thumbnail_quality,
        }),
        relative,
    });
    plans
}

fn render(backend: &impl ImageBackend, source: &RgbImage, plan: &PlannedRendition) -> Result<()> {
    match &plan.kind {
        RenditionKind::Canvas(params) => backend.render_canvas(source, params)?,
        RenditionKind::Fit(params) => backend.render_fit(source, params)?,
    }
    debug!(rendition = %plan.name, path = %plan.output().display(), "rendition written");
    Ok(())
}

/// Remove every planned output that exists. Failures are logged, not returned.
pub fn remove_planned(plans: &[PlannedRendition]) {
    for plan in plans {
        if let Err(e) = layout::remove_if_exists(plan.output()) {
            warn!(path = %plan.output().display(), error = %e, "rollback could not remove rendition");
        }
    }
}

/// Produce every rendition of `source` for media `id`.
///
/// Returns rendition name → relative path, including the thumbnail under
/// `"thumb"`. If any single output fails, all outputs of this call are
/// removed before the first error is returned.
pub fn create_renditions(
    backend: &impl ImageBackend,
    pool: &rayon::ThreadPool,
    layout: &StorageLayout,
    id: &str,
    extension: &str,
    source: &DynamicImage,
    config: &RenditionConfig,
) -> Result<BTreeMap<String, PathBuf>> {
    let flat = compose::flatten_onto(source, WHITE);
    let plans = plan_renditions(layout, id, extension, config);

    // Every job runs to completion so the rollback below sees the final disk state.
    let results: Vec<Result<()>> =
        pool.install(|| plans.par_iter().map(|p| render(backend, &flat, p)).collect());

    if let Some(err) = results.into_iter().find_map(|r| r.err()) {
        remove_planned(&plans);
        return Err(err);
    }

    Ok(plans
        .into_iter()
        .map(|plan| (plan.name, plan.relative))
        .collect())
}
