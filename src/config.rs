//! Store configuration.
//!
//! Loaded from `media.toml` in the base directory (next to `uploads/`, never
//! inside it, so orphan collection cannot touch it). Stock defaults are the
//! base layer; the user file is merged on top key by key, so a file only needs
//! the values it changes. Unknown keys are rejected to catch typos early.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [renditions]              # name = [width, height]
//! tile = [120, 80]          # game board tiles
//! tile_2x = [240, 160]      # high-DPI tiles
//! question = [400, 300]     # question display
//! question_large = [800, 600]
//! thumbnail = [100, 100]
//!
//! [images]
//! quality = 85              # JPEG quality for renditions (1-100)
//! thumbnail_quality = 80    # JPEG quality for the management thumbnail
//! thumbnail_size = [100, 100]
//! extensions = ["png", "jpg", "jpeg", "gif", "bmp", "webp"]
//!
//! [audio]
//! extensions = ["wav", "mp3", "ogg", "flac", "aac"]
//!
//! [processing]
//! max_processes = 4         # Rendition workers (omit for auto = CPU cores)
//! ```
//!
//! Note that `[renditions]` is a table: overriding it merges with the stock
//! sizes rather than replacing them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Config file name within the base directory.
pub const CONFIG_FILENAME: &str = "media.toml";

/// Rendition name of the stored original upload.
pub const ORIGINAL_RENDITION: &str = "original";

/// Rendition name of the scaled-only management thumbnail.
pub const THUMB_RENDITION: &str = "thumb";

/// Rendition names with a fixed meaning that configured sizes may not shadow.
pub const RESERVED_RENDITIONS: &[&str] = &[ORIGINAL_RENDITION, THUMB_RENDITION];

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    /// Fixed-canvas renditions: name → `[width, height]`.
    pub renditions: BTreeMap<String, [u32; 2]>,
    pub images: ImagesConfig,
    pub audio: AudioConfig,
    pub processing: ProcessingConfig,
}

impl Default for StoreConfig {
    fn default() -> Self {
        let renditions = [
            ("tile", [120, 80]),
            ("tile_2x", [240, 160]),
            ("question", [400, 300]),
            ("question_large", [800, 600]),
            ("thumbnail", [100, 100]),
        ]
        .into_iter()
        .map(|(name, size)| (name.to_string(), size))
        .collect();
        Self {
            renditions,
            images: ImagesConfig::default(),
            audio: AudioConfig::default(),
            processing: ProcessingConfig::default(),
        }
    }
}

impl StoreConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.renditions.is_empty() {
            return Err(ConfigError::Validation(
                "renditions must not be empty".into(),
            ));
        }
        for (name, [w, h]) in &self.renditions {
            if name.is_empty()
                || !name
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
            {
                return Err(ConfigError::Validation(format!(
                    "rendition name '{name}' may only contain letters, digits, '_' and '-'"
                )));
            }
            if RESERVED_RENDITIONS.contains(&name.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "rendition name '{name}' is reserved"
                )));
            }
            if *w == 0 || *h == 0 {
                return Err(ConfigError::Validation(format!(
                    "renditions.{name} dimensions must be non-zero"
                )));
            }
        }
        for (key, q) in [
            ("images.quality", self.images.quality),
            ("images.thumbnail_quality", self.images.thumbnail_quality),
        ] {
            if !(1..=100).contains(&q) {
                return Err(ConfigError::Validation(format!("{key} must be 1-100")));
            }
        }
        if self.images.thumbnail_size[0] == 0 || self.images.thumbnail_size[1] == 0 {
            return Err(ConfigError::Validation(
                "images.thumbnail_size values must be non-zero".into(),
            ));
        }
        if self.images.extensions.is_empty() {
            return Err(ConfigError::Validation(
                "images.extensions must not be empty".into(),
            ));
        }
        let decodable = crate::imaging::supported_input_extensions();
        if let Some(ext) = self.images.extensions.iter().find(|ext| {
            let ext = ext.trim_start_matches('.');
            !decodable.iter().any(|d| d.eq_ignore_ascii_case(ext))
        }) {
            return Err(ConfigError::Validation(format!(
                "images.extensions: no decoder for '{ext}' (supported: {})",
                decodable.join(", ")
            )));
        }
        if self.audio.extensions.is_empty() {
            return Err(ConfigError::Validation(
                "audio.extensions must not be empty".into(),
            ));
        }
        Ok(())
    }

    pub fn rendition_names(&self) -> impl Iterator<Item = &str> {
        self.renditions.keys().map(String::as_str)
    }
}

/// Image ingestion settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImagesConfig {
    /// JPEG quality for fixed-canvas renditions.
    pub quality: u32,
    /// JPEG quality for the scaled-only management thumbnail.
    pub thumbnail_quality: u32,
    /// Bounding box of the management thumbnail.
    pub thumbnail_size: [u32; 2],
    /// Accepted upload extensions, without dot.
    pub extensions: Vec<String>,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            quality: 85,
            thumbnail_quality: 80,
            thumbnail_size: [100, 100],
            extensions: ["png", "jpg", "jpeg", "gif", "bmp", "webp"]
                .map(String::from)
                .to_vec(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AudioConfig {
    /// Accepted upload extensions, without dot.
    pub extensions: Vec<String>,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            extensions: ["wav", "mp3", "ogg", "flac", "aac"]
                .map(String::from)
                .to_vec(),
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel rendition workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)`, at least 1
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Stock defaults as a `toml::Value::Table`, the base layer for merging.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(StoreConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `media.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = dir.join(CONFIG_FILENAME);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<StoreConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: StoreConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `media.toml` in `dir`, falling back to stock defaults.
pub fn load_config(dir: &Path) -> Result<StoreConfig, ConfigError> {
    resolve_config(stock_defaults_value(), load_raw_config(dir)?)
}

/// A fully-commented stock `media.toml`. Used by the `gen-config` command.
pub fn stock_config_toml() -> &'static str {
    r##"# Media Catalog Configuration
# ===========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys are an error.
#
# Place this file next to the uploads/ directory, e.g. ./media.toml

# ---------------------------------------------------------------------------
# Renditions
# ---------------------------------------------------------------------------
# Every ingested image is fitted (never upscaled) into each box below and
# centered on a white canvas of exactly that size. Names become folders
# under uploads/images/. "original" and "thumb" are reserved.
[renditions]
tile = [120, 80]
tile_2x = [240, 160]
question = [400, 300]
question_large = [800, 600]
thumbnail = [100, 100]

# ---------------------------------------------------------------------------
# Images
# ---------------------------------------------------------------------------
[images]
# JPEG quality for renditions (1-100). PNG output is always lossless.
quality = 85

# JPEG quality for the management thumbnail (uploads/thumbnails/).
thumbnail_quality = 80

# Bounding box of the management thumbnail. Aspect ratio is preserved.
thumbnail_size = [100, 100]

# Accepted upload extensions.
extensions = ["png", "jpg", "jpeg", "gif", "bmp", "webp"]

# ---------------------------------------------------------------------------
# Audio
# ---------------------------------------------------------------------------
[audio]
# Accepted upload extensions. Audio is stored as-is, never transcoded.
extensions = ["wav", "mp3", "ogg", "flac", "aac"]

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel rendition workers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}
