//! # Media Catalog
//!
//! A local media-asset store. Images and audio files are copied into a
//! fixed directory tree and referenced by an opaque id; every image is
//! rendered once into each configured size so consumers never resize on read.
//!
//! # Architecture
//!
//! ```text
//! add_image(path)
//!   → ingest      validate, decode once, copy original
//!   → imaging     flatten onto white, fan out one job per rendition
//!   → store       insert record, rewrite media_database.json
//!   ← id
//! ```
//!
//! Consumers keep only a [`types::MediaReference`] (id, type, filename) and
//! ask the catalog for a path when they need one. The catalog keeps no index
//! of who refers to what, so a deleted id simply stops resolving.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`catalog`] | The service façade: add, get, path lookup, delete, list, stats, gc, check |
//! | [`ingest`] | Validation, id assignment, copy, rendition fan-out, total rollback |
//! | [`imaging`] | Pure-Rust fit-and-center renditions behind the [`imaging::ImageBackend`] trait |
//! | [`gc`] | Orphan mark-and-sweep and integrity checking |
//! | [`store`] | Whole-file JSON persistence of the record map |
//! | [`layout`] | The fixed on-disk directory tree and relative storage paths |
//! | [`config`] | `media.toml` loading, merging over stock defaults, validation |
//! | [`types`] | Records, references, dimensions, stats |
//! | [`naming`] | Display-name sanitization and id-derived storage names |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Identical Rendition Dimensions
//!
//! Every configured rendition is exactly its configured size regardless of the
//! source aspect ratio: the image is scaled down to fit, never up, and centered
//! on a white canvas. Grid layouts downstream can rely on it.
//!
//! ## All or Nothing Ingestion
//!
//! A record is only inserted once every file it names exists. If any rendition
//! fails, every file the attempt wrote is removed again, including renditions
//! that had already succeeded.
//!
//! ## Storage Names Come From the Id
//!
//! User filenames are sanitized for display and nothing else. Storage paths
//! are built from the generated id, a role suffix and the normalized
//! extension, so a hostile filename cannot reach outside the tree.
//!
//! ## Single Writer
//!
//! The catalog is one JSON file, rewritten on every mutation through a temp
//! file and rename. There is no locking; one process owns a store at a time.

pub mod catalog;
pub mod config;
pub mod gc;
pub mod imaging;
pub mod ingest;
pub mod layout;
pub mod naming;
pub mod output;
pub mod store;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
