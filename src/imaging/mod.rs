//! Image processing, pure Rust.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode / validate** | `image::ImageReader` with content sniffing |
//! | **Identify** | header-only dimension read |
//! | **Flatten** | alpha composite onto white ([`compose::flatten_onto`]) |
//! | **Canvas rendition** | Lanczos3 fit + centered paste on a fixed canvas |
//! | **Thumbnail** | Lanczos3 fit, aspect ratio kept |
//! | **Encode** | JPEG (quality) or PNG (best compression) by original extension |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Compose**: In-memory pixel work shared by every backend
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: Rendition planning and fan-out with total rollback

pub mod backend;
mod calculations;
pub mod compose;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend};
pub use calculations::{calculate_center_offset, calculate_fit_dimensions};
pub use operations::{
    PlannedRendition, RenditionConfig, RenditionKind, create_renditions, get_dimensions,
    plan_renditions,
};
pub use params::{CanvasParams, FitParams, OutputFormat, Quality, WHITE};
pub use rust_backend::{RustBackend, supported_input_extensions};
