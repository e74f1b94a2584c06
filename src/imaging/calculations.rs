//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

/// Calculate the largest size that fits inside `bounds` with the source aspect ratio.
///
/// Never upscales: a source that already fits is returned unchanged. Neither
/// output edge is ever zero, and neither exceeds its bound.
///
/// # Arguments
/// * `source` - Original image dimensions (width, height)
/// * `bounds` - Bounding box (width, height)
///
/// # Examples
/// ```
/// # use media_catalog::imaging::calculate_fit_dimensions;
/// // 1600x900 into a 120x80 tile: width-bound, 120x68
/// assert_eq!(calculate_fit_dimensions((1600, 900), (120, 80)), (120, 68));
///
/// // Small sources are left alone
/// assert_eq!(calculate_fit_dimensions((50, 40), (120, 80)), (50, 40));
/// ```
pub fn calculate_fit_dimensions(source: (u32, u32), bounds: (u32, u32)) -> (u32, u32) {
    let (src_w, src_h) = source;
    let (max_w, max_h) = bounds;

    if src_w == 0 || src_h == 0 {
        return (0, 0);
    }
    if src_w <= max_w && src_h <= max_h {
        return source;
    }

    let scale = (max_w as f64 / src_w as f64).min(max_h as f64 / src_h as f64);
    let w = ((src_w as f64 * scale).round() as u32).clamp(1, max_w.max(1));
    let h = ((src_h as f64 * scale).round() as u32).clamp(1, max_h.max(1));
    (w, h)
}

/// Offset that centers `inner` within `outer`.
///
/// Odd remainders round toward the top-left, so a 120x68 image on a 120x80
/// canvas sits at (0, 6) with 6 rows above and 6 below.
pub fn calculate_center_offset(inner: (u32, u32), outer: (u32, u32)) -> (u32, u32) {
    (
        outer.0.saturating_sub(inner.0) / 2,
        outer.1.saturating_sub(inner.1) / 2,
    )
}
