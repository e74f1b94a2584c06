//! Pixel-level composition: alpha flattening, fit-and-center, scale-to-fit.
//!
//! In-memory only; encoding and file I/O live in the backend.

use super::calculations::{calculate_center_offset, calculate_fit_dimensions};
use image::imageops::{self, FilterType};
use image::{DynamicImage, GenericImageView, Rgb, RgbImage};

/// Composite `img` onto an opaque `background` of the same size.
///
/// Images without an alpha channel are converted straight to RGB8. Palette
/// sources arrive here already expanded to RGBA by the decoders, so they take
/// the alpha path too.
pub fn flatten_onto(img: &DynamicImage, background: [u8; 3]) -> RgbImage {
    if !img.color().has_alpha() {
        return img.to_rgb8();
    }

    let rgba = img.to_rgba8();
    let (w, h) = img.dimensions();
    let mut out = RgbImage::from_pixel(w, h, Rgb(background));
    for (x, y, px) in rgba.enumerate_pixels() {
        let alpha = px[3] as u32;
        if alpha == 0 {
            continue;
        }
        let blended = std::array::from_fn(|c| {
            let src = px[c] as u32;
            let bg = background[c] as u32;
            ((src * alpha + bg * (255 - alpha) + 127) / 255) as u8
        });
        out.put_pixel(x, y, Rgb(blended));
    }
    out
}

/// Downscale (never upscale) to fit within `max_w`×`max_h`, keeping aspect ratio.
pub fn scale_to_fit(img: &RgbImage, max_w: u32, max_h: u32) -> RgbImage {
    let (fit_w, fit_h) = calculate_fit_dimensions(img.dimensions(), (max_w, max_h));
    if (fit_w, fit_h) == img.dimensions() {
        return img.clone();
    }
    imageops::resize(img, fit_w, fit_h, FilterType::Lanczos3)
}

/// Fit within `width`×`height`, then center on a canvas of exactly that size.
pub fn fit_and_center(img: &RgbImage, width: u32, height: u32, background: [u8; 3]) -> RgbImage {
    let scaled = scale_to_fit(img, width, height);
    let (x, y) = calculate_center_offset(scaled.dimensions(), (width, height));
    let mut canvas = RgbImage::from_pixel(width, height, Rgb(background));
    imageops::replace(&mut canvas, &scaled, x as i64, y as i64);
    canvas
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::params::WHITE;
    use image::{Rgba, RgbaImage};

    #[test]
    fn flatten_opaque_is_plain_conversion() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 3, Rgb([10, 20, 30])));
        let flat = flatten_onto(&img, WHITE);
        assert_eq!(flat.dimensions(), (4, 3));
        assert_eq!(flat.get_pixel(2, 2), &Rgb([10, 20, 30]));
    }

    #[test]
    fn flatten_transparent_becomes_background() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(2, 2, Rgba([0, 0, 0, 0])));
        let flat = flatten_onto(&img, WHITE);
        assert_eq!(flat.get_pixel(0, 0), &Rgb(WHITE));
    }

    #[test]
    fn flatten_half_alpha_blends() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(1, 1, Rgba([0, 0, 0, 128])));
        let flat = flatten_onto(&img, WHITE);
        // 255 * 127 / 255 ≈ 127
        assert_eq!(flat.get_pixel(0, 0), &Rgb([127, 127, 127]));
    }

    #[test]
    fn flatten_opaque_alpha_pixel_keeps_color() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(1, 1, Rgba([200, 10, 50, 255])));
        let flat = flatten_onto(&img, WHITE);
        assert_eq!(flat.get_pixel(0, 0), &Rgb([200, 10, 50]));
    }

    #[test]
    fn scale_to_fit_preserves_aspect() {
        let img = RgbImage::new(400, 200);
        assert_eq!(scale_to_fit(&img, 100, 100).dimensions(), (100, 50));
    }

    #[test]
    fn scale_to_fit_does_not_upscale() {
        let img = RgbImage::new(40, 20);
        assert_eq!(scale_to_fit(&img, 100, 100).dimensions(), (40, 20));
    }

    #[test]
    fn fit_and_center_has_exact_canvas_size() {
        for (w, h) in [(1600, 900), (900, 1600), (50, 50), (120, 80)] {
            let img = RgbImage::new(w, h);
            let out = fit_and_center(&img, 120, 80, WHITE);
            assert_eq!(out.dimensions(), (120, 80), "source {w}x{h}");
        }
    }

    #[test]
    fn fit_and_center_letterboxes_with_background() {
        // Black 1600x900 into 120x80: image occupies rows 6..74
        let img = RgbImage::from_pixel(1600, 900, Rgb([0, 0, 0]));
        let out = fit_and_center(&img, 120, 80, WHITE);
        assert_eq!(out.get_pixel(60, 0), &Rgb(WHITE));
        assert_eq!(out.get_pixel(60, 79), &Rgb(WHITE));
        assert_eq!(out.get_pixel(60, 40), &Rgb([0, 0, 0]));
    }

    #[test]
    fn fit_and_center_small_source_is_centered_unscaled() {
        let img = RgbImage::from_pixel(10, 10, Rgb([0, 0, 0]));
        let out = fit_and_center(&img, 30, 30, WHITE);
        assert_eq!(out.get_pixel(9, 9), &Rgb(WHITE));
        assert_eq!(out.get_pixel(10, 10), &Rgb([0, 0, 0]));
        assert_eq!(out.get_pixel(19, 19), &Rgb([0, 0, 0]));
        assert_eq!(out.get_pixel(20, 20), &Rgb(WHITE));
    }
}
