//! Template and overlay image loading, normalization, and scaling.
//!
//! Loading never fails hard: an empty path means "not configured" and a
//! decode failure degrades to `None` with a warning, leaving the engine in
//! pass-through mode until a valid path is supplied.

use image::{GrayImage, RgbaImage, imageops};

/// Load the template as 8-bit grayscale.
pub fn load_template(path: &str) -> Option<GrayImage> {
    if path.is_empty() {
        return None;
    }
    match image::open(path) {
        Ok(img) => {
            let gray = img.to_luma8();
            if gray.width() == 0 || gray.height() == 0 {
                return None;
            }
            Some(gray)
        }
        Err(err) => {
            log::warn!("failed to load template image {path}: {err}");
            None
        }
    }
}

/// Load the overlay as RGBA, normalizing any source channel count.
///
/// Grayscale and RGB sources get an opaque alpha channel synthesized.
pub fn load_overlay(path: &str) -> Option<RgbaImage> {
    if path.is_empty() {
        return None;
    }
    match image::open(path) {
        Ok(img) => {
            let rgba = img.to_rgba8();
            if rgba.width() == 0 || rgba.height() == 0 {
                return None;
            }
            Some(rgba)
        }
        Err(err) => {
            log::warn!("failed to load overlay image {path}: {err}");
            None
        }
    }
}

/// Resample the overlay to the given footprint using area averaging
/// (`thumbnail`, the crate's integer-averaging filter). Identity when the
/// dimensions already match.
pub fn scale_overlay(overlay: &RgbaImage, width: u32, height: u32) -> RgbaImage {
    if overlay.dimensions() == (width, height) {
        return overlay.clone();
    }
    imageops::thumbnail(overlay, width, height)
}
