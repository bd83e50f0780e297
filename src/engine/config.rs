//! Host-facing settings and the immutable per-update configuration snapshot.

use image::{GrayImage, RgbaImage};
use serde::{Deserialize, Serialize};

use super::images;

/// User-editable settings as exposed by a host property surface.
///
/// UI ranges: `threshold` 0.0–1.0 (step 0.01), `interval_ms` 0–2000 (step 10),
/// `opacity` 0–100 percent (step 1), offsets −4096..4096 px. Threshold and
/// opacity are clamped on ingestion regardless of UI-level enforcement.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlaySettings {
    /// Path to the template image searched for in each frame.
    pub template_path: String,
    /// Path to the overlay image drawn at the matched location.
    pub overlay_path: String,
    /// Minimum correlation score to accept a match (0.0–1.0, inclusive).
    pub threshold: f32,
    /// Minimum spacing between detection attempts; 0 = every frame.
    pub interval_ms: u32,
    /// Overlay opacity in percent (0–100).
    pub opacity: f32,
    /// Pixel offset applied to the matched location before drawing.
    pub offset_x: i32,
    pub offset_y: i32,
    /// Resample the overlay to the template's dimensions.
    pub scale_overlay: bool,
    /// If true, a failed attempt stops drawing; if false, the last
    /// successful location keeps being drawn after a miss.
    pub only_when_matched: bool,
}

impl Default for OverlaySettings {
    fn default() -> Self {
        Self {
            template_path: String::new(),
            overlay_path: String::new(),
            threshold: 0.8,
            interval_ms: 100,
            opacity: 100.0,
            offset_x: 0,
            offset_y: 0,
            scale_overlay: true,
            only_when_matched: true,
        }
    }
}

/// Immutable configuration snapshot derived from [`OverlaySettings`].
///
/// Replaced wholesale on every settings update and shared via `Arc`, so a
/// detection attempt keeps reading the old snapshot while an update swaps in
/// a new one. Never mutated in place.
#[derive(Debug)]
pub struct EngineConfig {
    /// Decoded grayscale template, `None` when unconfigured or unreadable.
    pub template: Option<GrayImage>,
    /// Decoded RGBA overlay, pre-scaled to the template when requested.
    pub overlay: Option<RgbaImage>,
    pub threshold: f32,
    pub interval_ms: u32,
    /// Opacity as a 0–1 fraction.
    pub opacity: f32,
    pub offset_x: i32,
    pub offset_y: i32,
    pub only_when_matched: bool,
}

impl EngineConfig {
    /// Build a snapshot: decode both images, normalize, scale, clamp.
    ///
    /// Missing or unreadable images degrade to `None`; the engine then skips
    /// detection and compositing until a valid path is supplied.
    pub fn from_settings(settings: &OverlaySettings) -> Self {
        let template = images::load_template(&settings.template_path);
        let overlay = match (&template, images::load_overlay(&settings.overlay_path)) {
            (Some(template), Some(raw)) if settings.scale_overlay => {
                Some(images::scale_overlay(&raw, template.width(), template.height()))
            }
            (_, overlay) => overlay,
        };

        Self {
            template,
            overlay,
            threshold: settings.threshold.clamp(0.0, 1.0),
            interval_ms: settings.interval_ms,
            opacity: (settings.opacity / 100.0).clamp(0.0, 1.0),
            offset_x: settings.offset_x,
            offset_y: settings.offset_y,
            only_when_matched: settings.only_when_matched,
        }
    }

    /// Both images present; detection and compositing are enabled.
    pub fn ready(&self) -> bool {
        self.template.is_some() && self.overlay.is_some()
    }
}
