//! Frame pipeline adapter: gates, matches, persists state, composites.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use crate::frame::FrameBuffer;

use super::compositor;
use super::config::{EngineConfig, OverlaySettings};
use super::matcher;
use super::scheduler::DetectionState;

/// Host-facing filter lifecycle.
///
/// Host adapters code against this trait: construct an engine per filter
/// instance, push settings whenever they change, and feed every frame through
/// `process_frame`. Destruction is `Drop`.
pub trait FrameFilter {
    fn update_settings(&self, settings: &OverlaySettings);
    fn process_frame(&self, frame: &mut FrameBuffer<'_>);
}

struct Shared {
    config: Arc<EngineConfig>,
    state: DetectionState,
    warned_format: bool,
}

/// The detection-and-compositing engine.
///
/// Invoked synchronously by a frame-delivery caller and, concurrently, by a
/// settings-update caller. A single lock guards the configuration snapshot
/// and the detection state; all expensive work (decoding, grayscale
/// conversion, correlation, blending) happens outside the lock on captured
/// snapshots, so a slow detection never blocks a settings update.
pub struct OverlayEngine {
    shared: Mutex<Shared>,
    epoch: Instant,
}

impl OverlayEngine {
    pub fn new(settings: &OverlaySettings) -> Self {
        Self {
            shared: Mutex::new(Shared {
                config: Arc::new(EngineConfig::from_settings(settings)),
                state: DetectionState::new(),
                warned_format: false,
            }),
            epoch: Instant::now(),
        }
    }

    /// Replace the configuration wholesale and force re-detection.
    ///
    /// Image decoding happens before the lock is taken; frames keep flowing
    /// off the old snapshot in the meantime.
    pub fn update_settings(&self, settings: &OverlaySettings) {
        let config = Arc::new(EngineConfig::from_settings(settings));
        let mut shared = self.shared();
        shared.config = config;
        shared.state.invalidate();
    }

    /// Process one frame in place. Always returns with the same buffer; the
    /// frame passes through unmodified on any degraded path.
    pub fn process_frame(&self, frame: &mut FrameBuffer<'_>) {
        let now_ms = self.epoch.elapsed().as_millis() as u64;
        self.process_frame_at(frame, now_ms);
    }

    /// Deterministic-time variant backing `process_frame`.
    pub(crate) fn process_frame_at(&self, frame: &mut FrameBuffer<'_>, now_ms: u64) {
        if !frame.format().is_supported() {
            let mut shared = self.shared();
            if !shared.warned_format {
                log::warn!(
                    "unsupported frame format {:?} (expected BGRA/BGRX), passing frames through",
                    frame.format()
                );
                shared.warned_format = true;
            }
            return;
        }

        let (config, mut state) = {
            let shared = self.shared();
            (Arc::clone(&shared.config), shared.state.clone())
        };

        let (Some(template), Some(overlay)) = (&config.template, &config.overlay) else {
            return;
        };

        if state.is_due(now_ms, config.interval_ms) {
            let frame_gray = frame.to_gray();
            let scan = matcher::best_match(&frame_gray, template);
            state.record_attempt(now_ms, scan, config.threshold, config.only_when_matched);
            log::debug!(
                "detection attempt at {now_ms}ms: score {:.3}, valid {}",
                state.last_score(),
                state.is_valid()
            );
            self.shared().state = state.clone();
        }

        if let Some((x, y)) = state.draw_position() {
            compositor::blend_overlay(
                frame,
                overlay,
                x + config.offset_x,
                y + config.offset_y,
                config.opacity,
            );
        }
    }

    /// Correlation score of the most recent detection attempt, hit or miss.
    pub fn last_score(&self) -> f32 {
        self.shared().state.last_score()
    }

    // The guarded data is plain values that cannot be left half-updated, so
    // a poisoned lock is recovered rather than propagated.
    fn shared(&self) -> MutexGuard<'_, Shared> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl FrameFilter for OverlayEngine {
    fn update_settings(&self, settings: &OverlaySettings) {
        OverlayEngine::update_settings(self, settings);
    }

    fn process_frame(&self, frame: &mut FrameBuffer<'_>) {
        OverlayEngine::process_frame(self, frame);
    }
}
