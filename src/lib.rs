//! Real-time template-detection overlay engine for raw video frames.
//!
//! Given a stream of BGRA/BGRX frames, the engine periodically searches each
//! frame for a configured template image and, while the template is (or was
//! recently) found, alpha-blends a configured overlay image onto the frame at
//! the matched location. Detection attempts are rate-limited by a configurable
//! interval so the correlation scan runs below full frame rate.
//!
//! The engine is synchronous and thread-safe: a frame-delivery thread calls
//! [`OverlayEngine::process_frame`] while a settings thread may concurrently
//! call [`OverlayEngine::update_settings`]. Frame buffers are borrowed, never
//! owned, and are mutated in place.

pub mod engine;
pub mod frame;

pub use engine::{DetectionState, EngineConfig, FrameFilter, MatchScan, OverlayEngine, OverlaySettings};
pub use frame::{FrameBuffer, FrameError, PixelFormat};
