//! Detection-and-compositing engine.
//!
//! The engine searches incoming frames for a template image on a rate-limited
//! schedule and composites an overlay image onto the frame wherever the
//! template was last found. Components:
//!
//! - [`config`]: host-facing settings and the immutable decoded snapshot
//! - [`images`]: template/overlay loading, normalization, and scaling
//! - [`matcher`]: zero-mean normalized cross-correlation search
//! - [`scheduler`]: detection interval gate and match/miss state machine
//! - [`compositor`]: in-place "over" alpha blit with clipping
//! - [`filter`]: the frame pipeline adapter tying it all together

pub mod compositor;
pub mod config;
pub mod filter;
pub mod images;
pub mod matcher;
pub mod scheduler;


pub use config::{EngineConfig, OverlaySettings};
pub use filter::{FrameFilter, OverlayEngine};
pub use matcher::MatchScan;
pub use scheduler::DetectionState;
