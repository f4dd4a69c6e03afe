//! Simulated scroll playback
//!
//! Drives the global progress scalar along an eased path so the staging
//! engine can be exercised the way a renderer's frame loop would.
//!
//! - `timing` - Time calculation utilities (progress, interpolation, tick rate)
//! - `animator` - Progress animation controller combining timing and easing

pub mod animator;
pub mod timing;

pub use animator::ProgressAnimator;
