//! Progress animation controller
//!
//! Combines easing curves and timing utilities to move the global scroll
//! progress from one value to another over a fixed duration.

use std::time::Duration;

use tokio::time::Instant;

use scenestage_core::{Easing, PlaybackConfig};

use super::timing::{is_complete, lerp, progress, tick_duration};

/// Active progress animation state
#[derive(Debug, Clone)]
struct ActiveAnimation {
    /// Animation start time
    start: Instant,
    /// Starting progress
    from: f64,
    /// Target progress
    to: f64,
    /// Animation duration
    duration: Duration,
    /// Easing curve
    easing: Easing,
}

/// Global progress animation controller
///
/// Call `animate_to()` to begin an animation, then `update()` each frame
/// to get the current interpolated progress.
#[derive(Debug, Clone)]
pub struct ProgressAnimator {
    /// Current active animation (if any)
    animation: Option<ActiveAnimation>,
    /// Configuration
    config: PlaybackConfig,
    /// Current progress (always up-to-date)
    current: f64,
}

impl Default for ProgressAnimator {
    fn default() -> Self {
        Self::new(PlaybackConfig::default())
    }
}

impl ProgressAnimator {
    /// Create a new animator with configuration
    pub fn new(config: PlaybackConfig) -> Self {
        Self {
            animation: None,
            config,
            current: 0.0,
        }
    }

    /// Check if an animation is currently active
    #[inline]
    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    /// Get the target progress (final value after animation)
    pub fn target(&self) -> f64 {
        self.animation
            .as_ref()
            .map(|a| a.to)
            .unwrap_or(self.current)
    }

    /// Get the current interpolated progress
    #[inline]
    pub fn current(&self) -> f64 {
        self.current
    }

    /// Frame interval for the configured fps
    pub fn tick_duration(&self) -> Duration {
        tick_duration(self.config.fps)
    }

    /// Set progress immediately (no animation)
    pub fn set_progress(&mut self, progress: f64) {
        self.animation = None;
        self.current = progress;
    }

    /// Start an animation from the current progress to `target`.
    ///
    /// A zero duration jumps straight to the target.
    pub fn animate_to(&mut self, target: f64) {
        if self.config.duration_ms == 0 {
            self.current = target;
            self.animation = None;
            return;
        }

        if self.current == target {
            self.animation = None;
            return;
        }

        self.animation = Some(ActiveAnimation {
            start: Instant::now(),
            from: self.current,
            to: target,
            duration: Duration::from_millis(self.config.duration_ms),
            easing: self.config.easing,
        });
    }

    /// Update animation state and return the current progress
    pub fn update(&mut self) -> f64 {
        if let Some(ref anim) = self.animation {
            if is_complete(anim.start, anim.duration) {
                self.current = anim.to;
                self.animation = None;
            } else {
                let t = progress(anim.start, anim.duration);
                self.current = lerp(anim.from, anim.to, anim.easing.apply(t));
            }
        }

        self.current
    }
}
