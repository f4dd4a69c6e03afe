//! Atomic Layer: Scroll velocity estimation from recent progress samples

use std::collections::VecDeque;

/// Default number of samples kept for velocity estimation
pub const DEFAULT_WINDOW: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Sample {
    progress: f64,
    timestamp_secs: f64,
}

/// Ring buffer of the last N `(progress, timestamp)` observations.
///
/// Velocity is measured in progress units per second across the whole
/// window, which smooths out single jittery frames.
#[derive(Debug, Clone)]
pub struct VelocityTracker {
    samples: VecDeque<Sample>,
    window: usize,
}

impl Default for VelocityTracker {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW)
    }
}

impl VelocityTracker {
    pub fn new(window: usize) -> Self {
        let window = window.max(2);
        Self {
            samples: VecDeque::with_capacity(window),
            window,
        }
    }

    /// Record the progress seen at `timestamp_secs`.
    ///
    /// Non-finite values and samples older than the newest one are ignored.
    pub fn record(&mut self, progress: f64, timestamp_secs: f64) {
        if !progress.is_finite() || !timestamp_secs.is_finite() {
            return;
        }
        if let Some(last) = self.samples.back() {
            if timestamp_secs < last.timestamp_secs {
                return;
            }
        }
        if self.samples.len() == self.window {
            self.samples.pop_front();
        }
        self.samples.push_back(Sample {
            progress,
            timestamp_secs,
        });
    }

    /// Signed velocity in progress units per second, 0 without enough history
    pub fn velocity(&self) -> f64 {
        let (Some(oldest), Some(newest)) = (self.samples.front(), self.samples.back()) else {
            return 0.0;
        };
        let elapsed = newest.timestamp_secs - oldest.timestamp_secs;
        if elapsed <= 0.0 {
            return 0.0;
        }
        (newest.progress - oldest.progress) / elapsed
    }

    /// Most recently recorded progress
    pub fn last_progress(&self) -> Option<f64> {
        self.samples.back().map(|s| s.progress)
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn window(&self) -> usize {
        self.window
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_history_is_still() {
        let mut tracker = VelocityTracker::default();
        assert_eq!(tracker.velocity(), 0.0);
        tracker.record(0.5, 1.0);
        assert_eq!(tracker.velocity(), 0.0);
    }

    #[test]
    fn test_constant_speed() {
        let mut tracker = VelocityTracker::new(4);
        for frame in 0..10 {
            let t = frame as f64 / 60.0;
            tracker.record(0.5 * t, t);
        }
        assert_eq!(tracker.len(), 4);
        assert!((tracker.velocity() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_reverse_scroll_is_negative() {
        let mut tracker = VelocityTracker::default();
        tracker.record(0.8, 0.0);
        tracker.record(0.6, 0.1);
        assert!((tracker.velocity() + 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_window_forgets_old_motion() {
        let mut tracker = VelocityTracker::new(3);
        tracker.record(0.0, 0.0);
        tracker.record(0.5, 0.1);
        for frame in 2..6 {
            tracker.record(0.5, frame as f64 * 0.1);
        }
        assert_eq!(tracker.velocity(), 0.0);
    }

    #[test]
    fn test_ignores_bad_samples() {
        let mut tracker = VelocityTracker::default();
        tracker.record(0.1, 1.0);
        tracker.record(f64::NAN, 1.1);
        tracker.record(0.9, 0.5);
        tracker.record(0.2, 1.5);
        assert_eq!(tracker.len(), 2);
        assert_eq!(tracker.last_progress(), Some(0.2));
        assert!((tracker.velocity() - 0.2).abs() < 1e-9);

        tracker.clear();
        assert!(tracker.is_empty());
    }
}
