//! Time calculation utilities for progress animations

use std::time::Duration;

use tokio::time::Instant;

/// Calculate animation progress (0.0 to 1.0) from start time and duration
#[inline]
pub fn progress(start: Instant, duration: Duration) -> f64 {
    if duration.is_zero() {
        return 1.0;
    }
    let elapsed = start.elapsed();
    let ratio = elapsed.as_secs_f64() / duration.as_secs_f64();
    ratio.clamp(0.0, 1.0)
}

/// Check if animation is complete
#[inline]
pub fn is_complete(start: Instant, duration: Duration) -> bool {
    start.elapsed() >= duration
}

/// Linear interpolation between two values
#[inline]
pub fn lerp(from: f64, to: f64, t: f64) -> f64 {
    from + (to - from) * t
}

/// Frame interval for a target frame rate
#[inline]
pub fn tick_duration(fps: u32) -> Duration {
    if fps == 0 {
        Duration::from_millis(16) // ~60fps fallback
    } else {
        Duration::from_secs_f64(1.0 / fps as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lerp() {
        assert!((lerp(0.0, 1.0, 0.0) - 0.0).abs() < 1e-12);
        assert!((lerp(0.2, 0.8, 0.5) - 0.5).abs() < 1e-12);
        assert!((lerp(0.8, 0.2, 1.0) - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_tick_duration() {
        assert_eq!(tick_duration(0), Duration::from_millis(16));
        assert_eq!(tick_duration(50), Duration::from_millis(20));
    }

    #[tokio::test(start_paused = true)]
    async fn test_progress_follows_clock() {
        let start = Instant::now();
        let duration = Duration::from_millis(400);
        assert_eq!(progress(start, duration), 0.0);

        tokio::time::advance(Duration::from_millis(100)).await;
        assert!((progress(start, duration) - 0.25).abs() < 1e-9);
        assert!(!is_complete(start, duration));

        tokio::time::advance(Duration::from_millis(400)).await;
        assert_eq!(progress(start, duration), 1.0);
        assert!(is_complete(start, duration));
    }

    #[tokio::test(start_paused = true)]
    async fn test_progress_zero_duration() {
        let start = Instant::now();
        assert!((progress(start, Duration::ZERO) - 1.0).abs() < 1e-12);
    }
}
