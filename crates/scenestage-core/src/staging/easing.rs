//! Atomic Layer: Pure easing curves for scene staging
//!
//! Each curve maps a normalized parameter onto an eased value with `f(0) = 0`
//! and `f(1) = 1`. Inputs are not clamped; values outside [0, 1] extrapolate
//! along the formula.

use std::f64::consts::FRAC_PI_2;

use serde::{Deserialize, Serialize};

/// Named easing curve, selectable from configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    Linear,
    #[default]
    UltraSmooth,
    Anticipation,
    IceSmooth,
}

impl Easing {
    /// Apply the easing curve to a progress value
    #[inline]
    pub fn apply(&self, t: f64) -> f64 {
        match self {
            Easing::Linear => t,
            Easing::UltraSmooth => ultra_smooth(t),
            Easing::Anticipation => anticipation(t),
            Easing::IceSmooth => ice_smooth(t),
        }
    }
}

/// Cubic ease-in-out with zero velocity at both ends
#[inline]
pub fn ultra_smooth(t: f64) -> f64 {
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

/// Slow quadratic wind-up for most of the range, then a quick settle.
///
/// The two pieces do not meet at t = 0.7 (0.98 from below, 0.82 from above).
#[inline]
pub fn anticipation(t: f64) -> f64 {
    if t < 0.7 {
        2.0 * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
    }
}

/// Quarter-cosine ease: f(t) = 1 - cos(t·π/2)
#[inline]
pub fn ice_smooth(t: f64) -> f64 {
    1.0 - (t * FRAC_PI_2).cos()
}
