//! Atomic Layer: Rendering quality tier from scroll velocity
//!
//! The tier tells the renderer how much of its own visual effects to keep;
//! the staging math itself is unaffected.

use serde::{Deserialize, Serialize};

use crate::config::PerformanceConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PerformanceMode {
    High,
    Medium,
    Low,
}

impl PerformanceMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

impl std::fmt::Display for PerformanceMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

impl PerformanceConfig {
    /// Pick the tier for a velocity; direction does not matter
    pub fn mode_for(&self, velocity: f64) -> PerformanceMode {
        let speed = velocity.abs();
        if speed > self.low_threshold {
            PerformanceMode::Low
        } else if speed > self.medium_threshold {
            PerformanceMode::Medium
        } else {
            PerformanceMode::High
        }
    }
}

/// Tier for a velocity using the default thresholds (0.5 and 2.0)
pub fn get_performance_mode(velocity: f64) -> PerformanceMode {
    PerformanceConfig::default().mode_for(velocity)
}
