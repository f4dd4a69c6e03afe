use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::staging::Easing;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub staging: StagingConfig,
    #[serde(default)]
    pub quantum: QuantumStagingConfig,
    #[serde(default)]
    pub performance: PerformanceConfig,
    #[serde(default)]
    pub playback: PlaybackConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// Phase split used by the base stage calculator.
///
/// Only `content_phase` is stored; the transition phase is always its
/// complement so the two can never disagree.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StagingConfig {
    /// Fraction of a scene's slice spent fully active (0.0-1.0)
    #[serde(default = "default_content_phase")]
    pub content_phase: f64,
    /// Local progress after which the scene's text starts fading out
    #[serde(default = "default_text_fade_out")]
    pub text_fade_out: f64,
    /// Fraction through the preceding slice where the next scene's text starts fading in
    #[serde(default = "default_text_fade_in")]
    pub text_fade_in: f64,
}

impl Default for StagingConfig {
    fn default() -> Self {
        Self {
            content_phase: default_content_phase(),
            text_fade_out: default_text_fade_out(),
            text_fade_in: default_text_fade_in(),
        }
    }
}

impl StagingConfig {
    /// Fraction of a scene's slice spent exiting
    #[inline]
    pub fn transition_phase(&self) -> f64 {
        1.0 - self.content_phase
    }

    pub fn validate(&self) -> crate::Result<()> {
        for (name, value) in [
            ("content_phase", self.content_phase),
            ("text_fade_out", self.text_fade_out),
            ("text_fade_in", self.text_fade_in),
        ] {
            if !(value > 0.0 && value < 1.0) {
                return Err(crate::Error::InvalidConfig(format!(
                    "{} must lie strictly between 0 and 1, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

/// Settings for the high-precision, memoizing stage calculator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuantumStagingConfig {
    /// Quantization step applied to scroll progress before cache lookup
    #[serde(default = "default_precision")]
    pub precision: f64,
    /// Default number of steps used when pre-calculating frames
    #[serde(default = "default_frame_pre_calculation")]
    pub frame_pre_calculation: u32,
    #[serde(default = "default_true")]
    pub caching_enabled: bool,
    /// Soften progress outside [0, 1] instead of passing it through
    #[serde(default = "default_true")]
    pub elastic_boundaries: bool,
    #[serde(default = "default_true")]
    pub sub_pixel_accuracy: bool,
    /// Maximum resident cache entries before the oldest is evicted
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
}

impl Default for QuantumStagingConfig {
    fn default() -> Self {
        Self {
            precision: default_precision(),
            frame_pre_calculation: default_frame_pre_calculation(),
            caching_enabled: default_true(),
            elastic_boundaries: default_true(),
            sub_pixel_accuracy: default_true(),
            cache_capacity: default_cache_capacity(),
        }
    }
}

impl QuantumStagingConfig {
    pub fn validate(&self) -> crate::Result<()> {
        if !(self.precision.is_finite() && self.precision > 0.0) {
            return Err(crate::Error::InvalidConfig(format!(
                "precision must be a positive number, got {}",
                self.precision
            )));
        }
        if self.cache_capacity == 0 {
            return Err(crate::Error::InvalidConfig(
                "cache_capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Velocity thresholds (progress units per second) for rendering tiers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerformanceConfig {
    /// Speeds above this drop the renderer to the low tier
    #[serde(default = "default_low_threshold")]
    pub low_threshold: f64,
    /// Speeds above this drop the renderer to the medium tier
    #[serde(default = "default_medium_threshold")]
    pub medium_threshold: f64,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            low_threshold: default_low_threshold(),
            medium_threshold: default_medium_threshold(),
        }
    }
}

impl PerformanceConfig {
    pub fn validate(&self) -> crate::Result<()> {
        if !(self.medium_threshold >= 0.0 && self.low_threshold >= self.medium_threshold) {
            return Err(crate::Error::InvalidConfig(format!(
                "performance thresholds must satisfy 0 <= medium ({}) <= low ({})",
                self.medium_threshold, self.low_threshold
            )));
        }
        Ok(())
    }
}

/// Settings for driving a simulated scroll through the presentation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlaybackConfig {
    #[serde(default = "default_fps")]
    pub fps: u32,
    #[serde(default = "default_duration_ms")]
    pub duration_ms: u64,
    #[serde(default)]
    pub easing: Easing,
    /// Number of recent samples used for velocity estimation
    #[serde(default = "default_velocity_window")]
    pub velocity_window: usize,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            fps: default_fps(),
            duration_ms: default_duration_ms(),
            easing: Easing::default(),
            velocity_window: default_velocity_window(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_content_phase() -> f64 {
    0.7
}

fn default_text_fade_out() -> f64 {
    0.7
}

fn default_text_fade_in() -> f64 {
    0.85
}

fn default_precision() -> f64 {
    0.001
}

fn default_frame_pre_calculation() -> u32 {
    60
}

fn default_cache_capacity() -> usize {
    1000
}

fn default_low_threshold() -> f64 {
    2.0
}

fn default_medium_threshold() -> f64 {
    0.5
}

fn default_fps() -> u32 {
    60
}

fn default_duration_ms() -> u64 {
    1200
}

fn default_velocity_window() -> usize {
    8
}

impl AppConfig {
    /// Load configuration from file or return defaults
    pub fn load() -> crate::Result<Self> {
        let config_path = Self::config_path();

        let config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            Self::from_toml(&content)?
        } else {
            Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a TOML document
    pub fn from_toml(content: &str) -> crate::Result<Self> {
        toml::from_str(content).map_err(|e| crate::Error::Config(e.to_string()))
    }

    /// Render configuration as a TOML document
    pub fn to_toml(&self) -> crate::Result<String> {
        toml::to_string_pretty(self).map_err(|e| crate::Error::Config(e.to_string()))
    }

    /// Save configuration to file
    pub fn save(&self) -> crate::Result<()> {
        let config_path = Self::config_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(&config_path, self.to_toml()?)?;

        Ok(())
    }

    /// Check every section's invariants
    pub fn validate(&self) -> crate::Result<()> {
        self.staging.validate()?;
        self.quantum.validate()?;
        self.performance.validate()?;
        if self.playback.velocity_window < 2 {
            return Err(crate::Error::InvalidConfig(
                "velocity_window must hold at least 2 samples".to_string(),
            ));
        }
        Ok(())
    }

    /// Get the configuration file path
    /// Always uses ~/.config/scenestage/config.toml on all platforms
    pub fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("scenestage")
            .join("config.toml")
    }
}
