//! Molecular Layer: High-precision stage calculator with memoization
//!
//! Progress is quantized to `precision` and used as a cache key together with
//! the scene identity. Stage thresholds are evaluated on elastically softened
//! local progress and differ from the base calculator's; the two calculators
//! do not share stage boundaries.

use serde::Serialize;

use super::cache::{CacheKey, CacheStats, StagingCache};
use super::easing::{anticipation, ice_smooth, ultra_smooth};
use super::performance::{get_performance_mode, PerformanceMode};
use super::stage::{ensure_finite, SceneStage, SceneStageMetrics, SceneTopology};
use super::velocity::VelocityTracker;
use crate::config::QuantumStagingConfig;
use crate::Result;

const ENTER_START: f64 = -0.1;
const ACTIVE_START: f64 = 0.15;
const EXIT_START: f64 = 0.85;
const GONE_START: f64 = 1.1;

/// Damping applied to local progress outside [0, 1]
const ELASTIC_DAMPING: f64 = 0.1;

const ACTIVE_OPACITY: f64 = 0.9;
const EXIT_OPACITY_FLOOR: f64 = 0.1;
const SLIDE_DISTANCE: f64 = 50.0;
const EDGE_SCALE: f64 = 0.95;

/// Speed (progress/s) at which frame accuracy bottoms out
const FRAME_ACCURACY_SPEED_LIMIT: f64 = 5.0;
/// Speed (progress/s) at which motion blur saturates
const MOTION_BLUR_SPEED_LIMIT: f64 = 2.0;
/// Stretch added to the elastic factor per unit of speed
const ELASTIC_STRETCH_PER_SPEED: f64 = 0.1;

/// Sub-frame diagnostics for a renderer interpolating between cached frames
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct QuantumMetrics {
    /// Sub-integer remainder of the raw progress at 1000x scale
    pub micro_progress: f64,
    /// Sub-integer remainder of the quantized progress at 1000x scale
    pub sub_pixel_position: f64,
    pub frame_accuracy: f64,
    pub elastic_factor: f64,
    pub cache_hit: bool,
}

/// Base staging metrics extended with the quantized engine's extra channels
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QuantumStageMetrics {
    #[serde(flatten)]
    pub staging: SceneStageMetrics,
    /// Progress through the scene's whole lifecycle, entering to gone
    pub morph_progress: f64,
    pub anticipation_level: f64,
    pub motion_blur: f64,
    /// How far elastic softening moved the local progress
    pub elasticity: f64,
    #[serde(flatten)]
    pub quantum: QuantumMetrics,
}

/// Quantized stage calculator owning its session cache and velocity history.
///
/// Construct one per presentation session. Calls for the same
/// `(scene, total, quantized progress)` key return identical metrics until
/// [`QuantumStager::clear_cache`] is called.
#[derive(Debug, Clone)]
pub struct QuantumStager {
    config: QuantumStagingConfig,
    cache: StagingCache,
    velocity: VelocityTracker,
}

impl Default for QuantumStager {
    fn default() -> Self {
        let config = QuantumStagingConfig::default();
        Self {
            cache: StagingCache::new(config.cache_capacity),
            velocity: VelocityTracker::default(),
            config,
        }
    }
}

impl QuantumStager {
    /// Create a stager with a validated configuration
    pub fn new(config: QuantumStagingConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            cache: StagingCache::new(config.cache_capacity),
            velocity: VelocityTracker::default(),
            config,
        })
    }

    /// Create with default configuration
    pub fn with_defaults() -> Self {
        Self::default()
    }

    /// Replace the velocity tracker with one holding `window` samples
    pub fn with_velocity_window(mut self, window: usize) -> Self {
        self.velocity = VelocityTracker::new(window);
        self
    }

    pub fn config(&self) -> &QuantumStagingConfig {
        &self.config
    }

    /// Feed the host's current scroll position; call once per frame
    pub fn observe_scroll(&mut self, progress: f64, timestamp_secs: f64) {
        self.velocity.record(progress, timestamp_secs);
    }

    /// Current scroll velocity in progress units per second
    pub fn velocity(&self) -> f64 {
        self.velocity.velocity()
    }

    /// Rendering tier for the current velocity with default thresholds
    pub fn performance_mode(&self) -> PerformanceMode {
        get_performance_mode(self.velocity())
    }

    /// Compute (or fetch from cache) the metrics of one scene
    pub fn calculate(
        &mut self,
        scene_index: usize,
        total_scenes: usize,
        global_scroll_progress: f64,
    ) -> Result<QuantumStageMetrics> {
        let topology = SceneTopology::new(scene_index, total_scenes)?;
        let progress = ensure_finite(global_scroll_progress)?;
        let key = CacheKey::new(scene_index, total_scenes, progress, self.config.precision);

        let velocity = self.velocity.velocity();

        if self.config.caching_enabled {
            if let Some(mut cached) = self.cache.get(&key) {
                tracing::trace!(
                    scene = scene_index,
                    step = key.quantized_step,
                    "Staging cache hit"
                );
                apply_motion(&mut cached, velocity, &self.config);
                cached.quantum.cache_hit = true;
                return Ok(cached);
            }
        }

        let quantized = key.quantized_progress(self.config.precision);
        let mut metrics = stage_scene(&topology, progress, quantized, &self.config);

        // the cached value stays velocity-free; motion is applied per call
        if self.config.caching_enabled {
            self.cache.insert(key, metrics);
        }
        apply_motion(&mut metrics, velocity, &self.config);

        Ok(metrics)
    }

    /// Warm the cache with `steps + 1` evenly spaced progress values.
    ///
    /// `None` uses the configured `frame_pre_calculation` step count.
    pub fn pre_calculate_frames(
        &mut self,
        scene_index: usize,
        total_scenes: usize,
        start_progress: f64,
        end_progress: f64,
        steps: Option<u32>,
    ) -> Result<()> {
        SceneTopology::new(scene_index, total_scenes)?;
        let start = ensure_finite(start_progress)?;
        let end = ensure_finite(end_progress)?;
        let steps = steps.unwrap_or(self.config.frame_pre_calculation);

        if steps == 0 {
            self.calculate(scene_index, total_scenes, start)?;
        } else {
            let span = end - start;
            for step in 0..=steps {
                let progress = start + span * (step as f64 / steps as f64);
                self.calculate(scene_index, total_scenes, progress)?;
            }
        }

        tracing::debug!(
            scene = scene_index,
            steps,
            start,
            end,
            cached = self.cache.len(),
            "Pre-calculated staging frames"
        );
        Ok(())
    }

    /// Drop every cached entry, e.g. when the scene topology changes
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    /// Clear the cache and forget velocity history
    pub fn reset(&mut self) {
        self.cache.clear();
        self.velocity.clear();
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }
}

/// Soften local progress outside [0, 1] into a rubber-band overshoot
#[inline]
fn soften(raw: f64) -> f64 {
    if raw < 0.0 {
        raw * ELASTIC_DAMPING
    } else if raw > 1.0 {
        1.0 + (raw - 1.0) * ELASTIC_DAMPING
    } else {
        raw
    }
}

/// Velocity-independent metrics for one quantized step; motion fields are left at rest
fn stage_scene(
    topology: &SceneTopology,
    progress: f64,
    quantized: f64,
    config: &QuantumStagingConfig,
) -> QuantumStageMetrics {
    let raw = (quantized - topology.scene_start()) / topology.scene_size();
    let elastic = if config.elastic_boundaries {
        soften(raw)
    } else {
        raw
    };

    let (stage, stage_progress) = if elastic < ENTER_START {
        (SceneStage::Hidden, 0.0)
    } else if elastic < ACTIVE_START {
        (
            SceneStage::Entering,
            (elastic - ENTER_START) / (ACTIVE_START - ENTER_START),
        )
    } else if elastic < EXIT_START {
        (
            SceneStage::Active,
            (elastic - ACTIVE_START) / (EXIT_START - ACTIVE_START),
        )
    } else if elastic < GONE_START {
        (
            SceneStage::Exiting,
            (elastic - EXIT_START) / (GONE_START - EXIT_START),
        )
    } else {
        (SceneStage::Gone, 1.0)
    };
    let p = stage_progress.clamp(0.0, 1.0);

    let (visibility, text_visibility) = match stage {
        SceneStage::Hidden | SceneStage::Gone => (0.0, 0.0),
        SceneStage::Entering => (ice_smooth(p), anticipation(p)),
        SceneStage::Active => (1.0, 1.0),
        SceneStage::Exiting => {
            let v = ice_smooth(1.0 - p);
            (v, v)
        }
    };

    let (background_opacity, transform_y, scale) = match stage {
        SceneStage::Hidden => (0.0, SLIDE_DISTANCE, EDGE_SCALE),
        SceneStage::Entering => (
            ACTIVE_OPACITY * visibility,
            SLIDE_DISTANCE * (1.0 - visibility),
            EDGE_SCALE + (1.0 - EDGE_SCALE) * visibility,
        ),
        SceneStage::Active => (ACTIVE_OPACITY, 0.0, 1.0),
        SceneStage::Exiting => (
            EXIT_OPACITY_FLOOR + (ACTIVE_OPACITY - EXIT_OPACITY_FLOOR) * visibility,
            -SLIDE_DISTANCE * (1.0 - visibility),
            EDGE_SCALE + (1.0 - EDGE_SCALE) * visibility,
        ),
        SceneStage::Gone => (0.0, -SLIDE_DISTANCE, EDGE_SCALE),
    };

    let anticipation_level = match stage {
        SceneStage::Hidden | SceneStage::Gone => 0.0,
        SceneStage::Entering => anticipation(p),
        SceneStage::Active => 1.0,
        SceneStage::Exiting => 1.0 - ultra_smooth(p),
    };

    QuantumStageMetrics {
        staging: SceneStageMetrics {
            stage,
            progress: p,
            text_visibility,
            background_opacity,
            transform_y,
            scale,
            z_index: topology.z_index(stage),
        },
        morph_progress: ((elastic - ENTER_START) / (GONE_START - ENTER_START)).clamp(0.0, 1.0),
        anticipation_level,
        motion_blur: 0.0,
        elasticity: (raw - elastic).abs(),
        quantum: QuantumMetrics {
            micro_progress: (progress * 1000.0).rem_euclid(1.0),
            sub_pixel_position: if config.sub_pixel_accuracy {
                (quantized * 1000.0).rem_euclid(1.0)
            } else {
                0.0
            },
            frame_accuracy: 1.0,
            elastic_factor: 1.0,
            cache_hit: false,
        },
    }
}

/// Overlay the velocity-derived fields for the current scroll speed
fn apply_motion(metrics: &mut QuantumStageMetrics, velocity: f64, config: &QuantumStagingConfig) {
    let speed = velocity.abs();
    metrics.motion_blur = match metrics.staging.stage {
        SceneStage::Entering | SceneStage::Exiting => (speed / MOTION_BLUR_SPEED_LIMIT).min(1.0),
        _ => 0.0,
    };
    metrics.quantum.frame_accuracy = (1.0 - speed / FRAME_ACCURACY_SPEED_LIMIT).clamp(0.0, 1.0);
    metrics.quantum.elastic_factor = if config.elastic_boundaries {
        1.0 + speed * ELASTIC_STRETCH_PER_SPEED
    } else {
        1.0
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    fn uncached() -> QuantumStagingConfig {
        QuantumStagingConfig {
            caching_enabled: false,
            ..Default::default()
        }
    }

    fn without_hit(mut metrics: QuantumStageMetrics) -> QuantumStageMetrics {
        metrics.quantum.cache_hit = false;
        metrics
    }

    #[test]
    fn test_second_call_hits_cache() {
        let mut stager = QuantumStager::with_defaults();
        let first = stager.calculate(1, 3, 0.45).unwrap();
        let second = stager.calculate(1, 3, 0.45).unwrap();

        assert!(!first.quantum.cache_hit);
        assert!(second.quantum.cache_hit);
        assert_eq!(without_hit(second), first);
        assert_eq!(stager.cache_stats().hits, 1);
    }

    #[test]
    fn test_same_quantized_key_returns_first_result() {
        let mut stager = QuantumStager::with_defaults();
        let first = stager.calculate(0, 2, 0.40004).unwrap();
        let second = stager.calculate(0, 2, 0.39996).unwrap();

        assert!(second.quantum.cache_hit);
        assert_eq!(second.quantum.micro_progress, first.quantum.micro_progress);
        assert_eq!(without_hit(second), first);
        assert_eq!(stager.cache_len(), 1);
    }

    #[test]
    fn test_cache_transparency() {
        let mut cached = QuantumStager::with_defaults();
        let mut direct = QuantumStager::new(uncached()).unwrap();

        for total in 1..=4 {
            for scene in 0..total {
                for i in -20..=120 {
                    let progress = i as f64 / 100.0;
                    cached.calculate(scene, total, progress).unwrap();
                    let hit = cached.calculate(scene, total, progress).unwrap();
                    let miss = direct.calculate(scene, total, progress).unwrap();
                    assert!(hit.quantum.cache_hit);
                    assert!(!miss.quantum.cache_hit);
                    assert_eq!(without_hit(hit), miss);
                }
            }
        }
        assert_eq!(direct.cache_len(), 0);
    }

    #[test]
    fn test_cache_bound() {
        let mut stager = QuantumStager::with_defaults();
        for step in 0..1500 {
            stager.calculate(0, 1, step as f64 * 0.001).unwrap();
            assert!(stager.cache_len() <= 1000);
        }
        let stats = stager.cache_stats();
        assert_eq!(stats.entries, 1000);
        assert_eq!(stats.evictions, 500);

        // the oldest keys were evicted, the newest survive
        assert!(!stager.calculate(0, 1, 0.0).unwrap().quantum.cache_hit);
        assert!(stager.calculate(0, 1, 1.499).unwrap().quantum.cache_hit);
    }

    #[test]
    fn test_clear_empties_cache() {
        let mut stager = QuantumStager::with_defaults();
        stager.calculate(2, 3, 0.8).unwrap();
        assert!(stager.calculate(2, 3, 0.8).unwrap().quantum.cache_hit);

        stager.clear_cache();
        assert_eq!(stager.cache_len(), 0);
        assert!(!stager.calculate(2, 3, 0.8).unwrap().quantum.cache_hit);
    }

    #[test]
    fn test_quantized_stage_thresholds() {
        let mut stager = QuantumStager::with_defaults();
        let mut stage = |progress: f64| stager.calculate(1, 3, progress).unwrap().staging.stage;

        assert_eq!(stage(-0.01), SceneStage::Hidden);
        assert_eq!(stage(0.2), SceneStage::Entering);
        assert_eq!(stage(0.35), SceneStage::Entering);
        assert_eq!(stage(0.45), SceneStage::Active);
        assert_eq!(stage(0.63), SceneStage::Exiting);
        // elastic overshoot keeps the scene exiting past its slice
        assert_eq!(stage(0.75), SceneStage::Exiting);
        assert_eq!(stage(1.05), SceneStage::Gone);
    }

    #[test]
    fn test_without_elastic_boundaries() {
        let config = QuantumStagingConfig {
            elastic_boundaries: false,
            ..Default::default()
        };
        let mut stager = QuantumStager::new(config).unwrap();

        assert_eq!(stager.calculate(1, 3, 0.2).unwrap().staging.stage, SceneStage::Hidden);
        let gone = stager.calculate(1, 3, 0.75).unwrap();
        assert_eq!(gone.staging.stage, SceneStage::Gone);
        assert_eq!(gone.elasticity, 0.0);
        assert_eq!(gone.quantum.elastic_factor, 1.0);
    }

    #[test]
    fn test_elastic_softening() {
        let mut stager = QuantumStager::with_defaults();
        // raw local -0.5 softens to -0.05
        let metrics = stager.calculate(0, 1, -0.5).unwrap();
        assert_eq!(metrics.staging.stage, SceneStage::Entering);
        assert!((metrics.elasticity - 0.45).abs() < 1e-9);
        assert!((metrics.staging.progress - 0.2).abs() < 1e-9);

        let inside = stager.calculate(0, 1, 0.5).unwrap();
        assert_eq!(inside.elasticity, 0.0);
    }

    #[test]
    fn test_quantized_seams_are_continuous() {
        let mut stager = QuantumStager::new(uncached()).unwrap();
        for (before, after) in [(0.149, 0.151), (0.849, 0.851)] {
            let a = stager.calculate(0, 1, before).unwrap().staging;
            let b = stager.calculate(0, 1, after).unwrap().staging;
            assert_ne!(a.stage, b.stage);
            assert!((a.text_visibility - b.text_visibility).abs() <= 0.05);
            assert!((a.background_opacity - b.background_opacity).abs() <= 0.05);
        }
    }

    #[test]
    fn test_active_window_is_flat() {
        let mut stager = QuantumStager::with_defaults();
        for i in 16..84 {
            let metrics = stager.calculate(0, 1, i as f64 / 100.0).unwrap();
            assert_eq!(metrics.staging.stage, SceneStage::Active);
            assert_eq!(metrics.staging.text_visibility, 1.0);
            assert_eq!(metrics.staging.background_opacity, 0.9);
            assert_eq!(metrics.anticipation_level, 1.0);
        }
    }

    #[test]
    fn test_stages_monotonic_and_bounded() {
        let mut stager = QuantumStager::with_defaults();
        let mut prev = SceneStage::Hidden;
        for i in -150..=250 {
            let metrics = stager.calculate(1, 4, i as f64 / 100.0).unwrap();
            assert!(metrics.staging.stage >= prev);
            prev = metrics.staging.stage;
            assert!((0.0..=1.0).contains(&metrics.staging.text_visibility));
            assert!((0.0..=1.0).contains(&metrics.staging.background_opacity));
            assert!((0.0..=1.0).contains(&metrics.morph_progress));
            assert!((0.0..=1.0).contains(&metrics.quantum.micro_progress));
        }
        assert_eq!(prev, SceneStage::Gone);
    }

    #[test]
    fn test_sub_pixel_metrics() {
        let mut stager = QuantumStager::with_defaults();
        let metrics = stager.calculate(0, 1, 0.4567891).unwrap();
        assert!((metrics.quantum.micro_progress - 0.7891).abs() < 1e-6);
        let sub_pixel = metrics.quantum.sub_pixel_position;
        assert!(sub_pixel < 1e-6 || sub_pixel > 1.0 - 1e-6);

        let config = QuantumStagingConfig {
            sub_pixel_accuracy: false,
            ..Default::default()
        };
        let mut stager = QuantumStager::new(config).unwrap();
        assert_eq!(stager.calculate(0, 1, 0.4567891).unwrap().quantum.sub_pixel_position, 0.0);
    }

    #[test]
    fn test_velocity_metrics() {
        let mut stager = QuantumStager::new(uncached()).unwrap();
        let still = stager.calculate(0, 1, 0.05).unwrap();
        assert_eq!(still.quantum.frame_accuracy, 1.0);
        assert_eq!(still.quantum.elastic_factor, 1.0);
        assert_eq!(still.motion_blur, 0.0);

        stager.observe_scroll(0.0, 0.0);
        stager.observe_scroll(0.25, 0.25);
        assert!((stager.velocity() - 1.0).abs() < 1e-9);
        assert_eq!(stager.performance_mode(), PerformanceMode::Medium);

        let entering = stager.calculate(0, 1, 0.05).unwrap();
        assert!((entering.quantum.frame_accuracy - 0.8).abs() < 1e-9);
        assert!((entering.quantum.elastic_factor - 1.1).abs() < 1e-9);
        assert!((entering.motion_blur - 0.5).abs() < 1e-9);

        let active = stager.calculate(0, 1, 0.5).unwrap();
        assert_eq!(active.motion_blur, 0.0);

        stager.reset();
        assert_eq!(stager.velocity(), 0.0);
    }

    #[test]
    fn test_warmed_cache_reports_current_motion() {
        let mut stager = QuantumStager::with_defaults();
        stager.pre_calculate_frames(0, 1, 0.0, 0.2, Some(20)).unwrap();

        stager.observe_scroll(0.0, 0.0);
        stager.observe_scroll(0.3, 0.1);
        assert!((stager.velocity() - 3.0).abs() < 1e-9);

        let fast = stager.calculate(0, 1, 0.05).unwrap();
        assert!(fast.quantum.cache_hit);
        assert_eq!(fast.staging.stage, SceneStage::Entering);
        assert_eq!(fast.motion_blur, 1.0);
        assert!((fast.quantum.frame_accuracy - 0.4).abs() < 1e-9);
        assert!((fast.quantum.elastic_factor - 1.3).abs() < 1e-9);

        // once scrolling stops the same cached frame is at rest again
        stager.reset();
        stager.pre_calculate_frames(0, 1, 0.0, 0.2, Some(20)).unwrap();
        let still = stager.calculate(0, 1, 0.05).unwrap();
        assert!(still.quantum.cache_hit);
        assert_eq!(still.motion_blur, 0.0);
        assert_eq!(still.quantum.frame_accuracy, 1.0);
    }

    #[test]
    fn test_pre_calculate_frames() {
        let mut stager = QuantumStager::with_defaults();
        stager.pre_calculate_frames(0, 2, 0.0, 0.5, Some(10)).unwrap();
        assert_eq!(stager.cache_len(), 11);
        assert!(stager.calculate(0, 2, 0.25).unwrap().quantum.cache_hit);

        stager.clear_cache();
        stager.pre_calculate_frames(0, 2, 0.3, 0.9, Some(0)).unwrap();
        assert_eq!(stager.cache_len(), 1);

        stager.clear_cache();
        stager.pre_calculate_frames(1, 2, 0.2, 0.8, None).unwrap();
        assert_eq!(stager.cache_len(), 61);

        // scrolling backwards warms the same way
        stager.clear_cache();
        stager.pre_calculate_frames(1, 2, 0.8, 0.2, Some(6)).unwrap();
        assert_eq!(stager.cache_len(), 7);
    }

    #[test]
    fn test_invalid_input() {
        let mut stager = QuantumStager::with_defaults();
        assert!(matches!(
            stager.calculate(0, 0, 0.5),
            Err(Error::InvalidTopology { .. })
        ));
        assert!(matches!(
            stager.calculate(0, 2, f64::NAN),
            Err(Error::NonFiniteProgress(_))
        ));
        assert!(stager.pre_calculate_frames(5, 2, 0.0, 1.0, None).is_err());
        assert_eq!(stager.cache_len(), 0);

        let config = QuantumStagingConfig {
            precision: -1.0,
            ..Default::default()
        };
        assert!(matches!(
            QuantumStager::new(config),
            Err(Error::InvalidConfig(_))
        ));
    }
}
