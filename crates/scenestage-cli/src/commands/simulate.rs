use std::collections::BTreeMap;

use anyhow::{bail, Result};
use serde::Serialize;
use tokio::time::{Instant, MissedTickBehavior};

use scenestage_core::{
    AppConfig, CacheStats, PerformanceMode, QuantumStageMetrics, QuantumStager, SceneStage,
};

use crate::playback::ProgressAnimator;

/// One rendered frame of a simulated scroll
#[derive(Debug, Clone, Serialize)]
pub struct FrameSample {
    pub elapsed_ms: u64,
    pub progress: f64,
    pub velocity: f64,
    pub mode: PerformanceMode,
    pub active_scene: Option<usize>,
    pub cache_hits: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    pub frames: Vec<FrameSample>,
    pub peak_velocity: f64,
    pub modes: BTreeMap<String, usize>,
    pub cache: CacheStats,
}

/// Animate progress from `from` to `to` and stage every scene on each frame
pub async fn simulate(
    config: &AppConfig,
    scenes: usize,
    from: f64,
    to: f64,
    warm_cache: bool,
) -> Result<SimulationReport> {
    if scenes == 0 {
        bail!("a presentation needs at least one scene");
    }

    let mut stager = QuantumStager::new(config.quantum)?
        .with_velocity_window(config.playback.velocity_window);

    if warm_cache {
        for scene in 0..scenes {
            stager.pre_calculate_frames(scene, scenes, from, to, None)?;
        }
        tracing::info!(
            "Warmed staging cache with {} entries",
            stager.cache_stats().entries
        );
    }

    let mut animator = ProgressAnimator::new(config.playback);
    animator.set_progress(from);
    animator.animate_to(to);
    tracing::debug!(
        "Animating progress {} -> {} at {:?} per frame",
        animator.current(),
        animator.target(),
        animator.tick_duration()
    );

    let mut ticker = tokio::time::interval(animator.tick_duration());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let started = Instant::now();
    let mut frames = Vec::new();
    let mut modes: BTreeMap<String, usize> = BTreeMap::new();
    let mut peak_velocity: f64 = 0.0;

    loop {
        ticker.tick().await;
        let progress = animator.update();
        let elapsed = started.elapsed();

        stager.observe_scroll(progress, elapsed.as_secs_f64());
        let velocity = stager.velocity();
        let mode = config.performance.mode_for(velocity);
        peak_velocity = peak_velocity.max(velocity.abs());

        let metrics = (0..scenes)
            .map(|scene| stager.calculate(scene, scenes, progress))
            .collect::<scenestage_core::Result<Vec<QuantumStageMetrics>>>()?;

        let active_scene = metrics
            .iter()
            .position(|m| m.staging.stage == SceneStage::Active);
        let cache_hits = metrics.iter().filter(|m| m.quantum.cache_hit).count();

        tracing::debug!(
            progress,
            velocity,
            mode = %mode,
            "Staged frame {}",
            frames.len()
        );

        *modes.entry(mode.to_string()).or_default() += 1;
        frames.push(FrameSample {
            elapsed_ms: elapsed.as_millis() as u64,
            progress,
            velocity,
            mode,
            active_scene,
            cache_hits,
        });

        if !animator.is_animating() {
            break;
        }
    }

    Ok(SimulationReport {
        frames,
        peak_velocity,
        modes,
        cache: stager.cache_stats(),
    })
}

pub async fn run(
    config: &AppConfig,
    scenes: usize,
    from: f64,
    to: f64,
    warm_cache: bool,
    json: bool,
) -> Result<()> {
    let report = simulate(config, scenes, from, to, warm_cache).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!(
        "Simulated scroll {:.3} -> {:.3} over {} ms ({} frames):\n",
        from,
        to,
        config.playback.duration_ms,
        report.frames.len()
    );
    println!(
        "  {:>7}  {:>8} {:>9} {:<7} {:>6} {:>5}",
        "ms", "progress", "velocity", "mode", "active", "hits"
    );
    for frame in &report.frames {
        let active = frame
            .active_scene
            .map(|s| s.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  {:>7}  {:>8.4} {:>9.3} {:<7} {:>6} {:>5}",
            frame.elapsed_ms, frame.progress, frame.velocity, frame.mode, active, frame.cache_hits
        );
    }

    println!("\nPeak velocity: {:.3}/s", report.peak_velocity);
    for (mode, count) in &report.modes {
        println!("  {} mode: {} frames", mode, count);
    }
    let cache = &report.cache;
    println!(
        "Cache: {}/{} entries, {} hits, {} misses, {} evictions",
        cache.entries, cache.capacity, cache.hits, cache.misses, cache.evictions
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use scenestage_core::{Easing, PlaybackConfig};

    fn config(duration_ms: u64) -> AppConfig {
        AppConfig {
            playback: PlaybackConfig {
                fps: 50,
                duration_ms,
                easing: Easing::Linear,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_simulation_reaches_target() {
        let report = simulate(&config(1000), 3, 0.0, 1.0, false).await.unwrap();

        let last = report.frames.last().unwrap();
        assert_eq!(last.progress, 1.0);
        assert!(report.frames.len() >= 50);
        assert!(report.frames.windows(2).all(|w| w[1].progress >= w[0].progress));
        // one progress unit per second in linear playback
        assert!((report.peak_velocity - 1.0).abs() < 0.1);
        assert!(report.modes.get("medium").is_some_and(|&count| count > 0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_fast_flick_drops_to_low_mode() {
        let report = simulate(&config(200), 2, 0.0, 1.0, false).await.unwrap();
        assert!(report.peak_velocity > 2.0);
        assert!(report.frames.iter().any(|f| f.mode == PerformanceMode::Low));
    }

    #[tokio::test(start_paused = true)]
    async fn test_warm_cache_serves_frames() {
        let report = simulate(&config(1000), 2, 0.2, 0.8, true).await.unwrap();
        assert!(report.cache.hits > 0);
        assert!(report.frames.iter().any(|f| f.cache_hits > 0));
        assert!(report.frames.iter().any(|f| f.active_scene.is_some()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_scenes_rejected() {
        assert!(simulate(&config(100), 0, 0.0, 1.0, false).await.is_err());
    }
}
