//! Molecular Layer: Base stage calculator
//!
//! A pure function of `(scene, global progress, config)`. Out-of-range
//! progress is clamped into the scene's slice, so scrolling in either
//! direction visits the same stages in mirrored order.

use super::easing::ultra_smooth;
use super::stage::{ensure_finite, SceneStage, SceneStageMetrics, SceneTopology};
use crate::config::StagingConfig;
use crate::Result;

/// Background opacity while a scene is fully on screen
const ACTIVE_OPACITY: f64 = 0.9;

/// Background opacity a scene fades down to before it is gone
const EXIT_OPACITY_FLOOR: f64 = 0.1;

/// Vertical slide distance at the outer edge of entering/exiting
const SLIDE_DISTANCE: f64 = 50.0;

/// Scale at the outer edge of entering/exiting
const EDGE_SCALE: f64 = 0.95;

/// Compute the lifecycle stage and visual metrics of one scene
pub fn calculate_scene_staging(
    scene_index: usize,
    total_scenes: usize,
    global_scroll_progress: f64,
    config: &StagingConfig,
) -> Result<SceneStageMetrics> {
    config.validate()?;
    let topology = SceneTopology::new(scene_index, total_scenes)?;
    let global = ensure_finite(global_scroll_progress)?;

    let scene_size = topology.scene_size();
    let scene_start = topology.scene_start();
    let pre_roll = scene_size * 0.5;
    let local = ((global - scene_start) / scene_size).clamp(0.0, 1.0);

    let content_phase = config.content_phase;
    let transition_phase = config.transition_phase();

    let (stage, progress) = if global < scene_start - pre_roll {
        (SceneStage::Hidden, 0.0)
    } else if global < scene_start {
        (
            SceneStage::Entering,
            (global - (scene_start - pre_roll)) / pre_roll,
        )
    } else if local <= content_phase {
        (SceneStage::Active, local / content_phase)
    } else if local < 1.0 {
        (
            SceneStage::Exiting,
            (local - content_phase) / transition_phase,
        )
    } else {
        (SceneStage::Gone, 1.0)
    };
    let progress = progress.clamp(0.0, 1.0);

    let text_visibility = match stage {
        SceneStage::Hidden | SceneStage::Gone => 0.0,
        SceneStage::Entering => (progress * 2.0).min(1.0),
        SceneStage::Active => 1.0,
        SceneStage::Exiting => text_fade_out(local, config.text_fade_out),
    };

    let background_opacity = match stage {
        SceneStage::Hidden | SceneStage::Gone => 0.0,
        SceneStage::Entering => ACTIVE_OPACITY * progress,
        SceneStage::Active => ACTIVE_OPACITY,
        SceneStage::Exiting => ACTIVE_OPACITY - (ACTIVE_OPACITY - EXIT_OPACITY_FLOOR) * progress,
    };

    let eased = ultra_smooth(progress);
    let (transform_y, scale) = match stage {
        SceneStage::Hidden => (SLIDE_DISTANCE, EDGE_SCALE),
        SceneStage::Entering => (
            SLIDE_DISTANCE * (1.0 - eased),
            EDGE_SCALE + (1.0 - EDGE_SCALE) * eased,
        ),
        SceneStage::Active => (0.0, 1.0),
        SceneStage::Exiting => (-SLIDE_DISTANCE * eased, 1.0 - (1.0 - EDGE_SCALE) * eased),
        SceneStage::Gone => (-SLIDE_DISTANCE, EDGE_SCALE),
    };

    Ok(SceneStageMetrics {
        stage,
        progress,
        text_visibility,
        background_opacity,
        transform_y,
        scale,
        z_index: topology.z_index(stage),
    })
}

/// Text stays fully visible until `pivot`, then falls linearly to 0 at the slice end
fn text_fade_out(local: f64, pivot: f64) -> f64 {
    if local < pivot {
        1.0
    } else {
        (1.0 - (local - pivot) / (1.0 - pivot)).clamp(0.0, 1.0)
    }
}

/// Pre-fade visibility for the text of the scene that comes next.
///
/// The fade window opens `text_fade_in` of the way through the preceding
/// slice and closes at the next scene's own start.
pub fn calculate_next_scene_text_visibility(
    next_scene_index: usize,
    total_scenes: usize,
    global_scroll_progress: f64,
    config: &StagingConfig,
) -> Result<f64> {
    config.validate()?;
    if total_scenes > 0 && next_scene_index >= total_scenes {
        return Ok(0.0);
    }
    let topology = SceneTopology::new(next_scene_index, total_scenes)?;
    let global = ensure_finite(global_scroll_progress)?;

    let window = topology.scene_size() * (1.0 - config.text_fade_in);
    let window_start = topology.scene_start() - window;
    let fraction = ((global - window_start) / window).clamp(0.0, 1.0);

    Ok(ultra_smooth(fraction))
}
