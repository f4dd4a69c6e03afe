use anyhow::{bail, Result};
use serde::Serialize;

use scenestage_core::{
    calculate_next_scene_text_visibility, calculate_scene_staging, AppConfig, QuantumStager,
    SceneStageMetrics,
};

#[derive(Debug, Serialize)]
struct StageRow {
    scene: usize,
    #[serde(flatten)]
    metrics: SceneStageMetrics,
    next_text_visibility: f64,
}

/// Print every scene's metrics at a single progress value
pub fn run(
    config: &AppConfig,
    scenes: usize,
    progress: f64,
    quantum: bool,
    json: bool,
) -> Result<()> {
    if scenes == 0 {
        bail!("a presentation needs at least one scene");
    }
    if quantum {
        return run_quantum(config, scenes, progress, json);
    }

    let rows = (0..scenes)
        .map(|scene| {
            Ok(StageRow {
                scene,
                metrics: calculate_scene_staging(scene, scenes, progress, &config.staging)?,
                next_text_visibility: calculate_next_scene_text_visibility(
                    scene + 1,
                    scenes,
                    progress,
                    &config.staging,
                )?,
            })
        })
        .collect::<scenestage_core::Result<Vec<_>>>()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    println!("Scene staging at progress {:.3} ({} scenes):\n", progress, scenes);
    println!(
        "  {:>5}  {:<9} {:>8} {:>6} {:>6} {:>8} {:>6} {:>4} {:>9}",
        "scene", "stage", "progress", "text", "bg", "offset", "scale", "z", "next text"
    );
    for row in &rows {
        let m = &row.metrics;
        println!(
            "  {:>5}  {:<9} {:>8.3} {:>6.3} {:>6.3} {:>8.2} {:>6.3} {:>4} {:>9.3}",
            row.scene,
            m.stage,
            m.progress,
            m.text_visibility,
            m.background_opacity,
            m.transform_y,
            m.scale,
            m.z_index,
            row.next_text_visibility
        );
    }

    Ok(())
}

fn run_quantum(config: &AppConfig, scenes: usize, progress: f64, json: bool) -> Result<()> {
    let mut stager = QuantumStager::new(config.quantum)?;
    let rows = (0..scenes)
        .map(|scene| stager.calculate(scene, scenes, progress))
        .collect::<scenestage_core::Result<Vec<_>>>()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    println!(
        "Quantized staging at progress {:.4} (precision {}, {} scenes):\n",
        progress, config.quantum.precision, scenes
    );
    println!(
        "  {:>5}  {:<9} {:>8} {:>6} {:>6} {:>8} {:>6} {:>4} {:>6} {:>7} {:>7}",
        "scene", "stage", "progress", "text", "bg", "offset", "scale", "z", "morph", "antic.", "elastic"
    );
    for (scene, m) in rows.iter().enumerate() {
        let s = &m.staging;
        println!(
            "  {:>5}  {:<9} {:>8.3} {:>6.3} {:>6.3} {:>8.2} {:>6.3} {:>4} {:>6.3} {:>7.3} {:>7.3}",
            scene,
            s.stage,
            s.progress,
            s.text_visibility,
            s.background_opacity,
            s.transform_y,
            s.scale,
            s.z_index,
            m.morph_progress,
            m.anticipation_level,
            m.elasticity
        );
    }

    Ok(())
}
