use anyhow::{bail, Result};

use scenestage_core::{calculate_scene_staging, AppConfig, QuantumStager, SceneStage};

/// A stage change observed while sweeping progress forward
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    pub from: SceneStage,
    pub to: SceneStage,
    pub at: f64,
}

/// Sweep progress over [0, 1] and record where a scene changes stage
pub fn scene_transitions(
    config: &AppConfig,
    stager: Option<&mut QuantumStager>,
    scene: usize,
    scenes: usize,
    steps: u32,
) -> Result<Vec<Transition>> {
    if steps == 0 {
        bail!("timeline needs at least one step");
    }

    let mut stager = stager;
    let mut transitions = Vec::new();
    let mut previous: Option<SceneStage> = None;

    for step in 0..=steps {
        let progress = step as f64 / steps as f64;
        let stage = match stager.as_deref_mut() {
            Some(stager) => stager.calculate(scene, scenes, progress)?.staging.stage,
            None => calculate_scene_staging(scene, scenes, progress, &config.staging)?.stage,
        };
        if let Some(from) = previous {
            if from != stage {
                transitions.push(Transition {
                    from,
                    to: stage,
                    at: progress,
                });
            }
        }
        previous = Some(stage);
    }

    Ok(transitions)
}

pub fn run(config: &AppConfig, scenes: usize, steps: u32, quantum: bool) -> Result<()> {
    if scenes == 0 {
        bail!("a presentation needs at least one scene");
    }
    let mut stager = if quantum {
        Some(QuantumStager::new(config.quantum)?)
    } else {
        None
    };

    println!(
        "{} stage timeline ({} scenes, {} steps):\n",
        if quantum { "Quantized" } else { "Base" },
        scenes,
        steps
    );

    for scene in 0..scenes {
        let initial = match stager.as_mut() {
            Some(stager) => stager.calculate(scene, scenes, 0.0)?.staging.stage,
            None => calculate_scene_staging(scene, scenes, 0.0, &config.staging)?.stage,
        };
        let transitions = scene_transitions(config, stager.as_mut(), scene, scenes, steps)?;

        println!("  scene {} (starts {}):", scene, initial);
        for t in &transitions {
            println!("    {:.3}  {} -> {}", t.at, t.from, t.to);
        }
    }

    Ok(())
}
