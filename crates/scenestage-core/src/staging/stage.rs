//! Atomic Layer: Scene topology, lifecycle stages and computed metrics

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Lifecycle stage of a scene, ordered as progress increases through its slice
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SceneStage {
    Hidden,
    Entering,
    Active,
    Exiting,
    Gone,
}

impl SceneStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hidden => "hidden",
            Self::Entering => "entering",
            Self::Active => "active",
            Self::Exiting => "exiting",
            Self::Gone => "gone",
        }
    }

    /// Whether the scene contributes anything to the rendered frame
    pub fn is_visible(&self) -> bool {
        !matches!(self, Self::Hidden | Self::Gone)
    }
}

impl std::fmt::Display for SceneStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// A validated scene position within a presentation.
///
/// Scene `i` of `n` owns the progress slice `[i/n, (i+1)/n)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SceneTopology {
    scene_index: usize,
    total_scenes: usize,
}

impl SceneTopology {
    pub fn new(scene_index: usize, total_scenes: usize) -> Result<Self> {
        if total_scenes == 0 || scene_index >= total_scenes {
            return Err(Error::InvalidTopology {
                scene_index,
                total_scenes,
            });
        }
        Ok(Self {
            scene_index,
            total_scenes,
        })
    }

    #[inline]
    pub fn scene_index(&self) -> usize {
        self.scene_index
    }

    #[inline]
    pub fn total_scenes(&self) -> usize {
        self.total_scenes
    }

    /// Width of every scene's slice
    #[inline]
    pub fn scene_size(&self) -> f64 {
        1.0 / self.total_scenes as f64
    }

    #[inline]
    pub fn scene_start(&self) -> f64 {
        self.scene_index as f64 * self.scene_size()
    }

    #[inline]
    pub fn scene_end(&self) -> f64 {
        self.scene_start() + self.scene_size()
    }

    /// Stacking order; the active scene is lifted above all neighbours
    #[inline]
    pub fn z_index(&self, stage: SceneStage) -> i32 {
        let base = i32::try_from(self.total_scenes - self.scene_index).unwrap_or(i32::MAX);
        if stage == SceneStage::Active {
            base.saturating_add(10)
        } else {
            base
        }
    }
}

/// Reject NaN and infinities before they can leak into metric fields
pub(crate) fn ensure_finite(progress: f64) -> Result<f64> {
    if progress.is_finite() {
        Ok(progress)
    } else {
        Err(Error::NonFiniteProgress(progress))
    }
}

/// Visual parameters for one scene at one global scroll position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SceneStageMetrics {
    pub stage: SceneStage,
    /// Progress through the current stage (0.0-1.0)
    pub progress: f64,
    pub text_visibility: f64,
    pub background_opacity: f64,
    /// Vertical offset in display units
    pub transform_y: f64,
    pub scale: f64,
    pub z_index: i32,
}
