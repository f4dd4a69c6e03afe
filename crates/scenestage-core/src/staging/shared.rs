//! Molecular Layer: Thread-safe handle to a session stager
//!
//! Every operation holds the lock for its whole read-modify-write, so two
//! threads can never observe different metrics for the same cache key.

use std::sync::{Arc, Mutex, MutexGuard};

use super::cache::CacheStats;
use super::quantum::{QuantumStageMetrics, QuantumStager};
use crate::Result;

/// Cloneable, mutex-guarded [`QuantumStager`] for multi-threaded hosts
#[derive(Debug, Clone, Default)]
pub struct SharedStager {
    inner: Arc<Mutex<QuantumStager>>,
}

impl SharedStager {
    pub fn new(stager: QuantumStager) -> Self {
        Self {
            inner: Arc::new(Mutex::new(stager)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, QuantumStager> {
        // The cache only ever holds values computed here, so a panic elsewhere
        // cannot leave it inconsistent.
        self.inner.lock().unwrap_or_else(|poisoned| {
            tracing::warn!("Recovering staging cache from a poisoned lock");
            poisoned.into_inner()
        })
    }

    pub fn calculate(
        &self,
        scene_index: usize,
        total_scenes: usize,
        global_scroll_progress: f64,
    ) -> Result<QuantumStageMetrics> {
        self.lock()
            .calculate(scene_index, total_scenes, global_scroll_progress)
    }

    pub fn observe_scroll(&self, progress: f64, timestamp_secs: f64) {
        self.lock().observe_scroll(progress, timestamp_secs);
    }

    pub fn velocity(&self) -> f64 {
        self.lock().velocity()
    }

    pub fn pre_calculate_frames(
        &self,
        scene_index: usize,
        total_scenes: usize,
        start_progress: f64,
        end_progress: f64,
        steps: Option<u32>,
    ) -> Result<()> {
        self.lock().pre_calculate_frames(
            scene_index,
            total_scenes,
            start_progress,
            end_progress,
            steps,
        )
    }

    pub fn clear_cache(&self) {
        self.lock().clear_cache();
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.lock().cache_stats()
    }
}
