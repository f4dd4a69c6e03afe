//! Molecular Layer: Insertion-ordered memoization cache for staged metrics
//!
//! Eviction drops the oldest inserted entry once capacity is reached. Reads
//! never refresh an entry's age.

use std::collections::{HashMap, VecDeque};

use serde::Serialize;

use super::quantum::QuantumStageMetrics;

/// Cache key: scene identity plus progress quantized to an integer step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub scene_index: usize,
    pub total_scenes: usize,
    pub quantized_step: i64,
}

impl CacheKey {
    /// Quantize `progress` to `precision` and combine it with the scene identity
    pub fn new(scene_index: usize, total_scenes: usize, progress: f64, precision: f64) -> Self {
        Self {
            scene_index,
            total_scenes,
            quantized_step: (progress / precision).round() as i64,
        }
    }

    /// The progress value this key stands for
    #[inline]
    pub fn quantized_progress(&self, precision: f64) -> f64 {
        self.quantized_step as f64 * precision
    }
}

/// Counters describing cache usage since creation or the last clear
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub capacity: usize,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

#[derive(Debug, Clone)]
pub struct StagingCache {
    entries: HashMap<CacheKey, QuantumStageMetrics>,
    /// Keys in insertion order, oldest first
    order: VecDeque<CacheKey>,
    capacity: usize,
    hits: u64,
    misses: u64,
    evictions: u64,
}

impl StagingCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: HashMap::with_capacity(capacity),
            order: VecDeque::with_capacity(capacity),
            capacity,
            hits: 0,
            misses: 0,
            evictions: 0,
        }
    }

    /// Look up a key, counting the hit or miss
    pub fn get(&mut self, key: &CacheKey) -> Option<QuantumStageMetrics> {
        match self.entries.get(key) {
            Some(metrics) => {
                self.hits += 1;
                Some(*metrics)
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    /// Look up a key without touching the counters
    pub fn peek(&self, key: &CacheKey) -> Option<&QuantumStageMetrics> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &CacheKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Insert a computed value, evicting the oldest entry when full.
    ///
    /// An existing key keeps its original insertion position.
    pub fn insert(&mut self, key: CacheKey, metrics: QuantumStageMetrics) {
        if let Some(existing) = self.entries.get_mut(&key) {
            *existing = metrics;
            return;
        }

        while self.entries.len() >= self.capacity {
            let Some(oldest) = self.order.pop_front() else {
                break;
            };
            self.entries.remove(&oldest);
            self.evictions += 1;
            tracing::debug!(
                scene = oldest.scene_index,
                step = oldest.quantized_step,
                "Evicted oldest staging cache entry"
            );
        }

        self.entries.insert(key, metrics);
        self.order.push_back(key);
    }

    /// Drop every entry and reset the counters
    pub fn clear(&mut self) {
        let dropped = self.entries.len();
        self.entries.clear();
        self.order.clear();
        self.hits = 0;
        self.misses = 0;
        self.evictions = 0;
        tracing::debug!("Cleared staging cache ({} entries)", dropped);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.entries.len(),
            capacity: self.capacity,
            hits: self.hits,
            misses: self.misses,
            evictions: self.evictions,
        }
    }
}
