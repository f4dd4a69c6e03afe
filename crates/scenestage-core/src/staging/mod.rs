//! Cinematic scroll-staging engine
//!
//! Maps a single global scroll progress scalar onto per-scene lifecycle
//! stages and the continuous visual parameters a renderer applies as style
//! properties.
//!
//! # Architecture
//!
//! ## Atomic Layer
//! - `easing` - Pure easing curves (ultra smooth, anticipation, ice smooth)
//! - `stage` - Scene topology, lifecycle stage and metric value types
//! - `performance` - Velocity to rendering tier mapping
//! - `velocity` - Ring buffer of recent progress samples
//!
//! ## Molecular Layer
//! - `base` - Base stage calculator (pure, no shared state)
//! - `cache` - Insertion-ordered memoization cache
//! - `quantum` - High-precision calculator owning a cache and velocity tracker
//! - `shared` - Mutex-guarded stager for multi-threaded hosts
//!
//! # Usage
//!
//! ```ignore
//! use scenestage_core::staging::{calculate_scene_staging, QuantumStager};
//!
//! let metrics = calculate_scene_staging(1, 3, 0.4, &StagingConfig::default())?;
//!
//! let mut stager = QuantumStager::with_defaults();
//! stager.observe_scroll(0.4, frame_time_secs);
//! let metrics = stager.calculate(1, 3, 0.4)?;
//! ```

// Atomic Layer
pub mod easing;
pub mod performance;
pub mod stage;
pub mod velocity;

// Molecular Layer
pub mod base;
pub mod cache;
pub mod quantum;
pub mod shared;

pub use base::{calculate_next_scene_text_visibility, calculate_scene_staging};
pub use cache::{CacheKey, CacheStats, StagingCache};
pub use easing::{anticipation, ice_smooth, ultra_smooth, Easing};
pub use performance::{get_performance_mode, PerformanceMode};
pub use quantum::{QuantumMetrics, QuantumStageMetrics, QuantumStager};
pub use shared::SharedStager;
pub use stage::{SceneStage, SceneStageMetrics, SceneTopology};
pub use velocity::VelocityTracker;
