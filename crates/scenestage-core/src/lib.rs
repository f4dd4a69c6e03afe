pub mod config;
pub mod error;
pub mod staging;

pub use config::{
    AppConfig, GeneralConfig, PerformanceConfig, PlaybackConfig, QuantumStagingConfig,
    StagingConfig,
};
pub use error::{Error, Result};
pub use staging::{
    calculate_next_scene_text_visibility, calculate_scene_staging, get_performance_mode,
    CacheStats, Easing, PerformanceMode, QuantumMetrics, QuantumStageMetrics, QuantumStager,
    SceneStage, SceneStageMetrics, SceneTopology, SharedStager, VelocityTracker,
};
