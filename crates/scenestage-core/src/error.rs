use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid scene topology: scene {scene_index} of {total_scenes}")]
    InvalidTopology {
        scene_index: usize,
        total_scenes: usize,
    },

    #[error("Scroll progress is not finite: {0}")]
    NonFiniteProgress(f64),

    #[error("Invalid staging configuration: {0}")]
    InvalidConfig(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
