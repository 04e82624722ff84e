use thiserror::Error;

use crate::core::SimulationError;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Simulation(#[from] SimulationError),

    #[error("Storage error: {0}")]
    Storage(String),
}

// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
