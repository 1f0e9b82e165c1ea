//! Error taxonomy for curve derivation, simulation and configuration loading.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimulationError {
    #[error("Invalid curve configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid horizon: {0} weeks (must be at least 1)")]
    InvalidHorizon(usize),

    #[error("Invalid funding value {value} in week {week}")]
    InvalidFundingSeries { week: usize, value: f64 },

    #[error("Failed to read config file {path:?}: {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Failed to write report: {0}")]
    Report(#[from] std::io::Error),

    #[error("Failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SimulationError>;

impl SimulationError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}
