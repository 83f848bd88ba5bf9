//! Configuration for the byte-size event trainer.

use crate::core::TrainParams;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration: where artifacts live and how to train.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Ingested NDJSON events (ingest output, train input)
    pub events_path: PathBuf,

    /// Directory for per-run model artifacts
    pub models_dir: PathBuf,

    /// "Latest" training receipt, overwritten on every run
    pub receipt_path: PathBuf,

    /// Optimiser settings
    pub training: TrainParams,
}

impl Default for Config {
    fn default() -> Self {
        let ml_dir = PathBuf::from("ml");

        Self {
            events_path: ml_dir.join("data").join("events.ndjson"),
            models_dir: ml_dir.join("models"),
            receipt_path: ml_dir.join("receipts").join("latest-train-receipt.json"),
            training: TrainParams::default(),
        }
    }
}

impl Config {
    /// Load configuration from a JSON file. Fields left out keep their defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
        let config: Config =
            serde_json::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.check()?;
        Ok(config)
    }

    /// Load from `path` if given, otherwise use defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load_from(path),
            None => Ok(Self::default()),
        }
    }

    /// Save configuration as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::IoError(e.to_string()))?;
        }

        let content = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        std::fs::write(path, content).map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }

    fn check(&self) -> Result<(), ConfigError> {
        self.training
            .validate()
            .map_err(|e| ConfigError::InvalidValue(format!("training: {e}")))
    }
}

/// Configuration errors.
#[derive(Debug)]
pub enum ConfigError {
    IoError(String),
    ParseError(String),
    SerializeError(String),
    InvalidValue(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {e}"),
            ConfigError::ParseError(e) => write!(f, "Parse error: {e}"),
            ConfigError::SerializeError(e) => write!(f, "Serialize error: {e}"),
            ConfigError::InvalidValue(e) => write!(f, "Invalid value: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}
