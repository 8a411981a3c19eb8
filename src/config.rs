//! User-level configuration
//!
//! Sources, lowest priority first:
//! - built-in defaults
//! - `~/.config/hercycle/config.toml`
//! - `HERCYCLE_DATA_FILE`
//!
//! Command-line flags are applied on top by the caller.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::PredictionSettings;

pub const DATA_FILE_ENV: &str = "HERCYCLE_DATA_FILE";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read {}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config {}: {}", .path.display(), .source)]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct Config {
    /// Encrypted store location; the platform data dir when unset.
    #[serde(default)]
    pub data_file: Option<PathBuf>,

    #[serde(default)]
    pub prediction: PredictionSettings,
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match Self::user_config_path().filter(|p| p.exists()) {
            Some(path) => Self::from_file(&path)?,
            None => Config::default(),
        };

        if let Some(path) = std::env::var_os(DATA_FILE_ENV).filter(|v| !v.is_empty()) {
            config.data_file = Some(PathBuf::from(path));
        }

        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("hercycle").join("config.toml"))
    }
}
