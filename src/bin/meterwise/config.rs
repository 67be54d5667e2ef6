use std::fs;
use std::path::{Path, PathBuf};

use meterwise::cluster::DEFAULT_RADIUS_M;
use meterwise::{Availability, SearchOptions};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Defaults for the CLI, loaded from a TOML file. Flags override them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Number of meters `nearest` reports (default: 5)
    #[serde(default = "default_limit")]
    pub limit: usize,

    /// Ignore meters farther than this from the destination (default: none)
    #[serde(default)]
    pub max_distance_m: Option<f64>,

    /// Which statuses `nearest` reports (default: parkable)
    #[serde(default)]
    pub availability: Availability,

    /// Linking radius for `cluster` (default: 20.0)
    #[serde(default = "default_cluster_radius")]
    pub cluster_radius_m: f64,
}

fn default_limit() -> usize {
    SearchOptions::default().limit
}

fn default_cluster_radius() -> f64 {
    DEFAULT_RADIUS_M
}

impl Default for Config {
    fn default() -> Self {
        Self {
            limit: default_limit(),
            max_distance_m: None,
            availability: Availability::default(),
            cluster_radius_m: default_cluster_radius(),
        }
    }
}

impl Config {
    /// Load from `path`, or fall back to defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), ?config, "loaded config");
        Ok(config)
    }

    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    pub fn search_options(&self) -> SearchOptions {
        SearchOptions {
            limit: self.limit,
            max_distance_m: self.max_distance_m,
            availability: self.availability,
        }
    }
}
