//! Configuration for a reputation node.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Error types for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    Parse(#[from] serde_yaml::Error),
}

/// Configuration for a reputation node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContractConfig {
    /// Penalty service configuration
    pub penalty: PenaltyConfig,
    /// Query defaults
    pub query: QueryConfig,
    /// World state location
    pub state: StateConfig,
}

impl ContractConfig {
    /// Load config from YAML file.
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Serialize to YAML.
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }

    /// Read and parse a YAML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_yaml(&yaml)?)
    }
}

/// Penalty service configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PenaltyConfig {
    /// Send enforcement requests at all
    pub enabled: bool,
    /// Base URL; requests go to `{base_url}/rpc/agreements/enforce-penalty-rules`
    pub base_url: String,
    /// Request timeout (seconds)
    pub timeout_secs: u64,
}

impl PenaltyConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for PenaltyConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: "http://localhost:8181/tourism-block/v1".to_string(),
            timeout_secs: 60,
        }
    }
}

/// Query defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Page size used when counting evaluations without an explicit one
    pub default_page_size: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            default_page_size: 100,
        }
    }
}

/// World state location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StateConfig {
    /// Snapshot file of the world state
    pub path: PathBuf,
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("reputation-state.json"),
        }
    }
}
