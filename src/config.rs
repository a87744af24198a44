//! Settings for discovery and watching
//!
//! Everything has a default matching the stock behaviour, so a missing config
//! file is never fatal. The file lives at `<config dir>/ps4-input/config.toml`:
//!
//! ```toml
//! [discovery]
//! device_dir = "/dev/input"
//! device_prefix = "event"
//!
//! [watcher]
//! queue_capacity = 10
//! read_error_backoff_ms = 0
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct DiscoverySettings {
    /// Directory holding the device nodes
    pub device_dir: PathBuf,
    /// File name prefix of the nodes to consider
    pub device_prefix: String,
}

impl Default for DiscoverySettings {
    fn default() -> Self {
        Self {
            device_dir: PathBuf::from("/dev/input"),
            device_prefix: "event".to_string(),
        }
    }
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct WatcherSettings {
    /// Events buffered for the consumer before new ones are dropped
    pub queue_capacity: usize,
    /// Pause after a failed read, 0 retries immediately
    pub read_error_backoff_ms: u64,
}

impl Default for WatcherSettings {
    fn default() -> Self {
        Self {
            queue_capacity: 10,
            read_error_backoff_ms: 0,
        }
    }
}

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub discovery: DiscoverySettings,
    pub watcher: WatcherSettings,
}

impl Settings {
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("ps4-input").join("config.toml"))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Loaded settings from {}: {:?}", path.display(), settings);
        Ok(settings)
    }

    /// Loads the user config file, or defaults when there is none
    pub fn load_or_default() -> Result<Self, ConfigError> {
        Self::load_or_default_from(Self::default_path())
    }

    /// Loads `path` when it names an existing file, otherwise defaults
    pub fn load_or_default_from(path: Option<PathBuf>) -> Result<Self, ConfigError> {
        match path {
            Some(path) if path.exists() => {
                info!("Loading settings from {}", path.display());
                Self::load(path)
            }
            _ => {
                info!("No config file found, using default settings");
                Ok(Self::default())
            }
        }
    }
}
