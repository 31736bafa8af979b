//! Configuration loading and management
//!
//! Values are resolved in three layers: built-in defaults, an optional YAML
//! file named by `RELAY_CONFIG`, then environment overrides (`PORT` first of
//! all, which is the only knob most deployments touch).

use crate::core::error::RelayError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable naming an optional YAML configuration file
pub const CONFIG_PATH_ENV: &str = "RELAY_CONFIG";

/// What to do with a peer whose outbound queue is full
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlowConsumerPolicy {
    /// Discard the frame for that peer only
    #[default]
    Drop,
    /// Evict the peer; its socket is closed and it leaves its room
    Disconnect,
}

/// Complete configuration for the relay server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Bind address
    pub host: String,

    /// Listening port, shared by the static page and the WebSocket endpoint
    pub port: u16,

    /// Directory holding the static page
    pub static_dir: PathBuf,

    /// File served for `/` and `/index.html`
    pub index_file: String,

    /// Capacity of each peer's outbound queue
    pub peer_buffer: usize,

    /// Behavior when a peer's outbound queue is full
    pub slow_consumer: SlowConsumerPolicy,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            static_dir: PathBuf::from("."),
            index_file: "index.html".to_string(),
            peer_buffer: 256,
            slow_consumer: SlowConsumerPolicy::Drop,
        }
    }
}

impl RelayConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path))?;
        Self::from_yaml_str(&content)
    }

    /// Load configuration from a YAML string
    ///
    /// Fields missing from the document keep their default value.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Resolve the configuration from the process environment
    pub fn load() -> Result<Self> {
        let mut config = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => Self::from_yaml_file(&path)?,
            Err(_) => Self::default(),
        };

        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides using the given lookup
    ///
    /// A variable that is set but cannot be parsed is an error rather than
    /// a silent fallback to the previous value.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), RelayError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup("PORT") {
            self.port = port
                .trim()
                .parse()
                .map_err(|_| RelayError::Config(format!("PORT is not a valid port: {:?}", port)))?;
        }

        if let Some(host) = lookup("RELAY_HOST") {
            self.host = host;
        }

        if let Some(dir) = lookup("RELAY_STATIC_DIR") {
            self.static_dir = PathBuf::from(dir);
        }

        if let Some(buffer) = lookup("RELAY_PEER_BUFFER") {
            self.peer_buffer = buffer.trim().parse().map_err(|_| {
                RelayError::Config(format!("RELAY_PEER_BUFFER is not a number: {:?}", buffer))
            })?;
        }

        Ok(())
    }

    /// Check invariants that serde cannot express
    pub fn validate(&self) -> Result<(), RelayError> {
        if self.peer_buffer == 0 {
            return Err(RelayError::Config(
                "peer_buffer must be at least 1".to_string(),
            ));
        }

        if self.index_file.trim().is_empty() {
            return Err(RelayError::Config("index_file must not be empty".to_string()));
        }

        Ok(())
    }

    /// Address the listener binds to
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Full path of the static page
    pub fn index_path(&self) -> PathBuf {
        self.static_dir.join(&self.index_file)
    }
}
