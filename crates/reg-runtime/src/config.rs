//! Node configuration

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use reg_core::{validate_registry_name, Link};
use reg_sync::DEFAULT_SYNC_TIMEOUT;
use reg_transport::DEFAULT_CONNECT_TIMEOUT;
use reg_wire::MAX_FRAME_SIZE;
use serde::{Deserialize, Deserializer};
use thiserror::Error;

/// Default listen address
pub const DEFAULT_LISTEN: &str = "127.0.0.1:7100";

/// Configuration errors, reported at startup
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid registry {name:?}: {reason}")]
    InvalidRegistry { name: String, reason: String },

    #[error("registry {registry:?}: invalid link {link:?}: {reason}")]
    InvalidLink {
        registry: String,
        link: String,
        reason: String,
    },

    #[error("max_frame_size must be positive")]
    ZeroFrameSize,
}

/// Log output format
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Logging section
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
    pub format: LogFormat,
    /// `EnvFilter` directive; `RUST_LOG` takes precedence
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            format: LogFormat::Pretty,
            filter: "info".into(),
        }
    }
}

/// One registry to create at startup
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegistryConfig {
    pub name: String,
    /// Links in `registry@instance` form
    #[serde(default)]
    pub links: Vec<String>,
}

impl RegistryConfig {
    /// Parse the configured links
    pub fn parsed_links(&self) -> Result<Vec<Link>, ConfigError> {
        self.links
            .iter()
            .map(|text| {
                text.parse().map_err(|e: reg_core::RegError| ConfigError::InvalidLink {
                    registry: self.name.clone(),
                    link: text.clone(),
                    reason: e.to_string(),
                })
            })
            .collect()
    }
}

/// Node configuration
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NodeConfig {
    /// Address the JSON-RPC server binds to
    pub listen: String,
    /// Address peers use to reach this node; defaults to the bound address
    pub instance: Option<String>,
    /// Bound on one outbound sync call
    #[serde(deserialize_with = "deserialize_duration")]
    pub sync_timeout: Duration,
    #[serde(deserialize_with = "deserialize_duration")]
    pub connect_timeout: Duration,
    pub max_frame_size: usize,
    pub log: LogConfig,
    pub registries: Vec<RegistryConfig>,
}

impl Default for NodeConfig {
    fn default() -> Self {
        NodeConfig {
            listen: DEFAULT_LISTEN.into(),
            instance: None,
            sync_timeout: DEFAULT_SYNC_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            max_frame_size: MAX_FRAME_SIZE,
            log: LogConfig::default(),
            registries: Vec::new(),
        }
    }
}

impl NodeConfig {
    /// Parse and validate TOML text
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: NodeConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_frame_size == 0 {
            return Err(ConfigError::ZeroFrameSize);
        }

        let mut seen = HashSet::new();
        for registry in &self.registries {
            validate_registry_name(&registry.name).map_err(|e| ConfigError::InvalidRegistry {
                name: registry.name.clone(),
                reason: e.to_string(),
            })?;
            if !seen.insert(registry.name.as_str()) {
                return Err(ConfigError::InvalidRegistry {
                    name: registry.name.clone(),
                    reason: "declared twice".into(),
                });
            }
            registry.parsed_links()?;
        }
        Ok(())
    }

    /// Add a registry unless one with that name is already configured
    pub fn add_registry(&mut self, name: impl Into<String>) {
        let name = name.into();
        if !self.registries.iter().any(|r| r.name == name) {
            self.registries.push(RegistryConfig {
                name,
                links: Vec::new(),
            });
        }
    }
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let text = String::deserialize(deserializer)?;
    humantime::parse_duration(&text).map_err(serde::de::Error::custom)
}
