//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use crate::config::schema::AwaitConfig;

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load configuration from a TOML file.
///
/// The result is not validated yet: command-line overrides are applied on
/// top of it first.
pub fn load_config(path: &Path) -> Result<AwaitConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: AwaitConfig = toml::from_str(&content).map_err(ConfigError::Parse)?;
    tracing::debug!(path = %path.display(), "Configuration file loaded");
    Ok(config)
}
