//! Configuration system
//!
//! Handles TOML config file parsing and merging of environment and CLI
//! overrides.

pub mod builder;
pub mod file;

pub use builder::ConfigBuilder;
pub use file::ConfigFile;

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Default registry API endpoint
pub const DEFAULT_API_URL: &str = "https://api.platformio.org";

/// Home directory name below the user's home
pub const HOME_DIR_NAME: &str = ".platformio";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,
    /// Registry access
    pub registry: RegistryConfig,
    /// Library storage
    pub library: LibraryConfig,
    /// ci command
    pub ci: CiConfig,
}

impl Config {
    /// Resolved home directory
    pub fn home_dir(&self) -> Result<PathBuf, ConfigError> {
        match &self.general.home_dir {
            Some(dir) => Ok(dir.clone()),
            None => dirs::home_dir()
                .map(|h| h.join(HOME_DIR_NAME))
                .ok_or(ConfigError::NoHomeDir),
        }
    }

    /// Resolved library storage directory
    pub fn storage_dir(&self) -> Result<PathBuf, ConfigError> {
        match &self.library.storage_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(self.home_dir()?.join("lib")),
        }
    }

    /// Registry request timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.registry.timeout_seconds.max(1))
    }
}

/// General configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GeneralConfig {
    /// Home directory for state and libraries
    pub home_dir: Option<PathBuf>,
}

/// Registry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Base URL of the registry API
    pub api_url: String,
    /// HTTP timeout in seconds
    pub timeout_seconds: u64,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            timeout_seconds: 30,
        }
    }
}

/// Library storage configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LibraryConfig {
    /// Where libraries are installed, `<home_dir>/lib` by default
    pub storage_dir: Option<PathBuf>,
}

/// ci command configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CiConfig {
    /// Command building a project, invoked with `--project-dir <dir>`
    pub build_command: Vec<String>,
}

impl Default for CiConfig {
    fn default() -> Self {
        Self {
            build_command: vec!["pio".to_string(), "run".to_string()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.registry.api_url, DEFAULT_API_URL);
        assert_eq!(config.registry.timeout_seconds, 30);
        assert_eq!(config.ci.build_command, vec!["pio", "run"]);
    }

    #[test]
    fn test_storage_dir_follows_home() {
        let mut config = Config::default();
        config.general.home_dir = Some(PathBuf::from("/opt/pio"));
        assert_eq!(config.storage_dir().unwrap(), PathBuf::from("/opt/pio/lib"));

        config.library.storage_dir = Some(PathBuf::from("/srv/libs"));
        assert_eq!(config.storage_dir().unwrap(), PathBuf::from("/srv/libs"));
    }

    #[test]
    fn test_partial_toml() {
        let config: Config = toml::from_str("[registry]\ntimeout_seconds = 5\n").unwrap();
        assert_eq!(config.registry.api_url, DEFAULT_API_URL);
        assert_eq!(config.timeout(), Duration::from_secs(5));
    }
}
