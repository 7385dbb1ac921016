//! Configuration builder
//!
//! Merges configuration from files, environment variables and CLI arguments.

use crate::config::{Config, ConfigFile};
use crate::error::ConfigError;

use std::path::PathBuf;

/// Environment variable overriding the home directory
pub const HOME_DIR_ENV: &str = "PLATFORMIO_HOME_DIR";

/// Environment variable overriding the registry API URL
pub const API_URL_ENV: &str = "PLATFORMIO_API_URL";

/// Builder for merging configuration sources
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    /// Load configuration from a file
    ///
    /// An explicit path must exist; default locations are optional.
    pub fn with_file(mut self, path: Option<&str>) -> Result<Self, ConfigError> {
        let file_config = match path {
            Some(path) => Some(ConfigFile::load(path)?),
            None => ConfigFile::load_default()?,
        };

        if let Some(cfg) = file_config {
            self.config = cfg;
        }

        Ok(self)
    }

    /// Apply environment overrides read through `lookup`
    pub fn with_env_vars<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(home) = lookup(HOME_DIR_ENV).filter(|v| !v.is_empty()) {
            self.config.general.home_dir = Some(PathBuf::from(home));
        }
        if let Some(url) = lookup(API_URL_ENV).filter(|v| !v.is_empty()) {
            self.config.registry.api_url = url;
        }
        self
    }

    /// Apply overrides from the process environment
    pub fn with_env(self) -> Self {
        self.with_env_vars(|name| std::env::var(name).ok())
    }

    /// Override with CLI home directory
    pub fn with_home_dir(mut self, dir: Option<PathBuf>) -> Self {
        if let Some(d) = dir {
            self.config.general.home_dir = Some(d);
        }
        self
    }

    /// Override with CLI storage directory
    pub fn with_storage_dir(mut self, dir: Option<PathBuf>) -> Self {
        if let Some(d) = dir {
            self.config.library.storage_dir = Some(d);
        }
        self
    }

    /// Override with CLI registry URL
    pub fn with_api_url(mut self, url: Option<String>) -> Self {
        if let Some(u) = url {
            self.config.registry.api_url = u;
        }
        self
    }

    /// Build the final configuration
    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
