//! Application settings
//!
//! User-adjustable switches persisted in `<home>/appstate.json`. Environment
//! variables named `PLATFORMIO_SETTING_<NAME>` take precedence over stored
//! values.

use crate::error::{ConfigError, DomainError};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// State file name inside the home directory
pub const STATE_FILE_NAME: &str = "appstate.json";

/// Default prefix of environment overrides
pub const ENV_PREFIX: &str = "PLATFORMIO_SETTING_";

/// Prompt for input when a choice is ambiguous
pub const ENABLE_PROMPTS: &str = "enable_prompts";

/// Force verbose output when processing environments
pub const FORCE_VERBOSE: &str = "force_verbose";

/// Definition of a known setting
#[derive(Debug, Clone, Copy)]
pub struct SettingDef {
    pub name: &'static str,
    pub description: &'static str,
    pub default: bool,
}

/// All known settings
pub const SETTINGS: &[SettingDef] = &[
    SettingDef {
        name: ENABLE_PROMPTS,
        description: "Can prompt the user for input when a choice is ambiguous",
        default: true,
    },
    SettingDef {
        name: FORCE_VERBOSE,
        description: "Force verbose output when processing environments",
        default: false,
    },
];

fn definition(name: &str) -> Result<&'static SettingDef, DomainError> {
    SETTINGS
        .iter()
        .find(|d| d.name == name)
        .ok_or_else(|| DomainError::UnknownSetting(name.to_string()))
}

/// Parse a boolean setting value (`yes`, `no`, `true`, `0`, `on`, ...)
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "y" | "on" => Some(true),
        "0" | "false" | "no" | "n" | "off" => Some(false),
        _ => None,
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct AppState {
    #[serde(default)]
    settings: BTreeMap<String, bool>,
}

/// Resolved value of one setting
#[derive(Debug, Clone, Serialize)]
pub struct SettingEntry {
    pub name: String,
    pub value: bool,
    pub default: bool,
    pub description: String,
}

/// Persistent application settings
#[derive(Debug)]
pub struct Settings {
    path: PathBuf,
    state: AppState,
    env_prefix: String,
}

impl Settings {
    /// Load settings from the home directory; a missing state file is empty
    pub fn load(home_dir: &Path) -> Result<Self, ConfigError> {
        let path = home_dir.join(STATE_FILE_NAME);
        let state = if path.is_file() {
            let content = std::fs::read_to_string(&path)?;
            serde_json::from_str(&content)?
        } else {
            AppState::default()
        };

        Ok(Self {
            path,
            state,
            env_prefix: ENV_PREFIX.to_string(),
        })
    }

    /// Use a different environment variable prefix
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Resolve a setting: environment, then stored value, then default
    pub fn get(&self, name: &str) -> Result<bool, DomainError> {
        let def = definition(name)?;

        let env_name = format!("{}{}", self.env_prefix, name.to_uppercase());
        if let Ok(raw) = std::env::var(&env_name) {
            match parse_bool(&raw) {
                Some(v) => return Ok(v),
                None => log::warn!("Ignoring invalid value '{}' of {}", raw, env_name),
            }
        }

        Ok(self.state.settings.get(name).copied().unwrap_or(def.default))
    }

    /// Store a new value
    pub fn set(&mut self, name: &str, value: &str) -> Result<bool, crate::error::AppError> {
        definition(name)?;
        let parsed = parse_bool(value).ok_or_else(|| DomainError::InvalidSettingValue {
            name: name.to_string(),
            value: value.to_string(),
            reason: "expected a boolean (yes/no, true/false, 1/0)".to_string(),
        })?;

        self.state.settings.insert(name.to_string(), parsed);
        self.save()?;
        Ok(parsed)
    }

    /// Drop all stored values
    pub fn reset(&mut self) -> Result<(), ConfigError> {
        self.state.settings.clear();
        self.save()
    }

    /// Resolved values of all known settings
    pub fn entries(&self) -> Vec<SettingEntry> {
        SETTINGS
            .iter()
            .map(|def| SettingEntry {
                name: def.name.to_string(),
                value: self.get(def.name).unwrap_or(def.default),
                default: def.default,
                description: def.description.to_string(),
            })
            .collect()
    }

    fn save(&self) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(&self.state)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn isolated(home: &Path, prefix: &str) -> Settings {
        Settings::load(home).unwrap().with_env_prefix(prefix)
    }

    #[test]
    fn test_defaults() {
        let tmp = TempDir::new().unwrap();
        let settings = isolated(tmp.path(), "PIOCTL_TEST_DEFAULTS_");
        assert!(settings.get(ENABLE_PROMPTS).unwrap());
        assert!(!settings.get(FORCE_VERBOSE).unwrap());
    }

    #[test]
    fn test_set_persists() {
        let tmp = TempDir::new().unwrap();
        let mut settings = isolated(tmp.path(), "PIOCTL_TEST_PERSIST_");
        assert!(!settings.set(ENABLE_PROMPTS, "no").unwrap());

        let reloaded = isolated(tmp.path(), "PIOCTL_TEST_PERSIST_");
        assert!(!reloaded.get(ENABLE_PROMPTS).unwrap());
        assert!(tmp.path().join(STATE_FILE_NAME).is_file());
    }

    #[test]
    fn test_reset() {
        let tmp = TempDir::new().unwrap();
        let mut settings = isolated(tmp.path(), "PIOCTL_TEST_RESET_");
        settings.set(FORCE_VERBOSE, "yes").unwrap();
        settings.reset().unwrap();
        assert!(!settings.get(FORCE_VERBOSE).unwrap());
    }

    #[test]
    fn test_env_override() {
        let tmp = TempDir::new().unwrap();
        let settings = isolated(tmp.path(), "PIOCTL_TEST_ENV_OVERRIDE_");
        std::env::set_var("PIOCTL_TEST_ENV_OVERRIDE_FORCE_VERBOSE", "true");
        assert!(settings.get(FORCE_VERBOSE).unwrap());
        std::env::remove_var("PIOCTL_TEST_ENV_OVERRIDE_FORCE_VERBOSE");
    }

    #[test]
    fn test_unknown_and_invalid() {
        let tmp = TempDir::new().unwrap();
        let mut settings = isolated(tmp.path(), "PIOCTL_TEST_INVALID_");
        assert!(matches!(
            settings.get("telemetry"),
            Err(DomainError::UnknownSetting(_))
        ));
        assert!(settings.set(ENABLE_PROMPTS, "maybe").is_err());
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("Yes"), Some(true));
        assert_eq!(parse_bool(" off "), Some(false));
        assert_eq!(parse_bool("2"), None);
    }

    #[test]
    fn test_entries() {
        let tmp = TempDir::new().unwrap();
        let settings = isolated(tmp.path(), "PIOCTL_TEST_ENTRIES_");
        let entries = settings.entries();
        assert_eq!(entries.len(), SETTINGS.len());
        assert_eq!(entries[0].name, ENABLE_PROMPTS);
    }
}
