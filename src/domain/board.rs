//! Board domain types

use serde::{Deserialize, Serialize};

/// A hardware target known to the registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    /// Board identifier used in `[env:<id>]` sections
    pub id: String,
    /// Human-readable name
    pub name: String,
    /// Development platform providing the toolchain
    pub platform: String,
    /// Supported frameworks, the first one is the default
    #[serde(default)]
    pub frameworks: Vec<String>,
    /// Microcontroller
    #[serde(default)]
    pub mcu: String,
    /// CPU frequency in Hz
    #[serde(default)]
    pub fcpu: u64,
    /// RAM size in bytes
    #[serde(default)]
    pub ram: u64,
    /// Flash size in bytes
    #[serde(default)]
    pub rom: u64,
    #[serde(default)]
    pub vendor: String,
    #[serde(default)]
    pub url: String,
}

impl Board {
    /// Create a board with the required fields
    pub fn new(id: impl Into<String>, name: impl Into<String>, platform: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            platform: platform.into(),
            frameworks: Vec::new(),
            mcu: String::new(),
            fcpu: 0,
            ram: 0,
            rom: 0,
            vendor: String::new(),
            url: String::new(),
        }
    }

    /// Builder: set supported frameworks
    pub fn with_frameworks<I, S>(mut self, frameworks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.frameworks = frameworks.into_iter().map(Into::into).collect();
        self
    }

    /// Builder: set MCU
    pub fn with_mcu(mut self, mcu: impl Into<String>) -> Self {
        self.mcu = mcu.into();
        self
    }

    /// Default framework for generated environments
    pub fn default_framework(&self) -> Option<&str> {
        self.frameworks.first().map(String::as_str)
    }

    /// Case-insensitive match against id, name, platform, MCU and vendor
    pub fn matches(&self, filter: &str) -> bool {
        let filter = filter.to_lowercase();
        [&self.id, &self.name, &self.platform, &self.mcu, &self.vendor]
            .iter()
            .any(|field| field.to_lowercase().contains(&filter))
    }
}

/// Format a byte size the way board listings show it
pub fn format_size(bytes: u64) -> String {
    if bytes >= 1024 * 1024 && bytes % (1024 * 1024) == 0 {
        format!("{}MB", bytes / (1024 * 1024))
    } else if bytes >= 1024 {
        format!("{}kB", bytes / 1024)
    } else {
        format!("{}B", bytes)
    }
}
