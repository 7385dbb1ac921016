//! Unified error types for pioctl
//!
//! This module defines all error types used throughout the application.
//! Uses thiserror for ergonomic error definitions.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Error talking to the library registry
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    /// Error from library management operations
    #[error("{0}")]
    Package(#[from] PackageError),

    /// Error from the ci command
    #[error("{0}")]
    Ci(#[from] CiError),

    /// Error from configuration parsing/validation
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Error from domain type validation
    #[error("Validation error: {0}")]
    Domain(#[from] DomainError),

    /// IO error (file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from registry API requests
#[derive(Error, Debug)]
pub enum RegistryError {
    /// Transport-level failure (DNS, TLS, connection refused, timeout)
    #[error("Request to {url} failed: {reason}")]
    Http { url: String, reason: String },

    /// Registry answered with a non-success status code
    #[error("Registry returned HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    /// Response body could not be decoded
    #[error("Invalid registry response from {url}: {reason}")]
    Parse { url: String, reason: String },

    /// Local `file://` resource could not be read
    #[error("Failed to read {path}: {source}")]
    LocalFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors from installing, updating and removing libraries
#[derive(Error, Debug)]
pub enum PackageError {
    /// Registry search returned no library for the request
    #[error("Library not found: {0}")]
    LibNotFound(String),

    /// No registry version satisfies the requirements
    #[error("Could not find a version that satisfies the requirement '{requirements}' for your system '{systype}'")]
    UndefinedPackageVersion { requirements: String, systype: String },

    /// Library is not present in the storage directory
    #[error("Library '{0}' is not installed")]
    NotInstalled(String),

    /// Install target exists but is not a managed library of that version
    #[error("Directory {0} is occupied by another library")]
    DirectoryOccupied(PathBuf),

    /// Downloaded content is neither a zip nor a gzip tarball
    #[error("Unsupported or corrupted archive from {0}")]
    InvalidArchive(String),

    /// Installed manifest could not be read or parsed
    #[error("Failed to parse manifest at {path}: {reason}")]
    ManifestParse { path: PathBuf, reason: String },

    /// Registry failure while fetching package content
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    /// Zip extraction failure
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// IO error during install
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from the ci command
#[derive(Error, Debug)]
pub enum CiError {
    /// Neither SRC arguments nor PLATFORMIO_CI_SRC were given
    #[error("Missing argument 'SRC' (pass source paths or set PLATFORMIO_CI_SRC)")]
    MissingSource,

    /// No board and no project configuration to build from
    #[error("Can not find build environments: specify --board or --project-conf")]
    BuildEnvsEmpty,

    /// Board id is not known to the registry
    #[error("Unknown board ID '{0}'")]
    UnknownBoard(String),

    /// A glob pattern could not be parsed
    #[error("Invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// Build command could not be started
    #[error("Failed to start build command '{command}': {reason}")]
    BuildSpawn { command: String, reason: String },

    /// Build command exited with a failure status
    #[error("Build failed{}", format_exit_code(.code))]
    BuildFailed { code: Option<i32> },

    /// Board catalog could not be fetched
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    /// IO error while preparing the project
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from domain type validation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Package specification could not be parsed
    #[error("Invalid package specification: {0}")]
    InvalidPackageSpec(String),

    /// Setting name is not known
    #[error("Unknown setting '{0}'")]
    UnknownSetting(String),

    /// Setting value has the wrong type
    #[error("Invalid value '{value}' for setting '{name}': {reason}")]
    InvalidSettingValue {
        name: String,
        value: String,
        reason: String,
    },
}

/// Errors from configuration parsing and validation
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file not found
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    /// Home directory could not be determined
    #[error("Could not determine the home directory; set PLATFORMIO_HOME_DIR")]
    NoHomeDir,

    /// TOML parsing error
    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// IO error while reading or writing state
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn format_exit_code(code: &Option<i32>) -> String {
    match code {
        Some(c) => format!(" with exit code {c}"),
        None => String::new(),
    }
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;
