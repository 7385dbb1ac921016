//! Command handlers
//!
//! Each command handler orchestrates the execution of a CLI command.

pub mod boards;
pub mod ci;
pub mod lib;
pub mod settings;

pub use boards::run_boards;
pub use ci::run_ci;
pub use lib::run_lib;
pub use settings::run_settings;

use crate::config::Config;
use crate::error::Result;
use crate::registry::HttpRegistry;

/// Registry client for the configured API endpoint
pub(crate) fn open_registry(config: &Config) -> Result<HttpRegistry> {
    log::debug!("Using registry {}", config.registry.api_url);
    Ok(HttpRegistry::new(&config.registry.api_url, config.timeout())?)
}
